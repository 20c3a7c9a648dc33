//! Reversal-aware reporting.
//!
//! The ledger is append-only: corrections live as compensating `reversal`
//! rows. Every aggregation here first builds the set of voided ids from
//! those rows (one lookup per query, not per row) and then folds over the
//! surviving transactions. Empty windows produce zero totals and empty
//! series, never errors.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    CashFlowPoint, CategoryTotal, EngineError, KindReport, MoneyCents, ResultEngine, Transaction,
    TransactionKind, TrendPoint, transactions,
};

use super::{Engine, normalize_category_key, with_tx};

/// Filters for the raw transaction listing.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
/// The report windows below are inclusive on both ends instead.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// If present, acts as an allow-list of kinds to return.
    pub kinds: Option<Vec<TransactionKind>>,
    /// Matches transactions touching this account on either side.
    pub account_id: Option<Uuid>,
    /// Matches the normalized category label.
    pub category: Option<String>,
    /// If true, includes compensating reversal rows (default: false).
    pub include_reversals: bool,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::Validation(
            "invalid range: from must be < to".to_string(),
        ));
    }
    if filter.kinds.as_ref().is_some_and(|k| k.is_empty()) {
        return Err(EngineError::Validation(
            "kinds must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> ResultEngine<()> {
    if start > end {
        return Err(EngineError::Validation(
            "invalid window: start must be <= end".to_string(),
        ));
    }
    Ok(())
}

/// Percentage change against the previous value, 0 when the previous value
/// is 0 (never NaN or infinite).
fn pct_change(previous: i64, current: i64) -> f64 {
    if previous == 0 {
        0.0
    } else {
        100.0 * (current - previous) as f64 / previous as f64
    }
}

enum TrendGranularity {
    Monthly,
    Yearly,
}

impl TrendGranularity {
    fn period(&self, occurred_at: DateTime<Utc>) -> String {
        match self {
            Self::Monthly => format!("{:04}-{:02}", occurred_at.year(), occurred_at.month()),
            Self::Yearly => format!("{:04}", occurred_at.year()),
        }
    }
}

#[derive(Default)]
struct TrendBucket {
    income: i64,
    expenses: i64,
    fees: i64,
}

impl Engine {
    /// Lists recent ledger transactions, newest first.
    pub async fn list_transactions(
        &self,
        limit: u64,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;

        with_tx!(self, |db_tx| {
            let mut query = transactions::Entity::find()
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit);

            if let Some(from) = filter.from {
                query = query.filter(transactions::Column::OccurredAt.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(transactions::Column::OccurredAt.lt(to));
            }
            if let Some(kinds) = &filter.kinds {
                let kinds: Vec<String> = kinds.iter().map(|k| k.as_str().to_string()).collect();
                query = query.filter(transactions::Column::Kind.is_in(kinds));
            } else if !filter.include_reversals {
                query = query
                    .filter(transactions::Column::Kind.ne(TransactionKind::Reversal.as_str()));
            }
            if let Some(account_id) = filter.account_id {
                query = query.filter(
                    Condition::any()
                        .add(transactions::Column::SourceAccountId.eq(account_id))
                        .add(transactions::Column::DestinationAccountId.eq(account_id)),
                );
            }
            if let Some(category) = &filter.category {
                query = query
                    .filter(transactions::Column::Category.eq(category.trim().to_string()));
            }

            let rows = query.all(&db_tx).await?;
            rows.into_iter().map(Transaction::try_from).collect()
        })
    }

    /// Transactions of one kind in `[start, end]` with voided activity
    /// removed, plus their total.
    pub async fn transactions_by_kind(
        &self,
        kind: TransactionKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<KindReport> {
        validate_window(start, end)?;
        if kind == TransactionKind::Reversal {
            return Err(EngineError::Validation(
                "reversal is not a reportable kind".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let rows = self.surviving_rows(&db_tx, kind, start, end).await?;
            let total = MoneyCents::new(rows.iter().map(|row| row.amount_minor).sum());
            let transactions = rows
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(KindReport {
                transactions,
                total,
            })
        })
    }

    /// Spending by category over `[start, end]`: expenses and fees grouped
    /// by normalized category label, sorted by total descending.
    pub async fn category_breakdown(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<CategoryTotal>> {
        validate_window(start, end)?;

        with_tx!(self, |db_tx| {
            let mut rows = self
                .surviving_rows(&db_tx, TransactionKind::Expense, start, end)
                .await?;
            rows.extend(
                self.surviving_rows(&db_tx, TransactionKind::Fee, start, end)
                    .await?,
            );

            struct Group {
                label: String,
                total: i64,
                count: u64,
            }

            let mut groups: HashMap<String, Group> = HashMap::new();
            for row in &rows {
                let label = row
                    .category
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .unwrap_or("uncategorized");
                let group = groups
                    .entry(normalize_category_key(label))
                    .or_insert_with(|| Group {
                        label: label.to_string(),
                        total: 0,
                        count: 0,
                    });
                group.total += row.amount_minor;
                group.count += 1;
            }

            let grand_total: i64 = groups.values().map(|g| g.total).sum();
            let mut breakdown: Vec<CategoryTotal> = groups
                .into_values()
                .map(|group| CategoryTotal {
                    category: group.label,
                    total: MoneyCents::new(group.total),
                    count: group.count,
                    average: MoneyCents::new(group.total / group.count as i64),
                    percentage: if grand_total > 0 {
                        100.0 * group.total as f64 / grand_total as f64
                    } else {
                        0.0
                    },
                })
                .collect();
            breakdown.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));

            Ok(breakdown)
        })
    }

    /// Income/expense/fee totals per calendar month, with savings, savings
    /// rate and period-over-period deltas.
    pub async fn monthly_trend(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<TrendPoint>> {
        self.trend(start, end, TrendGranularity::Monthly).await
    }

    /// Same series bucketed per calendar year.
    pub async fn yearly_trend(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<TrendPoint>> {
        self.trend(start, end, TrendGranularity::Yearly).await
    }

    async fn trend(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: TrendGranularity,
    ) -> ResultEngine<Vec<TrendPoint>> {
        validate_window(start, end)?;

        with_tx!(self, |db_tx| {
            let mut buckets: BTreeMap<String, TrendBucket> = BTreeMap::new();

            for row in self
                .surviving_rows(&db_tx, TransactionKind::Income, start, end)
                .await?
            {
                let bucket = buckets.entry(granularity.period(row.occurred_at)).or_default();
                bucket.income += row.amount_minor;
            }
            for row in self
                .surviving_rows(&db_tx, TransactionKind::Expense, start, end)
                .await?
            {
                let bucket = buckets.entry(granularity.period(row.occurred_at)).or_default();
                bucket.expenses += row.amount_minor;
            }
            for row in self
                .surviving_rows(&db_tx, TransactionKind::Fee, start, end)
                .await?
            {
                let bucket = buckets.entry(granularity.period(row.occurred_at)).or_default();
                bucket.fees += row.amount_minor;
            }

            let mut points = Vec::with_capacity(buckets.len());
            let mut previous: Option<(i64, i64, i64)> = None;
            for (period, bucket) in buckets {
                let savings = bucket.income - bucket.expenses - bucket.fees;
                let savings_rate = if bucket.income == 0 {
                    0.0
                } else {
                    100.0 * savings as f64 / bucket.income as f64
                };
                let (prev_income, prev_expenses, prev_savings) =
                    previous.unwrap_or((0, 0, 0));

                points.push(TrendPoint {
                    period,
                    income: MoneyCents::new(bucket.income),
                    expenses: MoneyCents::new(bucket.expenses),
                    fees: MoneyCents::new(bucket.fees),
                    savings: MoneyCents::new(savings),
                    savings_rate,
                    income_change_pct: pct_change(prev_income, bucket.income),
                    expenses_change_pct: pct_change(prev_expenses, bucket.expenses),
                    savings_change_pct: pct_change(prev_savings, savings),
                });
                previous = Some((bucket.income, bucket.expenses, savings));
            }

            Ok(points)
        })
    }

    /// Daily net flow (income positive, expenses and fees negative) with a
    /// running cumulative total across the window.
    pub async fn cash_flow(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<CashFlowPoint>> {
        validate_window(start, end)?;

        with_tx!(self, |db_tx| {
            let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();

            for row in self
                .surviving_rows(&db_tx, TransactionKind::Income, start, end)
                .await?
            {
                *days.entry(row.occurred_at.date_naive()).or_default() += row.amount_minor;
            }
            for kind in [TransactionKind::Expense, TransactionKind::Fee] {
                for row in self.surviving_rows(&db_tx, kind, start, end).await? {
                    *days.entry(row.occurred_at.date_naive()).or_default() -= row.amount_minor;
                }
            }

            let mut cumulative = 0i64;
            let points = days
                .into_iter()
                .map(|(date, net)| {
                    cumulative += net;
                    CashFlowPoint {
                        date,
                        net: MoneyCents::new(net),
                        cumulative: MoneyCents::new(cumulative),
                    }
                })
                .collect();

            Ok(points)
        })
    }

    /// Ids voided by compensating reversal rows for a kind.
    ///
    /// The scan is bounded below only: a reversal recorded after the report
    /// window still voids an entry inside it, while one recorded before
    /// `start` does not.
    async fn voided_reference_ids(
        &self,
        db_tx: &DatabaseTransaction,
        kind: TransactionKind,
        start: DateTime<Utc>,
    ) -> ResultEngine<HashSet<Uuid>> {
        let rows = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(TransactionKind::Reversal.as_str()))
            .filter(
                transactions::Column::ReferenceKind.eq(format!("{}_reversal", kind.as_str())),
            )
            .filter(transactions::Column::OccurredAt.gte(start))
            .all(db_tx)
            .await?;
        Ok(rows.into_iter().map(|row| row.reference_id).collect())
    }

    /// Rows of `kind` in `[start, end]` minus the voided set.
    async fn surviving_rows(
        &self,
        db_tx: &DatabaseTransaction,
        kind: TransactionKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<transactions::Model>> {
        let voided = self.voided_reference_ids(db_tx, kind, start).await?;
        let rows = transactions::Entity::find()
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lte(end))
            .order_by_asc(transactions::Column::OccurredAt)
            .order_by_asc(transactions::Column::Id)
            .all(db_tx)
            .await?;
        Ok(rows
            .into_iter()
            .filter(|row| !voided.contains(&row.id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pct_change_is_zero_on_zero_base() {
        assert_eq!(pct_change(0, 500), 0.0);
        assert_eq!(pct_change(0, 0), 0.0);
    }

    #[test]
    fn pct_change_tracks_growth_and_decline() {
        assert_eq!(pct_change(100, 150), 50.0);
        assert_eq!(pct_change(200, 100), -50.0);
    }

    #[test]
    fn trend_periods_are_zero_padded() {
        let date = DateTime::parse_from_rfc3339("2026-03-05T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(TrendGranularity::Monthly.period(date), "2026-03");
        assert_eq!(TrendGranularity::Yearly.period(date), "2026");
    }
}
