use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{Account, EngineError, MoneyCents, ResultEngine, accounts};

use super::{Engine, normalize_required_name, with_tx};

impl Engine {
    /// Create a new account and return its id.
    ///
    /// Account names are unique among active accounts.
    pub async fn new_account(
        &self,
        name: &str,
        opening_balance: MoneyCents,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "account name")?;
        if opening_balance.is_negative() {
            return Err(EngineError::Validation(
                "opening balance must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let existing = accounts::Entity::find()
                .filter(accounts::Column::Name.eq(name.clone()))
                .filter(accounts::Column::Active.eq(true))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let account = Account::new(name, opening_balance);
            let id = account.id;
            accounts::ActiveModel::from(&account).insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Return an account by id.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        let model = accounts::Entity::find_by_id(account_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
        Ok(Account::from(model))
    }

    /// List accounts, active first, then by name.
    pub async fn list_accounts(&self, include_inactive: bool) -> ResultEngine<Vec<Account>> {
        let mut query = accounts::Entity::find()
            .order_by_desc(accounts::Column::Active)
            .order_by_asc(accounts::Column::Name);
        if !include_inactive {
            query = query.filter(accounts::Column::Active.eq(true));
        }
        let models = query.all(&self.database).await?;
        Ok(models.into_iter().map(Account::from).collect())
    }

    /// Mark an account inactive. Inactive accounts reject fund movements but
    /// keep their history.
    pub async fn deactivate_account(&self, account_id: Uuid) -> ResultEngine<()> {
        self.set_account_active(account_id, false).await
    }

    /// Reactivate a previously deactivated account.
    pub async fn reactivate_account(&self, account_id: Uuid) -> ResultEngine<()> {
        self.set_account_active(account_id, true).await
    }

    async fn set_account_active(&self, account_id: Uuid, active: bool) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, account_id).await?;
            let mut update: accounts::ActiveModel = model.into();
            update.active = ActiveValue::Set(active);
            update.update(&db_tx).await?;
            Ok(())
        })
    }

    pub(super) async fn require_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        accounts::Entity::find_by_id(account_id)
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    pub(super) async fn require_active_account(
        &self,
        db_tx: &DatabaseTransaction,
        account_id: Uuid,
    ) -> ResultEngine<accounts::Model> {
        let model = self.require_account(db_tx, account_id).await?;
        if !model.active {
            return Err(EngineError::AccountInactive(account_id));
        }
        Ok(model)
    }
}
