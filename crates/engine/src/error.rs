//! The module contains the error the engine can throw.
//!
//! Validation-style errors are always raised before any side effect; a
//! failed operation leaves the ledger and the goal sub-ledger untouched.
//! Amount-carrying variants keep enough context (goal id, account id,
//! requested/available cents) to reconstruct the failed intent.

use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(
        "insufficient funds in account {account_id}: requested {requested_minor}, available {available_minor}"
    )]
    InsufficientFunds {
        account_id: Uuid,
        requested_minor: i64,
        available_minor: i64,
    },
    #[error(
        "insufficient allocation for goal {goal_id}: requested {requested_minor}, available {available_minor}"
    )]
    InsufficientAllocation {
        goal_id: Uuid,
        requested_minor: i64,
        available_minor: i64,
    },
    #[error("account {0} is inactive")]
    AccountInactive(Uuid),
    #[error("transfer failed: {0}")]
    TransferFailed(String),
    #[error("goal {0} still holds funds; a refund account is required")]
    RefundAccountRequired(Uuid),
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (
                Self::InsufficientFunds {
                    account_id: a,
                    requested_minor: ar,
                    available_minor: av,
                },
                Self::InsufficientFunds {
                    account_id: b,
                    requested_minor: br,
                    available_minor: bv,
                },
            ) => a == b && ar == br && av == bv,
            (
                Self::InsufficientAllocation {
                    goal_id: a,
                    requested_minor: ar,
                    available_minor: av,
                },
                Self::InsufficientAllocation {
                    goal_id: b,
                    requested_minor: br,
                    available_minor: bv,
                },
            ) => a == b && ar == br && av == bv,
            (Self::AccountInactive(a), Self::AccountInactive(b)) => a == b,
            (Self::TransferFailed(a), Self::TransferFailed(b)) => a == b,
            (Self::RefundAccountRequired(a), Self::RefundAccountRequired(b)) => a == b,
            (Self::DataIntegrity(a), Self::DataIntegrity(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
