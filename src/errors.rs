use thiserror::Error;

use crate::decimal::Money;
use crate::types::{InstallmentId, InstallmentState, PurchaseId};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid plan: {message}")]
    InvalidPlan { message: String },

    #[error("installment {installment_id} already paid")]
    AlreadyPaid { installment_id: InstallmentId },

    #[error("amount mismatch: expected {expected}, offered {offered}")]
    AmountMismatch { expected: Money, offered: Money },

    #[error("installment not found: {id}")]
    InstallmentNotFound { id: InstallmentId },

    #[error("purchase not found: {id}")]
    PurchaseNotFound { id: PurchaseId },

    #[error("duplicate payment reference: {reference}")]
    DuplicateReference { reference: String },

    #[error("state conflict: installment is {current}, expected {expected}")]
    StateConflict {
        current: InstallmentState,
        expected: InstallmentState,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
