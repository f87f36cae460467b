pub mod adjustment;
pub mod processor;

use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{Actor, InstallmentId, PaymentMethod};

pub use adjustment::{evaluate_adjustment, AdjustedAmount, PaymentTiming};
pub use processor::{InstallmentQuote, PaymentProcessor};

/// a request to settle one installment in full
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub installment_id: InstallmentId,
    /// must match the adjusted amount due within the configured tolerance
    pub amount_offered: Money,
    pub method: PaymentMethod,
    pub actor: Actor,
    /// optional receipt or gateway reference, unique across payments
    pub external_ref: Option<String>,
}

impl PaymentRequest {
    pub fn new(
        installment_id: InstallmentId,
        amount_offered: Money,
        method: PaymentMethod,
        actor: Actor,
    ) -> Self {
        Self {
            installment_id,
            amount_offered,
            method,
            actor,
            external_ref: None,
        }
    }

    pub fn with_external_ref(mut self, reference: impl Into<String>) -> Self {
        self.external_ref = Some(reference.into());
        self
    }
}
