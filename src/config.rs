use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};

/// business rates and thresholds for the installment engine.
///
/// project history disagrees on the exact discount/surcharge rates, so
/// none of them are hardcoded at call sites; deployments that rely on
/// the other documented variants construct the config with those rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// discount applied when an installment is paid strictly before its
    /// due date
    pub early_payment_discount: Rate,
    /// surcharge applied when an installment is paid after its due date
    pub late_payment_surcharge: Rate,
    /// uplift on the whole plan total when the installment count exceeds
    /// the threshold
    pub plan_surcharge: Rate,
    /// installment count above which the plan surcharge applies
    pub plan_surcharge_threshold: u32,
    /// days between consecutive due dates
    pub installment_interval_days: i64,
    /// accepted difference between offered and computed amounts
    pub amount_tolerance: Money,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            early_payment_discount: Rate::from_percentage(5),
            late_payment_surcharge: Rate::from_percentage(8),
            plan_surcharge: Rate::from_percentage(15),
            plan_surcharge_threshold: 6,
            installment_interval_days: 30,
            amount_tolerance: Money::CENT,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// override the per-installment adjustment rates
    pub fn with_adjustment_rates(mut self, early_discount: Rate, late_surcharge: Rate) -> Self {
        self.early_payment_discount = early_discount;
        self.late_payment_surcharge = late_surcharge;
        self
    }

    /// override the plan-level surcharge rule
    pub fn with_plan_surcharge(mut self, surcharge: Rate, threshold: u32) -> Self {
        self.plan_surcharge = surcharge;
        self.plan_surcharge_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |r: Rate| r.as_decimal() >= Decimal::ZERO && r.as_decimal() <= Decimal::ONE;

        if !in_unit(self.early_payment_discount) {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "early payment discount out of range: {}",
                    self.early_payment_discount
                ),
            });
        }
        if self.late_payment_surcharge.as_decimal() < Decimal::ZERO {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "late payment surcharge must be non-negative: {}",
                    self.late_payment_surcharge
                ),
            });
        }
        if self.plan_surcharge.as_decimal() < Decimal::ZERO {
            return Err(EngineError::InvalidConfiguration {
                message: format!("plan surcharge must be non-negative: {}", self.plan_surcharge),
            });
        }
        if self.installment_interval_days < 1 {
            return Err(EngineError::InvalidConfiguration {
                message: format!(
                    "installment interval must be at least one day: {}",
                    self.installment_interval_days
                ),
            });
        }
        if self.amount_tolerance.is_negative() {
            return Err(EngineError::InvalidConfiguration {
                message: format!("amount tolerance must be non-negative: {}", self.amount_tolerance),
            });
        }
        Ok(())
    }
}

/// valid range for the general purchase discount percentage
pub fn validate_discount_percent(pct: Decimal) -> Result<()> {
    if pct < Decimal::ZERO || pct > dec!(100) {
        return Err(EngineError::InvalidPlan {
            message: format!("general discount percent out of [0, 100]: {}", pct),
        });
    }
    Ok(())
}
