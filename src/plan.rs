use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::{validate_discount_percent, EngineConfig};
use crate::decimal::Money;
use crate::errors::{EngineError, Result};

/// one scheduled installment before it is materialized by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedInstallment {
    pub sequence: u32,
    pub amount: Money,
    pub due_date: NaiveDate,
}

/// the computed split of a purchase total into dated installments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    /// total after the general discount, before the plan surcharge
    pub net_total: Money,
    /// the amount actually divided into installments
    pub plan_total: Money,
    pub surcharge_applied: bool,
    pub installments: Vec<PlannedInstallment>,
    pub final_due_date: NaiveDate,
}

/// split a purchase total into dated installments.
///
/// pure computation: no clock, no storage. the caller materializes the
/// returned installments in one atomic batch.
///
/// 1. apply the general discount to get the net total (half-up to cents)
/// 2. uplift the net total by the plan surcharge when the count exceeds
///    the configured threshold (applies once to the whole plan)
/// 3. divide by integer-cent division, remainder on the last installment
/// 4. due dates at purchase date + interval days x sequence
pub fn generate_plan(
    total_amount: Money,
    installment_count: u32,
    purchase_date: NaiveDate,
    general_discount_percent: Decimal,
    config: &EngineConfig,
) -> Result<InstallmentPlan> {
    config.validate()?;
    if installment_count < 1 {
        return Err(EngineError::InvalidPlan {
            message: "installment count must be at least 1".to_string(),
        });
    }
    if !total_amount.is_positive() {
        return Err(EngineError::InvalidPlan {
            message: format!("total amount must be positive: {}", total_amount),
        });
    }
    validate_discount_percent(general_discount_percent)?;

    // round once, on the final value; rounding the discount amount first
    // can drift a cent at midpoints
    let net_total =
        total_amount * (Decimal::ONE - general_discount_percent / Decimal::from(100));

    let surcharge_applied = installment_count > config.plan_surcharge_threshold;
    let plan_total = if surcharge_applied {
        net_total * config.plan_surcharge.surcharge_factor()
    } else {
        net_total
    };

    let amounts = plan_total.split_even(installment_count);

    let installments: Vec<PlannedInstallment> = amounts
        .into_iter()
        .enumerate()
        .map(|(i, amount)| {
            let sequence = (i + 1) as u32;
            PlannedInstallment {
                sequence,
                amount,
                due_date: purchase_date
                    + Duration::days(config.installment_interval_days * i64::from(sequence)),
            }
        })
        .collect();

    let final_due_date = purchase_date
        + Duration::days(config.installment_interval_days * i64::from(installment_count));

    Ok(InstallmentPlan {
        net_total,
        plan_total,
        surcharge_applied,
        installments,
        final_due_date,
    })
}

impl InstallmentPlan {
    /// sum of installment amounts; equals `plan_total` to the cent
    pub fn installments_total(&self) -> Money {
        self.installments
            .iter()
            .fold(Money::ZERO, |acc, i| acc + i.amount)
    }
}
