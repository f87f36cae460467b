use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::ledger::InstallmentLedger;
use crate::types::{Installment, InstallmentId, InstallmentState, Payment};

use super::adjustment::{evaluate_adjustment, within_tolerance, AdjustedAmount, PaymentTiming};
use super::PaymentRequest;

/// a priced installment: what paying it today would cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentQuote {
    pub installment: Installment,
    pub amount_due: Money,
    pub adjustment: Money,
    pub timing: PaymentTiming,
}

/// settles installments against the ledger.
///
/// pricing is derived from the payment date and the due date, so a
/// pending installment past its due date that the sweep has not reached
/// yet is still charged the late surcharge.
pub struct PaymentProcessor<'a> {
    ledger: &'a InstallmentLedger,
    config: EngineConfig,
}

impl<'a> PaymentProcessor<'a> {
    pub fn new(ledger: &'a InstallmentLedger, config: EngineConfig) -> Self {
        Self { ledger, config }
    }

    /// price an installment as of a given instant without settling it
    pub fn quote(
        &self,
        installment_id: InstallmentId,
        at: DateTime<Utc>,
    ) -> Result<InstallmentQuote> {
        let installment = self.ledger.installment(installment_id)?;
        if installment.state == InstallmentState::Paid {
            return Err(EngineError::AlreadyPaid { installment_id });
        }

        let priced = evaluate_adjustment(
            installment.amount,
            installment.due_date,
            at.date_naive(),
            &self.config,
        );

        Ok(InstallmentQuote {
            installment,
            amount_due: priced.amount_due,
            adjustment: priced.adjustment,
            timing: priced.timing,
        })
    }

    pub fn quote_now(
        &self,
        installment_id: InstallmentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<InstallmentQuote> {
        self.quote(installment_id, time_provider.now())
    }

    /// validate, price, and settle one installment in full.
    ///
    /// the offered amount must match the adjusted amount due within the
    /// configured tolerance; the recorded payment always carries the
    /// computed amount, not the offered one. the ledger re-checks the
    /// installment's state under its lock, so concurrent calls for the
    /// same installment produce exactly one payment.
    pub fn apply_payment(
        &self,
        request: &PaymentRequest,
        at: DateTime<Utc>,
    ) -> Result<Payment> {
        let installment = self.ledger.installment(request.installment_id)?;
        if installment.state == InstallmentState::Paid {
            return Err(EngineError::AlreadyPaid {
                installment_id: request.installment_id,
            });
        }

        let priced: AdjustedAmount = evaluate_adjustment(
            installment.amount,
            installment.due_date,
            at.date_naive(),
            &self.config,
        );

        if !within_tolerance(priced.amount_due, request.amount_offered, self.config.amount_tolerance)
        {
            return Err(EngineError::AmountMismatch {
                expected: priced.amount_due,
                offered: request.amount_offered,
            });
        }

        let reason = match priced.timing {
            PaymentTiming::Early => format!(
                "paid early on {}, discount {}",
                at.date_naive(),
                priced.adjustment
            ),
            PaymentTiming::OnTime => format!("paid on due date {}", at.date_naive()),
            PaymentTiming::Late => format!(
                "paid late on {}, surcharge {}",
                at.date_naive(),
                priced.adjustment
            ),
        };

        self.ledger.commit_payment(
            request.installment_id,
            priced.amount_due,
            priced.adjustment,
            request.method,
            request.external_ref.clone(),
            request.actor,
            at,
            reason,
        )
    }

    pub fn apply_payment_now(
        &self,
        request: &PaymentRequest,
        time_provider: &SafeTimeProvider,
    ) -> Result<Payment> {
        self.apply_payment(request, time_provider.now())
    }
}
