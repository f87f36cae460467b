use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;

use crate::errors::{EngineError, Result};
use crate::ledger::InstallmentLedger;

/// batch job that flips pending installments past their due date to
/// overdue.
///
/// each installment is its own commit: a failure or race on one row
/// never blocks the rest of the batch, and re-running the sweep is a
/// no-op for rows already flipped.
pub struct OverdueSweep<'a> {
    ledger: &'a InstallmentLedger,
}

impl<'a> OverdueSweep<'a> {
    pub fn new(ledger: &'a InstallmentLedger) -> Self {
        Self { ledger }
    }

    /// sweep as of the provider's current date
    pub fn run(&self, time_provider: &SafeTimeProvider) -> Result<usize> {
        self.run_as_of(time_provider.now().date_naive(), time_provider)
    }

    /// flip every pending installment whose due date is strictly before
    /// `as_of`; returns the number of installments transitioned.
    ///
    /// an installment paid or flipped between the scan and its commit
    /// loses the race harmlessly and is skipped. any other commit error
    /// surfaces to the caller; rows already transitioned stay committed
    /// and a retry resumes with the remainder.
    pub fn run_as_of(&self, as_of: NaiveDate, time_provider: &SafeTimeProvider) -> Result<usize> {
        let now = time_provider.now();
        let mut transitioned = 0;

        for installment_id in self.ledger.pending_due_before(as_of) {
            match self.ledger.commit_overdue(installment_id, as_of, now) {
                Ok(()) => transitioned += 1,
                // settled or flipped between the scan and this commit
                Err(EngineError::AlreadyPaid { .. } | EngineError::StateConflict { .. }) => {}
                Err(err) => return Err(err),
            }
        }

        Ok(transitioned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::decimal::Money;
    use crate::types::{Actor, Installment, InstallmentState, PaymentMethod};
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn test_time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn seed(ledger: &InstallmentLedger, time: &SafeTimeProvider) -> Vec<Installment> {
        let (_, installments) = ledger
            .register_purchase(
                Uuid::new_v4(),
                Money::from_major(1200),
                4,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                dec!(0),
                &EngineConfig::default(),
                time,
            )
            .unwrap();
        installments
    }

    #[test]
    fn test_sweep_flips_only_past_due_pending() {
        let ledger = InstallmentLedger::new();
        let time = test_time();
        let installments = seed(&ledger, &time);

        // due dates: jan 31, mar 1, mar 31, apr 30; advance to mar 10
        let control = time.test_control().unwrap();
        control.advance(Duration::days(69));

        let sweep = OverdueSweep::new(&ledger);
        assert_eq!(sweep.run(&time).unwrap(), 2);

        let states: Vec<InstallmentState> = installments
            .iter()
            .map(|i| ledger.installment(i.id).unwrap().state)
            .collect();
        assert_eq!(
            states,
            vec![
                InstallmentState::Overdue,
                InstallmentState::Overdue,
                InstallmentState::Pending,
                InstallmentState::Pending,
            ]
        );
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        let ledger = InstallmentLedger::new();
        let time = test_time();
        let installments = seed(&ledger, &time);

        // advance exactly to the first due date
        let control = time.test_control().unwrap();
        control.advance(Duration::days(30));
        assert_eq!(time.now().date_naive(), installments[0].due_date);

        let sweep = OverdueSweep::new(&ledger);
        assert_eq!(sweep.run(&time).unwrap(), 0);
        assert_eq!(
            ledger.installment(installments[0].id).unwrap().state,
            InstallmentState::Pending
        );
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let ledger = InstallmentLedger::new();
        let time = test_time();
        let installments = seed(&ledger, &time);

        let control = time.test_control().unwrap();
        control.advance(Duration::days(69));

        let sweep = OverdueSweep::new(&ledger);
        assert_eq!(sweep.run(&time).unwrap(), 2);
        assert_eq!(sweep.run(&time).unwrap(), 0);

        // exactly one audit entry per flipped installment
        for installment in &installments[..2] {
            assert_eq!(ledger.history(installment.id).len(), 1);
        }
    }

    #[test]
    fn test_sweep_skips_paid_installments() {
        let ledger = InstallmentLedger::new();
        let time = test_time();
        let installments = seed(&ledger, &time);
        let paid = &installments[0];

        ledger
            .commit_payment(
                paid.id,
                paid.amount,
                Money::ZERO,
                PaymentMethod::Card,
                None,
                Actor::System,
                time.now(),
                "test payment".to_string(),
            )
            .unwrap();

        let control = time.test_control().unwrap();
        control.advance(Duration::days(69));

        let sweep = OverdueSweep::new(&ledger);
        assert_eq!(sweep.run(&time).unwrap(), 1);
        assert_eq!(
            ledger.installment(paid.id).unwrap().state,
            InstallmentState::Paid
        );
    }

    #[test]
    fn test_sweep_records_system_actor_and_event() {
        let ledger = InstallmentLedger::new();
        let time = test_time();
        let installments = seed(&ledger, &time);
        ledger.take_events();

        let control = time.test_control().unwrap();
        control.advance(Duration::days(40));

        let sweep = OverdueSweep::new(&ledger);
        assert_eq!(sweep.run(&time).unwrap(), 1);

        let history = ledger.history(installments[0].id);
        assert_eq!(history[0].actor, Actor::System);

        let events = ledger.take_events();
        let overdue = events
            .iter()
            .find_map(|e| match e {
                crate::events::Event::InstallmentOverdue {
                    installment_id,
                    days_overdue,
                    ..
                } => Some((*installment_id, *days_overdue)),
                _ => None,
            })
            .expect("overdue event emitted");
        assert_eq!(overdue.0, installments[0].id);
        // due jan 31, as of feb 10
        assert_eq!(overdue.1, 10);
    }

    #[test]
    fn test_run_as_of_explicit_date() {
        let ledger = InstallmentLedger::new();
        let time = test_time();
        seed(&ledger, &time);

        let sweep = OverdueSweep::new(&ledger);
        let as_of = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(sweep.run_as_of(as_of, &time).unwrap(), 4);
        assert_eq!(ledger.overdue_installments().len(), 4);
    }
}
