use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decimal::Money;

/// where the payment date falls relative to the due date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentTiming {
    /// strictly before the due date: discount applies
    Early,
    /// on the due date: nominal amount, no adjustment
    OnTime,
    /// after the due date: surcharge applies
    Late,
}

/// result of pricing an installment at a given payment date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdjustedAmount {
    pub nominal: Money,
    /// what the payer must offer
    pub amount_due: Money,
    /// signed: negative for discount, positive for surcharge
    pub adjustment: Money,
    pub timing: PaymentTiming,
}

/// price an installment relative to its due date.
///
/// this is always re-derived from the dates, never from the stored
/// installment state: an installment the sweep has not flipped yet still
/// pays the surcharge when settled after its due date, and a payment
/// racing the sweep is priced identically either way.
pub fn evaluate_adjustment(
    nominal: Money,
    due_date: NaiveDate,
    paid_on: NaiveDate,
    config: &EngineConfig,
) -> AdjustedAmount {
    let (timing, amount_due) = if paid_on < due_date {
        (
            PaymentTiming::Early,
            nominal * config.early_payment_discount.discount_factor(),
        )
    } else if paid_on == due_date {
        (PaymentTiming::OnTime, nominal)
    } else {
        (
            PaymentTiming::Late,
            nominal * config.late_payment_surcharge.surcharge_factor(),
        )
    };

    AdjustedAmount {
        nominal,
        amount_due,
        adjustment: amount_due - nominal,
        timing,
    }
}

/// tolerance check for offered vs computed amounts
pub fn within_tolerance(expected: Money, offered: Money, tolerance: Money) -> bool {
    (expected - offered).abs() <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_early_payment_discount() {
        let config = EngineConfig::default();
        let due = date(2024, 2, 1);
        let result =
            evaluate_adjustment(Money::from_major(100), due, date(2024, 1, 20), &config);

        assert_eq!(result.timing, PaymentTiming::Early);
        assert_eq!(result.amount_due, Money::from_str_exact("95.00").unwrap());
        assert_eq!(result.adjustment, Money::from_str_exact("-5.00").unwrap());
    }

    #[test]
    fn test_on_due_date_no_adjustment() {
        let config = EngineConfig::default();
        let due = date(2024, 2, 1);
        let result = evaluate_adjustment(Money::from_major(100), due, due, &config);

        assert_eq!(result.timing, PaymentTiming::OnTime);
        assert_eq!(result.amount_due, Money::from_major(100));
        assert_eq!(result.adjustment, Money::ZERO);
    }

    #[test]
    fn test_late_payment_surcharge() {
        let config = EngineConfig::default();
        let due = date(2024, 2, 1);
        let result =
            evaluate_adjustment(Money::from_major(100), due, date(2024, 2, 15), &config);

        assert_eq!(result.timing, PaymentTiming::Late);
        assert_eq!(result.amount_due, Money::from_str_exact("108.00").unwrap());
        assert_eq!(result.adjustment, Money::from_str_exact("8.00").unwrap());
    }

    #[test]
    fn test_one_day_boundaries() {
        let config = EngineConfig::default();
        let due = date(2024, 2, 1);

        let day_before =
            evaluate_adjustment(Money::from_major(100), due, date(2024, 1, 31), &config);
        assert_eq!(day_before.timing, PaymentTiming::Early);

        let day_after =
            evaluate_adjustment(Money::from_major(100), due, date(2024, 2, 2), &config);
        assert_eq!(day_after.timing, PaymentTiming::Late);
    }

    #[test]
    fn test_rounding_half_up_on_odd_amounts() {
        let config = EngineConfig::default();
        let due = date(2024, 2, 1);
        // 33.33 * 0.95 = 31.6635 -> 31.66; 33.33 * 1.08 = 35.9964 -> 36.00
        let nominal = Money::from_str_exact("33.33").unwrap();

        let early = evaluate_adjustment(nominal, due, date(2024, 1, 1), &config);
        assert_eq!(early.amount_due, Money::from_str_exact("31.66").unwrap());

        let late = evaluate_adjustment(nominal, due, date(2024, 3, 1), &config);
        assert_eq!(late.amount_due, Money::from_str_exact("36.00").unwrap());
    }

    #[test]
    fn test_configured_rates_respected() {
        use crate::decimal::Rate;
        let config = EngineConfig::new()
            .with_adjustment_rates(Rate::from_percentage(15), Rate::from_percentage(20));
        let due = date(2024, 2, 1);

        let early = evaluate_adjustment(Money::from_major(100), due, date(2024, 1, 1), &config);
        assert_eq!(early.amount_due, Money::from_major(85));

        let late = evaluate_adjustment(Money::from_major(100), due, date(2024, 3, 1), &config);
        assert_eq!(late.amount_due, Money::from_major(120));
    }

    #[test]
    fn test_within_tolerance() {
        let tolerance = Money::CENT;
        let expected = Money::from_str_exact("95.00").unwrap();

        assert!(within_tolerance(expected, Money::from_str_exact("95.00").unwrap(), tolerance));
        assert!(within_tolerance(expected, Money::from_str_exact("95.01").unwrap(), tolerance));
        assert!(within_tolerance(expected, Money::from_str_exact("94.99").unwrap(), tolerance));
        assert!(!within_tolerance(expected, Money::from_str_exact("95.02").unwrap(), tolerance));
        assert!(!within_tolerance(expected, Money::from_str_exact("90.00").unwrap(), tolerance));
    }
}
