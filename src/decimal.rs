use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

/// currency precision in decimal places (cents)
pub const CURRENCY_DP: u32 = 2;

fn round_half_up(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Money type with 2 decimal places, rounded half-up at every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, 2));

    /// create from decimal, rounding to currency precision
    pub fn from_decimal(d: Decimal) -> Self {
        Money(round_half_up(d))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(round_half_up(Decimal::from_str(s)?)))
    }

    /// create from whole currency units
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from cents
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, CURRENCY_DP))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// total value in cents.
    ///
    /// amounts must fit in `i64` cents (about 9.2e16, far beyond any
    /// currency total); values outside that range are a caller bug.
    pub fn cents(&self) -> i64 {
        let cents = (self.0 * Decimal::from(100)).trunc();
        debug_assert!(
            cents.to_i64().is_some(),
            "amount out of cent range: {}",
            self.0
        );
        cents.to_i64().unwrap_or(i64::MAX)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// absolute value
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// split into `parts` amounts by integer-cent division.
    ///
    /// every part gets the floor share; the rounding remainder lands on
    /// the final part, so the parts always sum back to exactly `self`.
    pub fn split_even(&self, parts: u32) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }
        let total_cents = self.cents();
        let n = i64::from(parts);
        let base = total_cents.div_euclid(n);
        let last = total_cents - base * (n - 1);

        let mut amounts = vec![Money::from_cents(base); parts as usize];
        amounts[parts as usize - 1] = Money::from_cents(last);
        amounts
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(round_half_up(self.0 + other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = round_half_up(self.0 + other.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(round_half_up(self.0 - other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = round_half_up(self.0 - other.0);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money(round_half_up(self.0 * other))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money(round_half_up(self.0 / other))
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

/// rate type for percentages applied to money amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    /// multiplier that subtracts this rate (discount factor)
    pub fn discount_factor(&self) -> Decimal {
        Decimal::ONE - self.0
    }

    /// multiplier that adds this rate (surcharge factor)
    pub fn surcharge_factor(&self) -> Decimal {
        Decimal::ONE + self.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_rounds_half_up() {
        assert_eq!(Money::from_decimal(dec!(1.005)), Money::from_str_exact("1.01").unwrap());
        assert_eq!(Money::from_decimal(dec!(1.004)), Money::from_str_exact("1.00").unwrap());
        assert_eq!(Money::from_decimal(dec!(2.675)), Money::from_str_exact("2.68").unwrap());
    }

    #[test]
    fn test_cents_round_trip() {
        let m = Money::from_str_exact("172.50").unwrap();
        assert_eq!(m.cents(), 17250);
        assert_eq!(Money::from_cents(17250), m);
    }

    #[test]
    fn test_cents_large_amounts() {
        // a hundred trillion major units stays well inside i64 cents
        let m = Money::from_major(100_000_000_000_000);
        assert_eq!(m.cents(), 10_000_000_000_000_000);
        assert_eq!(Money::from_cents(m.cents()), m);

        let parts = m.split_even(7);
        let sum = parts.iter().fold(Money::ZERO, |acc, x| acc + *x);
        assert_eq!(sum, m);
    }

    #[test]
    fn test_split_even_exact() {
        let total = Money::from_str_exact("1380.00").unwrap();
        let parts = total.split_even(8);
        assert_eq!(parts.len(), 8);
        for p in &parts {
            assert_eq!(*p, Money::from_str_exact("172.50").unwrap());
        }
    }

    #[test]
    fn test_split_even_remainder_on_last() {
        let total = Money::from_str_exact("100.00").unwrap();
        let parts = total.split_even(3);
        assert_eq!(parts[0], Money::from_str_exact("33.33").unwrap());
        assert_eq!(parts[1], Money::from_str_exact("33.33").unwrap());
        assert_eq!(parts[2], Money::from_str_exact("33.34").unwrap());

        let sum = parts.into_iter().fold(Money::ZERO, |acc, x| acc + x);
        assert_eq!(sum, total);
    }

    #[test]
    fn test_split_even_sums_exactly() {
        let total = Money::from_str_exact("999.99").unwrap();
        for n in 1..=24u32 {
            let parts = total.split_even(n);
            let sum = parts.iter().fold(Money::ZERO, |acc, x| acc + *x);
            assert_eq!(sum, total, "sum mismatch for {} parts", n);
        }
    }

    #[test]
    fn test_signed_adjustment() {
        let discount = Money::from_major(95) - Money::from_major(100);
        assert!(discount.is_negative());
        assert_eq!(-discount, Money::from_major(5));
    }

    #[test]
    fn test_rate_factors() {
        let r = Rate::from_percentage(5);
        assert_eq!(r.discount_factor(), dec!(0.95));
        assert_eq!(r.surcharge_factor(), dec!(1.05));
        assert_eq!(r.as_percentage(), dec!(5));
    }
}
