use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a purchase
pub type PurchaseId = Uuid;
/// unique identifier for an installment
pub type InstallmentId = Uuid;
/// unique identifier for a payment
pub type PaymentId = Uuid;
/// user reference (owned by the external auth layer)
pub type UserId = Uuid;

/// installment lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentState {
    /// awaiting payment, due date not enforced yet
    Pending,
    /// settled by exactly one payment
    Paid,
    /// due date passed without payment
    Overdue,
}

impl fmt::Display for InstallmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstallmentState::Pending => "pending",
            InstallmentState::Paid => "paid",
            InstallmentState::Overdue => "overdue",
        };
        write!(f, "{}", s)
    }
}

/// payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Other,
}

/// purchase lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseStatus {
    /// installments outstanding
    Open,
    /// every installment settled
    Paid,
    /// administratively cancelled (external workflow)
    Cancelled,
}

/// who drove a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    User(UserId),
    System,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::User(id) => write!(f, "{}", id),
            Actor::System => write!(f, "system"),
        }
    }
}

/// a purchase split into scheduled installments.
///
/// immutable once its installments are generated, apart from the status
/// roll-up when the last installment settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    /// total before the many-installment surcharge
    pub total_amount: Money,
    pub installment_count: u32,
    pub purchase_date: NaiveDate,
    /// general discount percentage in [0, 100]
    pub general_discount_percent: Decimal,
    /// purchase date + interval days x installment count
    pub final_due_date: NaiveDate,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// one scheduled fractional obligation of a purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub purchase_id: PurchaseId,
    /// 1..N, unique within the purchase
    pub sequence: u32,
    /// nominal share of the post-surcharge plan total
    pub amount: Money,
    pub due_date: NaiveDate,
    pub state: InstallmentState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Installment {
    pub fn is_settled(&self) -> bool {
        self.state == InstallmentState::Paid
    }

    /// days elapsed past the due date, zero if not yet due
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.due_date).num_days().max(0)
    }
}

/// settlement record for exactly one installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub installment_id: InstallmentId,
    /// amount actually paid, post adjustment
    pub amount: Money,
    /// signed adjustment: negative for discount, positive for surcharge
    pub adjustment: Money,
    pub paid_at: DateTime<Utc>,
    pub method: PaymentMethod,
    /// caller-supplied receipt or gateway reference, unique when present
    pub external_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_actor_display() {
        assert_eq!(Actor::System.to_string(), "system");
        let id = Uuid::new_v4();
        assert_eq!(Actor::User(id).to_string(), id.to_string());
    }

    #[test]
    fn test_days_overdue() {
        let installment = Installment {
            id: Uuid::new_v4(),
            purchase_id: Uuid::new_v4(),
            sequence: 1,
            amount: Money::from_major(100),
            due_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            state: InstallmentState::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let before = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        assert_eq!(installment.days_overdue(before), 0);
        assert_eq!(installment.days_overdue(after), 14);
    }
}
