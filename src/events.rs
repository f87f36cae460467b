use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{
    Actor, InstallmentId, InstallmentState, PaymentId, PaymentMethod, PurchaseId,
};

/// notifications emitted by the ledger for external observers.
///
/// email delivery, cache invalidation, and report refreshes subscribe to
/// this stream instead of being called inline from the payment path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PlanGenerated {
        purchase_id: PurchaseId,
        installment_count: u32,
        plan_total: Money,
        final_due_date: NaiveDate,
        timestamp: DateTime<Utc>,
    },
    PaymentReceived {
        payment_id: PaymentId,
        installment_id: InstallmentId,
        purchase_id: PurchaseId,
        amount: Money,
        adjustment: Money,
        method: PaymentMethod,
        timestamp: DateTime<Utc>,
    },
    InstallmentOverdue {
        installment_id: InstallmentId,
        purchase_id: PurchaseId,
        due_date: NaiveDate,
        days_overdue: i64,
        timestamp: DateTime<Utc>,
    },
    StateChanged {
        installment_id: InstallmentId,
        old_state: InstallmentState,
        new_state: InstallmentState,
        actor: Actor,
        reason: String,
        timestamp: DateTime<Utc>,
    },
    PurchaseSettled {
        purchase_id: PurchaseId,
        settled_at: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
