use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::{AuditLogEntry, AuditTrail};
use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{EngineError, Result};
use crate::events::{Event, EventStore};
use crate::plan::generate_plan;
use crate::types::{
    Actor, Installment, InstallmentId, InstallmentState, Payment, PaymentId, PaymentMethod,
    Purchase, PurchaseId, PurchaseStatus, UserId,
};

/// in-memory transactional boundary for purchases, installments,
/// payments, and the audit trail.
///
/// every state-changing commit happens under one lock acquisition and
/// re-verifies the installment's state before writing, so a payment that
/// loses a race against another payment fails with `AlreadyPaid` instead
/// of settling twice, and a state flip is never visible without its
/// audit entry.
pub struct InstallmentLedger {
    inner: Mutex<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    purchases: HashMap<PurchaseId, Purchase>,
    installments: HashMap<InstallmentId, Installment>,
    payments: HashMap<PaymentId, Payment>,
    payment_by_installment: HashMap<InstallmentId, PaymentId>,
    external_refs: HashSet<String>,
    audit: AuditTrail,
    events: EventStore,
}

/// serializable ledger state for the external persistence layer.
///
/// the event store is transient and deliberately not part of a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub purchases: Vec<Purchase>,
    pub installments: Vec<Installment>,
    pub payments: Vec<Payment>,
    pub audit: AuditTrail,
}

impl Default for InstallmentLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InstallmentLedger {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        // a poisoned lock means a panic mid-commit in another thread;
        // the inner maps are still structurally sound, so recover
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// generate and materialize the installment plan for a new purchase
    /// as one atomic batch.
    pub fn register_purchase(
        &self,
        user_id: UserId,
        total_amount: Money,
        installment_count: u32,
        purchase_date: NaiveDate,
        general_discount_percent: Decimal,
        config: &EngineConfig,
        time_provider: &SafeTimeProvider,
    ) -> Result<(Purchase, Vec<Installment>)> {
        let plan = generate_plan(
            total_amount,
            installment_count,
            purchase_date,
            general_discount_percent,
            config,
        )?;
        let now = time_provider.now();

        let purchase = Purchase {
            id: Uuid::new_v4(),
            user_id,
            total_amount,
            installment_count,
            purchase_date,
            general_discount_percent,
            final_due_date: plan.final_due_date,
            status: PurchaseStatus::Open,
            created_at: now,
            updated_at: now,
        };

        let installments: Vec<Installment> = plan
            .installments
            .iter()
            .map(|planned| Installment {
                id: Uuid::new_v4(),
                purchase_id: purchase.id,
                sequence: planned.sequence,
                amount: planned.amount,
                due_date: planned.due_date,
                state: InstallmentState::Pending,
                created_at: now,
                updated_at: now,
            })
            .collect();

        let mut inner = self.lock();
        inner.purchases.insert(purchase.id, purchase.clone());
        for installment in &installments {
            inner.installments.insert(installment.id, installment.clone());
        }
        inner.events.emit(Event::PlanGenerated {
            purchase_id: purchase.id,
            installment_count,
            plan_total: plan.plan_total,
            final_due_date: plan.final_due_date,
            timestamp: now,
        });

        Ok((purchase, installments))
    }

    /// settle an installment: payment row, state flip, and audit entry
    /// commit together or not at all.
    ///
    /// the state is re-read under the lock; `expected` pre-states are not
    /// required because any unpaid state may settle, but a row already
    /// `paid` loses with `AlreadyPaid`.
    #[allow(clippy::too_many_arguments)]
    pub fn commit_payment(
        &self,
        installment_id: InstallmentId,
        amount: Money,
        adjustment: Money,
        method: PaymentMethod,
        external_ref: Option<String>,
        actor: Actor,
        paid_at: DateTime<Utc>,
        reason: String,
    ) -> Result<Payment> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let installment = inner
            .installments
            .get_mut(&installment_id)
            .ok_or(EngineError::InstallmentNotFound { id: installment_id })?;

        if installment.state == InstallmentState::Paid {
            return Err(EngineError::AlreadyPaid { installment_id });
        }
        if let Some(ref reference) = external_ref {
            if inner.external_refs.contains(reference) {
                return Err(EngineError::DuplicateReference {
                    reference: reference.clone(),
                });
            }
        }

        let previous_state = installment.state;
        let purchase_id = installment.purchase_id;
        installment.state = InstallmentState::Paid;
        installment.updated_at = paid_at;

        let payment = Payment {
            id: Uuid::new_v4(),
            installment_id,
            amount,
            adjustment,
            paid_at,
            method,
            external_ref: external_ref.clone(),
            created_at: paid_at,
        };

        inner.audit.record(
            installment_id,
            previous_state,
            InstallmentState::Paid,
            actor,
            paid_at,
            reason.clone(),
        );
        inner.events.emit(Event::StateChanged {
            installment_id,
            old_state: previous_state,
            new_state: InstallmentState::Paid,
            actor,
            reason,
            timestamp: paid_at,
        });
        inner.events.emit(Event::PaymentReceived {
            payment_id: payment.id,
            installment_id,
            purchase_id,
            amount,
            adjustment,
            method,
            timestamp: paid_at,
        });

        if let Some(reference) = external_ref {
            inner.external_refs.insert(reference);
        }
        inner.payments.insert(payment.id, payment.clone());
        inner.payment_by_installment.insert(installment_id, payment.id);

        // roll the purchase up to paid once its last installment settles
        let all_settled = inner
            .installments
            .values()
            .filter(|i| i.purchase_id == purchase_id)
            .all(|i| i.state == InstallmentState::Paid);
        if all_settled {
            if let Some(purchase) = inner.purchases.get_mut(&purchase_id) {
                if purchase.status == PurchaseStatus::Open {
                    purchase.status = PurchaseStatus::Paid;
                    purchase.updated_at = paid_at;
                    inner.events.emit(Event::PurchaseSettled {
                        purchase_id,
                        settled_at: paid_at,
                    });
                }
            }
        }

        Ok(payment)
    }

    /// flip one pending, past-due installment to overdue.
    ///
    /// the pending pre-state is verified under the lock; an installment
    /// paid in the meantime loses the race harmlessly (`AlreadyPaid`),
    /// one already flipped reports `StateConflict`.
    pub fn commit_overdue(
        &self,
        installment_id: InstallmentId,
        as_of: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let installment = inner
            .installments
            .get_mut(&installment_id)
            .ok_or(EngineError::InstallmentNotFound { id: installment_id })?;

        if installment.state == InstallmentState::Paid {
            return Err(EngineError::AlreadyPaid { installment_id });
        }
        if installment.state != InstallmentState::Pending {
            return Err(EngineError::StateConflict {
                current: installment.state,
                expected: InstallmentState::Pending,
            });
        }

        let due_date = installment.due_date;
        let purchase_id = installment.purchase_id;
        let days_overdue = installment.days_overdue(as_of);
        installment.state = InstallmentState::Overdue;
        installment.updated_at = now;

        let reason = format!("automatic transition: due {} unpaid as of {}", due_date, as_of);
        inner.audit.record(
            installment_id,
            InstallmentState::Pending,
            InstallmentState::Overdue,
            Actor::System,
            now,
            reason.clone(),
        );
        inner.events.emit(Event::StateChanged {
            installment_id,
            old_state: InstallmentState::Pending,
            new_state: InstallmentState::Overdue,
            actor: Actor::System,
            reason,
            timestamp: now,
        });
        inner.events.emit(Event::InstallmentOverdue {
            installment_id,
            purchase_id,
            due_date,
            days_overdue,
            timestamp: now,
        });

        Ok(())
    }

    pub fn purchase(&self, id: PurchaseId) -> Result<Purchase> {
        self.lock()
            .purchases
            .get(&id)
            .cloned()
            .ok_or(EngineError::PurchaseNotFound { id })
    }

    pub fn installment(&self, id: InstallmentId) -> Result<Installment> {
        self.lock()
            .installments
            .get(&id)
            .cloned()
            .ok_or(EngineError::InstallmentNotFound { id })
    }

    /// installments of one purchase, ordered by sequence
    pub fn installments_for_purchase(&self, purchase_id: PurchaseId) -> Vec<Installment> {
        let mut installments: Vec<Installment> = self
            .lock()
            .installments
            .values()
            .filter(|i| i.purchase_id == purchase_id)
            .cloned()
            .collect();
        installments.sort_by_key(|i| i.sequence);
        installments
    }

    /// all installments owned by one user, ordered by due date
    pub fn installments_for_user(&self, user_id: UserId) -> Vec<Installment> {
        let inner = self.lock();
        let owned: HashSet<PurchaseId> = inner
            .purchases
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect();
        let mut installments: Vec<Installment> = inner
            .installments
            .values()
            .filter(|i| owned.contains(&i.purchase_id))
            .cloned()
            .collect();
        installments.sort_by_key(|i| (i.due_date, i.sequence));
        installments
    }

    /// pending installments whose due date is strictly before `as_of`,
    /// ordered by due date; the sweep's work list
    pub fn pending_due_before(&self, as_of: NaiveDate) -> Vec<InstallmentId> {
        let inner = self.lock();
        let mut due: Vec<&Installment> = inner
            .installments
            .values()
            .filter(|i| i.state == InstallmentState::Pending && i.due_date < as_of)
            .collect();
        due.sort_by_key(|i| (i.due_date, i.sequence));
        due.iter().map(|i| i.id).collect()
    }

    /// current overdue installments, the reporting feed
    pub fn overdue_installments(&self) -> Vec<Installment> {
        let mut overdue: Vec<Installment> = self
            .lock()
            .installments
            .values()
            .filter(|i| i.state == InstallmentState::Overdue)
            .cloned()
            .collect();
        overdue.sort_by_key(|i| (i.due_date, i.sequence));
        overdue
    }

    pub fn payment_for_installment(&self, installment_id: InstallmentId) -> Option<Payment> {
        let inner = self.lock();
        inner
            .payment_by_installment
            .get(&installment_id)
            .and_then(|payment_id| inner.payments.get(payment_id))
            .cloned()
    }

    pub fn payment_count(&self) -> usize {
        self.lock().payments.len()
    }

    /// audit history of one installment, timestamp ascending
    pub fn history(&self, installment_id: InstallmentId) -> Vec<AuditLogEntry> {
        self.lock().audit.history(installment_id)
    }

    pub fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.lock().audit.entries().to_vec()
    }

    /// drain accumulated events for external observers
    pub fn take_events(&self) -> Vec<Event> {
        self.lock().events.take_events()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let inner = self.lock();
        let mut purchases: Vec<Purchase> = inner.purchases.values().cloned().collect();
        purchases.sort_by_key(|p| p.created_at);
        let mut installments: Vec<Installment> = inner.installments.values().cloned().collect();
        installments.sort_by_key(|i| (i.purchase_id, i.sequence));
        let mut payments: Vec<Payment> = inner.payments.values().cloned().collect();
        payments.sort_by_key(|p| p.created_at);

        LedgerSnapshot {
            purchases,
            installments,
            payments,
            audit: inner.audit.clone(),
        }
    }

    /// rebuild a ledger from a snapshot, restoring the lookup indexes
    pub fn restore(snapshot: LedgerSnapshot) -> Self {
        let mut inner = LedgerInner {
            audit: snapshot.audit,
            ..LedgerInner::default()
        };
        for purchase in snapshot.purchases {
            inner.purchases.insert(purchase.id, purchase);
        }
        for installment in snapshot.installments {
            inner.installments.insert(installment.id, installment);
        }
        for payment in snapshot.payments {
            inner
                .payment_by_installment
                .insert(payment.installment_id, payment.id);
            if let Some(ref reference) = payment.external_ref {
                inner.external_refs.insert(reference.clone());
            }
            inner.payments.insert(payment.id, payment);
        }

        Self {
            inner: Mutex::new(inner),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let snapshot: LedgerSnapshot = serde_json::from_str(json)?;
        Ok(Self::restore(snapshot))
    }
}
