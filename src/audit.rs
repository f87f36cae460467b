use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Actor, InstallmentId, InstallmentState};

/// one recorded installment state transition.
///
/// entries are never mutated or deleted; history reconstruction replays
/// them instead of trusting the installment's current state field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub entry_id: Uuid,
    /// monotonic position in the ledger, breaks timestamp ties
    pub sequence: u64,
    pub installment_id: InstallmentId,
    pub previous_state: InstallmentState,
    pub new_state: InstallmentState,
    pub actor: Actor,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// append-only ledger of installment state transitions.
///
/// exposes `record` and `history` only; there is no update or delete.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AuditTrail {
    entries: Vec<AuditLogEntry>,
    next_sequence: u64,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_sequence: 0,
        }
    }

    /// append one transition entry
    pub fn record(
        &mut self,
        installment_id: InstallmentId,
        previous_state: InstallmentState,
        new_state: InstallmentState,
        actor: Actor,
        timestamp: DateTime<Utc>,
        reason: impl Into<String>,
    ) -> AuditLogEntry {
        let entry = AuditLogEntry {
            entry_id: Uuid::new_v4(),
            sequence: self.next_sequence,
            installment_id,
            previous_state,
            new_state,
            actor,
            timestamp,
            reason: reason.into(),
        };
        self.next_sequence += 1;
        self.entries.push(entry.clone());
        entry
    }

    /// all transitions for one installment, timestamp ascending
    pub fn history(&self, installment_id: InstallmentId) -> Vec<AuditLogEntry> {
        let mut entries: Vec<AuditLogEntry> = self
            .entries
            .iter()
            .filter(|e| e.installment_id == installment_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.timestamp, e.sequence));
        entries
    }

    pub fn entries(&self) -> &[AuditLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
