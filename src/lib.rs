pub mod audit;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod payments;
pub mod plan;
pub mod sweep;
pub mod types;

// re-export key types
pub use audit::{AuditLogEntry, AuditTrail};
pub use config::EngineConfig;
pub use decimal::{Money, Rate};
pub use errors::{EngineError, Result};
pub use events::{Event, EventStore};
pub use ledger::{InstallmentLedger, LedgerSnapshot};
pub use payments::{
    AdjustedAmount, InstallmentQuote, PaymentProcessor, PaymentRequest, PaymentTiming,
};
pub use plan::{generate_plan, InstallmentPlan, PlannedInstallment};
pub use sweep::OverdueSweep;
pub use types::{
    Actor, Installment, InstallmentId, InstallmentState, Payment, PaymentId, PaymentMethod,
    Purchase, PurchaseId, PurchaseStatus, UserId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
