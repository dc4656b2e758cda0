//! PeakPartner Shared Library
//!
//! Pure coaching rules shared by the client runtime and the WASM bindings:
//! the data model, plan-cycle resolution, adherence reconciliation, the
//! session/reschedule state machine, payload validation and wire DTOs.
//! Nothing in this crate performs I/O.

pub mod adherence;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod plan_cycle;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use adherence::{
    daily_adherence, daily_macros, on_plan_meal_count, reconcile, DailyAdherence,
    ItemReconciliation, ItemStatus, MacroSummary, ReconciliationResult,
};
pub use errors::*;
pub use lifecycle::{ProposedSlot, SessionLifecycle};
pub use models::*;
pub use plan_cycle::{cycle_position, resolve_day_for_date, CyclePosition};
pub use types::*;
pub use validation::ValidationError;
