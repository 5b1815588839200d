pub mod engine;
pub mod selector;
pub mod status;

pub use engine::{ReconcileError, ReconciliationEngine, RunSummary};
