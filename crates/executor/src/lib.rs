//! Request orchestration over a black-box engine.
//!
//! `periods` decides which periods to query for each variable; the
//! orchestrator drives the engine sequentially and assembles the response
//! envelope. Per-item failures degrade, they never abort the batch.

pub mod orchestrator;
pub mod periods;

pub use orchestrator::{run_simulation, SOURCE_TAG};
pub use periods::resolve_periods;
