//! openfisca-local: translate an ad-hoc JSON simulation request into engine
//! calls and reassemble the outputs into a normalized nested response.
//!
//! The pipeline: typed request ingestion → entity resolution → period
//! resolution → `calculate(variable, period)` → value sanitization →
//! nested aggregation. The engine behind `calculate` is a capability trait;
//! the in-tree implementation replays recorded outcomes.

pub mod config;

// ============================================================================
// Public API types — re-exported from the internal crates
// ============================================================================

pub use fisca_core::{
    periodicity, sanitize, RawValue, RequestError, ResultTree, SimulationRequest, VariableMeta,
    VariablesMeta,
};

pub use fisca_engine::{BuildError, CalculateError, Engine, EntityBinding, ReplayEngine, ReplaySpec};

pub use fisca_executor::{resolve_periods, run_simulation, SOURCE_TAG};
