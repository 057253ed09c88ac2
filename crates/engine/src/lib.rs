//! Engine capability interface.
//!
//! The actual tax-benefit engine is an external collaborator. The adapter
//! consumes it through this narrow trait so the orchestrator can run
//! against the real thing or against scripted outcomes (see [`replay`]).

pub mod replay;

pub use replay::{BuildError, ReplayEngine, ReplaySpec};

use fisca_core::RawValue;
use thiserror::Error;

/// Error raised by an engine for one (variable, period) calculation.
///
/// The engine is a black box: nothing beyond the message is recoverable,
/// and callers log it and move on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CalculateError {
    pub message: String,
}

impl CalculateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A variable's owning collection and the ordered entity ids inside it.
///
/// The id order is fixed when the simulation is built and aligns
/// index-for-index with the arrays [`Engine::calculate`] returns: result
/// `i` belongs to `entity_ids[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityBinding {
    pub collection: String,
    pub entity_ids: Vec<String>,
}

/// A built simulation, ready to answer calculation requests.
///
/// ## Contract
///
/// - `resolve_entity` returns `None` for variables the engine does not
///   know; callers skip those rather than fail.
/// - `calculate` returns one raw value per entity id in the binding's
///   order; a shorter array is legal and callers ignore the missing tail.
pub trait Engine {
    /// Owning collection and ordered entity ids for a variable.
    fn resolve_entity(&self, variable: &str) -> Option<EntityBinding>;

    /// Compute a variable over one period for every entity in its
    /// collection.
    fn calculate(&self, variable: &str, period: &str) -> Result<Vec<RawValue>, CalculateError>;
}
