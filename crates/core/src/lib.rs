//! Core data model for the simulation adapter.
//!
//! This crate holds everything the request/response normalization layer
//! agrees on before any engine is involved:
//! - RawValue + sanitize: engine-native scalars and their JSON-safe form
//! - SimulationRequest: the typed, validated request parsed once at ingress
//! - VariablesMeta: per-variable periodicity metadata
//! - ResultTree: the nested (collection → entity → variable → period) output

pub mod meta;
pub mod request;
pub mod tree;
pub mod value;

pub use meta::{periodicity, VariableMeta, VariablesMeta};
pub use request::{RequestError, SimulationRequest};
pub use tree::ResultTree;
pub use value::{sanitize, RawValue};
