//! Replay engine: scripted outcomes recorded ahead of time.
//!
//! Serves two purposes: the injected test double for orchestrator tests,
//! and the offline engine behind the binary's `--replay` flag. Entity
//! collections and their id order always come from the payload at build
//! time, exactly like a real simulation build.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use fisca_core::RawValue;

use crate::{CalculateError, Engine, EntityBinding};

/// Failure constructing the simulation from the payload. Fatal upstream:
/// no partial output is produced after this.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A registered collection exists in the payload but is not an object
    #[error("payload collection `{0}` must be a JSON object")]
    MalformedCollection(String),
}

/// On-disk shape of a replay fixture.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaySpec {
    /// Variable name → owning collection key (the variable registry)
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// Variable name → period key → one value per entity, in id order
    #[serde(default)]
    pub results: BTreeMap<String, BTreeMap<String, Vec<Value>>>,
    /// Variable name → period key → error message the engine raises
    #[serde(default)]
    pub failures: BTreeMap<String, BTreeMap<String, String>>,
}

/// An [`Engine`] whose answers were recorded ahead of time.
#[derive(Debug, Clone, Default)]
pub struct ReplayEngine {
    registry: BTreeMap<String, String>,
    entities: BTreeMap<String, Vec<String>>,
    results: BTreeMap<String, BTreeMap<String, Vec<RawValue>>>,
    failures: BTreeMap<String, BTreeMap<String, String>>,
}

impl ReplayEngine {
    /// Engine with nothing registered; every variable resolves to `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a simulation from a fixture: materialize entity ids for every
    /// registered collection from the payload, in document order.
    pub fn from_spec(spec: ReplaySpec, payload: &Map<String, Value>) -> Result<Self, BuildError> {
        let mut entities: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for collection in spec.variables.values() {
            if entities.contains_key(collection) {
                continue;
            }
            let ids = match payload.get(collection) {
                Some(Value::Object(members)) => members.keys().cloned().collect(),
                Some(_) => return Err(BuildError::MalformedCollection(collection.clone())),
                None => Vec::new(),
            };
            entities.insert(collection.clone(), ids);
        }

        let results = spec
            .results
            .into_iter()
            .map(|(variable, by_period)| {
                let by_period = by_period
                    .into_iter()
                    .map(|(period, values)| {
                        (period, values.into_iter().map(RawValue::from).collect())
                    })
                    .collect();
                (variable, by_period)
            })
            .collect();

        Ok(Self {
            registry: spec.variables,
            entities,
            results,
            failures: spec.failures,
        })
    }

    /// Register a variable with its collection and that collection's ids.
    pub fn register(&mut self, variable: &str, collection: &str, entity_ids: Vec<String>) {
        self.registry
            .insert(variable.to_string(), collection.to_string());
        self.entities.insert(collection.to_string(), entity_ids);
    }

    /// Script one raw result array directly, bypassing the fixture shape.
    /// Lets tests inject values JSON cannot spell (NaN, raw bytes).
    pub fn script_result(&mut self, variable: &str, period: &str, values: Vec<RawValue>) {
        self.results
            .entry(variable.to_string())
            .or_default()
            .insert(period.to_string(), values);
    }

    /// Script a calculation failure for one (variable, period) pair.
    pub fn script_failure(&mut self, variable: &str, period: &str, message: &str) {
        self.failures
            .entry(variable.to_string())
            .or_default()
            .insert(period.to_string(), message.to_string());
    }
}

impl Engine for ReplayEngine {
    fn resolve_entity(&self, variable: &str) -> Option<EntityBinding> {
        let collection = self.registry.get(variable)?;
        let entity_ids = self.entities.get(collection).cloned().unwrap_or_default();
        Some(EntityBinding {
            collection: collection.clone(),
            entity_ids,
        })
    }

    fn calculate(&self, variable: &str, period: &str) -> Result<Vec<RawValue>, CalculateError> {
        if let Some(message) = self.failures.get(variable).and_then(|p| p.get(period)) {
            return Err(CalculateError::new(message.clone()));
        }
        self.results
            .get(variable)
            .and_then(|p| p.get(period))
            .cloned()
            .ok_or_else(|| {
                CalculateError::new(format!(
                    "no recorded result for `{}` over `{}`",
                    variable, period
                ))
            })
    }
}
