//! Nested result aggregation.
//!
//! Results accumulate as collection → entity → variable → period, each leaf
//! wrapped as `{"value": <sanitized>}`. The wrapping is part of the wire
//! format, not an implementation detail.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

type PeriodLeaves = BTreeMap<String, Value>;
type VariablePeriods = BTreeMap<String, PeriodLeaves>;
type EntityVariables = BTreeMap<String, VariablePeriods>;

/// In-place aggregation tree for sanitized results.
///
/// Intermediate levels are created on demand and a write to an existing
/// (collection, entity, variable, period) key replaces the leaf — last
/// write wins, no merging. BTreeMap keeps key order deterministic so
/// identical inputs render identical JSON.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTree {
    collections: BTreeMap<String, EntityVariables>,
}

impl ResultTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one sanitized value, wrapping it as `{"value": v}`.
    pub fn store(
        &mut self,
        collection: &str,
        entity_id: &str,
        variable: &str,
        period: &str,
        value: Value,
    ) {
        let mut leaf = Map::new();
        leaf.insert("value".to_string(), value);

        self.collections
            .entry(collection.to_string())
            .or_default()
            .entry(entity_id.to_string())
            .or_default()
            .entry(variable.to_string())
            .or_default()
            .insert(period.to_string(), Value::Object(leaf));
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Render each collection as a `(key, JSON object)` pair, in key order.
    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.collections
            .into_iter()
            .map(|(collection, entities)| (collection, render_entities(entities)))
            .collect()
    }

    /// Render the whole tree as one JSON object.
    pub fn into_value(self) -> Value {
        let mut out = Map::new();
        for (collection, view) in self.into_entries() {
            out.insert(collection, view);
        }
        Value::Object(out)
    }
}

fn render_entities(entities: EntityVariables) -> Value {
    let mut out = Map::new();
    for (entity_id, variables) in entities {
        let mut by_variable = Map::new();
        for (variable, periods) in variables {
            let mut by_period = Map::new();
            for (period, leaf) in periods {
                by_period.insert(period, leaf);
            }
            by_variable.insert(variable, Value::Object(by_period));
        }
        out.insert(entity_id, Value::Object(by_variable));
    }
    Value::Object(out)
}
