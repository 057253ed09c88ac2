//! The per-variable orchestration loop.
//!
//! Sequential and deterministic: variables in request order, periods in
//! sorted order, entity ids in build order. Per-item failures degrade;
//! only request ingestion and simulation construction can abort a run, and
//! both happen before this loop starts.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use fisca_core::{periodicity, sanitize, ResultTree, SimulationRequest, VariablesMeta};
use fisca_engine::Engine;

use crate::periods::resolve_periods;

/// Fixed `metadata.source` tag carried in every response.
pub const SOURCE_TAG: &str = "openfisca-local";

/// Run every requested variable through the engine and assemble the
/// response envelope.
///
/// Failure policy:
/// - unknown variables and empty collections are skipped silently
/// - a failing (variable, period) calculation is logged with its context
///   and skipped; sibling periods and variables still run
/// - a value array shorter than the entity list is truncated silently
///
/// Every surviving value is written to both the top-level collection view
/// and the `entities` sub-view; the two stay structurally identical.
pub fn run_simulation(
    engine: &dyn Engine,
    request: &SimulationRequest,
    meta: &VariablesMeta,
    generated_at: DateTime<Utc>,
) -> Value {
    let mut aggregate = ResultTree::new();
    let mut entities_view = ResultTree::new();

    for variable in &request.variables {
        let Some(binding) = engine.resolve_entity(variable) else {
            continue;
        };
        if binding.entity_ids.is_empty() {
            continue;
        }

        let periods = resolve_periods(
            &request.payload,
            &binding.collection,
            variable,
            &request.current_month,
            &request.current_year,
            periodicity(meta, variable),
        );

        for period in &periods {
            let values = match engine.calculate(variable, period) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(
                        collection = %binding.collection,
                        variable = %variable,
                        period = %period,
                        error = %e,
                        "calculation failed"
                    );
                    continue;
                }
            };

            // zip truncates to the shorter side: a short value array just
            // leaves the remaining entities without a leaf
            for (entity_id, raw) in binding.entity_ids.iter().zip(values) {
                let value = sanitize(raw);
                aggregate.store(&binding.collection, entity_id, variable, period, value.clone());
                entities_view.store(&binding.collection, entity_id, variable, period, value);
            }
        }
    }

    assemble(aggregate, entities_view, generated_at)
}

/// Response envelope: `metadata` first, one key per touched collection,
/// then the `entities` mirror view.
fn assemble(aggregate: ResultTree, entities_view: ResultTree, generated_at: DateTime<Utc>) -> Value {
    let mut output = Map::new();
    output.insert(
        "metadata".to_string(),
        json!({
            "source": SOURCE_TAG,
            "generated_at": generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }),
    );
    for (collection, view) in aggregate.into_entries() {
        output.insert(collection, view);
    }
    output.insert("entities".to_string(), entities_view.into_value());
    Value::Object(output)
}
