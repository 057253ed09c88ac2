//! Period discovery.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// Determine which periods to query for `variable`.
///
/// Every period key already present under
/// `payload[collection][<entity>][variable]`, across all entities, is an
/// explicit request (the literal key `"value"` is not a period). When none
/// exist, exactly one default is used: `default_year` when the periodicity
/// is the literal string `"year"`, `default_month` for anything else —
/// only `"year"` is special-cased, on purpose.
///
/// Non-object shapes at any payload level contribute nothing; malformed
/// payloads never fail here. The returned keys are distinct and sorted
/// lexicographically so repeated runs query in the same order.
pub fn resolve_periods(
    payload: &Map<String, Value>,
    collection: &str,
    variable: &str,
    default_month: &str,
    default_year: &str,
    periodicity: Option<&str>,
) -> Vec<String> {
    let mut periods: BTreeSet<String> = BTreeSet::new();

    if let Some(Value::Object(members)) = payload.get(collection) {
        for entity_values in members.values() {
            let Some(variable_values) = entity_values.as_object().and_then(|m| m.get(variable))
            else {
                continue;
            };
            let Some(by_period) = variable_values.as_object() else {
                continue;
            };
            for period_key in by_period.keys() {
                if period_key == "value" {
                    continue;
                }
                periods.insert(period_key.clone());
            }
        }
    }

    if periods.is_empty() {
        let default = if periodicity == Some("year") {
            default_year
        } else {
            default_month
        };
        periods.insert(default.to_string());
    }

    periods.into_iter().collect()
}
