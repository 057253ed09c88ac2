//! Variable metadata.
//!
//! The metadata file maps variable names to descriptive records; the only
//! field period resolution cares about is `periodicity`. The file carries
//! other keys (labels, entity hints) which are ignored here.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Per-variable metadata record.
///
/// `periodicity` stays a free-form string: only the literal `"year"` is
/// special-cased downstream, every other value (or its absence) means
/// month-based resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VariableMeta {
    #[serde(default)]
    pub periodicity: Option<String>,
}

/// Metadata for every known variable, keyed by variable name.
pub type VariablesMeta = BTreeMap<String, VariableMeta>;

/// Look up the periodicity string for a variable, if any.
pub fn periodicity<'a>(meta: &'a VariablesMeta, variable: &str) -> Option<&'a str> {
    meta.get(variable).and_then(|m| m.periodicity.as_deref())
}
