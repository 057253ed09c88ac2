//! End-to-end flows through the public API:
//! - request ingestion → replay engine build → orchestration → envelope
//! - fatal-error taxonomy (nothing partial comes out)
//! - degradation policy (unknown variables, failing periods, short arrays)
//! - deterministic, byte-identical output

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};

use openfisca_local::{
    run_simulation, RawValue, ReplayEngine, ReplaySpec, RequestError, SimulationRequest,
    VariablesMeta,
};

fn stamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 0).unwrap()
}

fn spec(raw: Value) -> ReplaySpec {
    serde_json::from_value(raw).unwrap()
}

/// The worked example from the reference pipeline: one individual, one
/// variable, one explicit month.
#[test]
fn test_salaire_net_worked_example() {
    let request = SimulationRequest::from_value(
        json!({
            "payload": {"individus": {"i1": {}}},
            "variables": ["salaire_net"],
            "currentMonth": "2024-03"
        }),
        stamp(),
    )
    .unwrap();

    let engine = ReplayEngine::from_spec(
        spec(json!({
            "variables": {"salaire_net": "individus"},
            "results": {"salaire_net": {"2024-03": [1500.0]}}
        })),
        &request.payload,
    )
    .unwrap();

    let out = run_simulation(&engine, &request, &VariablesMeta::new(), stamp());

    assert_eq!(out["metadata"]["source"], "openfisca-local");
    assert_eq!(out["metadata"]["generated_at"], "2024-03-15T09:30:00Z");
    assert_eq!(out["individus"]["i1"]["salaire_net"]["2024-03"]["value"], 1500.0);
    assert_eq!(
        out["entities"]["individus"]["i1"]["salaire_net"]["2024-03"]["value"],
        1500.0
    );
}

#[test]
fn test_empty_or_invalid_variables_fail_before_any_calculation() {
    let err = SimulationRequest::from_value(
        json!({"payload": {}, "variables": []}),
        stamp(),
    )
    .unwrap_err();
    assert_eq!(err, RequestError::NoVariables);

    let err = SimulationRequest::from_value(
        json!({"payload": {}, "variables": [1, "", null]}),
        stamp(),
    )
    .unwrap_err();
    assert_eq!(err, RequestError::NoVariables);

    let err = SimulationRequest::from_value(json!({"variables": ["rsa"]}), stamp()).unwrap_err();
    assert_eq!(err, RequestError::InvalidPayload);
}

/// A failing (variable, period) pair degrades to a diagnostic: no leaf for
/// it, every sibling still computed, the run as a whole succeeds.
#[test]
fn test_failing_variable_leaves_siblings_intact() {
    let request = SimulationRequest::from_value(
        json!({
            "payload": {"individus": {"i1": {}}, "foyers_fiscaux": {"ff1": {}}},
            "variables": ["impot", "salaire_net"],
            "currentMonth": "2024-03"
        }),
        stamp(),
    )
    .unwrap();

    let engine = ReplayEngine::from_spec(
        spec(json!({
            "variables": {"impot": "foyers_fiscaux", "salaire_net": "individus"},
            "results": {"salaire_net": {"2024-03": [1500.0]}},
            "failures": {"impot": {"2024-03": "circular reference"}}
        })),
        &request.payload,
    )
    .unwrap();

    let out = run_simulation(&engine, &request, &VariablesMeta::new(), stamp());

    assert!(out.get("foyers_fiscaux").is_none());
    assert!(out["entities"].get("foyers_fiscaux").is_none());
    assert_eq!(out["individus"]["i1"]["salaire_net"]["2024-03"]["value"], 1500.0);
}

/// Periods supplied in the payload are exactly the periods queried.
#[test]
fn test_explicit_period_round_trip() {
    let request = SimulationRequest::from_value(
        json!({
            "payload": {
                "individus": {
                    "i1": {"salaire_net": {"2023-11": 100, "2023-12": 200}}
                }
            },
            "variables": ["salaire_net"],
            "currentMonth": "2024-03"
        }),
        stamp(),
    )
    .unwrap();

    let engine = ReplayEngine::from_spec(
        spec(json!({
            "variables": {"salaire_net": "individus"},
            "results": {
                "salaire_net": {"2023-11": [100.0], "2023-12": [200.0]}
            }
        })),
        &request.payload,
    )
    .unwrap();

    let out = run_simulation(&engine, &request, &VariablesMeta::new(), stamp());
    let by_period = out["individus"]["i1"]["salaire_net"].as_object().unwrap();
    let keys: Vec<&str> = by_period.keys().map(|k| k.as_str()).collect();
    // no default month added
    assert_eq!(keys, vec!["2023-11", "2023-12"]);
}

/// Variables with year periodicity default to the request's year.
#[test]
fn test_year_periodicity_default() {
    let request = SimulationRequest::from_value(
        json!({
            "payload": {"foyers_fiscaux": {"ff1": {}}},
            "variables": ["irpp"],
            "currentMonth": "2024-03",
            "currentYear": "2024"
        }),
        stamp(),
    )
    .unwrap();

    let engine = ReplayEngine::from_spec(
        spec(json!({
            "variables": {"irpp": "foyers_fiscaux"},
            "results": {"irpp": {"2024": [-350.5]}}
        })),
        &request.payload,
    )
    .unwrap();

    let meta: VariablesMeta =
        serde_json::from_value(json!({"irpp": {"periodicity": "year"}})).unwrap();

    let out = run_simulation(&engine, &request, &meta, stamp());
    assert_eq!(out["foyers_fiscaux"]["ff1"]["irpp"]["2024"]["value"], -350.5);
    assert!(out["foyers_fiscaux"]["ff1"]["irpp"].get("2024-03").is_none());
}

/// Same request, same scripted engine → byte-identical JSON.
#[test]
fn test_byte_identical_output() {
    let raw_request = json!({
        "payload": {
            "individus": {"marc": {}, "lea": {}},
            "familles": {"f1": {"parents": ["marc", "lea"]}}
        },
        "variables": ["salaire_net", "rsa"],
        "currentMonth": "2024-03"
    });
    let fixture = json!({
        "variables": {"salaire_net": "individus", "rsa": "familles"},
        "results": {
            "salaire_net": {"2024-03": [2100.0, 1800.0]},
            "rsa": {"2024-03": [0.0]}
        }
    });

    let render = || {
        let request = SimulationRequest::from_value(raw_request.clone(), stamp()).unwrap();
        let engine = ReplayEngine::from_spec(spec(fixture.clone()), &request.payload).unwrap();
        let out = run_simulation(&engine, &request, &VariablesMeta::new(), stamp());
        serde_json::to_string(&out).unwrap()
    };

    assert_eq!(render(), render());
}

/// Entity ids keep payload document order, and result arrays align with it.
#[test]
fn test_entity_order_alignment_end_to_end() {
    let request = SimulationRequest::from_value(
        json!({
            "payload": {"individus": {"zoe": {}, "ana": {}}},
            "variables": ["salaire_net"],
            "currentMonth": "2024-03"
        }),
        stamp(),
    )
    .unwrap();

    let engine = ReplayEngine::from_spec(
        spec(json!({
            "variables": {"salaire_net": "individus"},
            "results": {"salaire_net": {"2024-03": [1.0, 2.0]}}
        })),
        &request.payload,
    )
    .unwrap();

    let out = run_simulation(&engine, &request, &VariablesMeta::new(), stamp());
    // "zoe" appears first in the payload, so it owns the first value
    assert_eq!(out["individus"]["zoe"]["salaire_net"]["2024-03"]["value"], 1.0);
    assert_eq!(out["individus"]["ana"]["salaire_net"]["2024-03"]["value"], 2.0);
}

/// Engine-native bytes decode to text, or hex when not UTF-8.
#[test]
fn test_byte_values_sanitize_losslessly() {
    let request = SimulationRequest::from_value(
        json!({
            "payload": {"individus": {"i1": {}, "i2": {}}},
            "variables": ["statut"],
            "currentMonth": "2024-03"
        }),
        stamp(),
    )
    .unwrap();

    let mut engine = ReplayEngine::empty();
    engine.register("statut", "individus", vec!["i1".to_string(), "i2".to_string()]);
    engine.script_result(
        "statut",
        "2024-03",
        vec![
            RawValue::Bytes("actif".as_bytes().to_vec()),
            RawValue::Bytes(vec![0xc3, 0x28]), // invalid UTF-8
        ],
    );

    let out = run_simulation(&engine, &request, &VariablesMeta::new(), stamp());
    assert_eq!(out["individus"]["i1"]["statut"]["2024-03"]["value"], "actif");
    assert_eq!(out["individus"]["i2"]["statut"]["2024-03"]["value"], "c328");
}

/// Without a replay fixture no variable is known; the envelope still comes
/// out well-formed.
#[test]
fn test_empty_engine_produces_bare_envelope() {
    let request = SimulationRequest::from_value(
        json!({
            "payload": {"individus": {"i1": {}}},
            "variables": ["salaire_net"],
            "currentMonth": "2024-03"
        }),
        stamp(),
    )
    .unwrap();

    let engine = ReplayEngine::from_spec(ReplaySpec::default(), &request.payload).unwrap();
    let out = run_simulation(&engine, &request, &VariablesMeta::new(), stamp());

    let keys: Vec<&str> = out.as_object().unwrap().keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["metadata", "entities"]);
    assert_eq!(out["entities"], json!({}));
}
