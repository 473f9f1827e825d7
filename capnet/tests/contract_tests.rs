//! Tests for the `/find_config` JSON contract

use capnet::prelude::*;
use capnet::{ConfigForm, FormError, INTERNAL_FAULT_MESSAGE};
use serde_json::{json, Value};

fn respond(body: &str) -> Value {
    let response = CapnetCore::respond_json(body, &SolverOptions::default());
    serde_json::to_value(response).unwrap()
}

#[test]
fn test_success_payload_fields() {
    let value = respond(r#"{"target": 15, "branches": 2, "fixed": 10, "max_parallel": 3, "available": [5, 10, 15]}"#);

    assert_eq!(value["status"], "success");
    assert_eq!(value["target_capacitance"], json!(15.0));
    let branches = value["branches"].as_array().unwrap();
    assert_eq!(branches.len(), 2);
    for branch in branches {
        let counts = branch["parallel_group_counts"].as_object().unwrap();
        let keys: Vec<&str> = counts.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&"5F"));
        assert!(keys.contains(&"10F"));
        assert!(keys.contains(&"15F"));
        assert!(branch["c_fixed"].is_number());
        assert!(branch["total_parallel_caps_in_group"].is_u64());
        assert!(branch["c_parallel_group"].is_number());
        assert!(branch["c_branch_total"].is_number());
    }
}

#[test]
fn test_empty_body_uses_defaults() {
    let value = respond("{}");
    assert_eq!(value["status"], "success");
    assert_eq!(value["target_capacitance"], json!(75.0));
    assert_eq!(value["branches"].as_array().unwrap().len(), 3);
}

#[test]
fn test_error_payload() {
    let value = respond(r#"{"branches": -2}"#);
    assert_eq!(value["status"], "error");
    assert!(value["message"].as_str().unwrap().contains("branches"));
    assert!(value.get("branches").is_none());
}

#[test]
fn test_malformed_body() {
    let value = respond(r#"{"target": "lots"}"#);
    assert_eq!(value["status"], "error");
    assert_ne!(value["message"], INTERNAL_FAULT_MESSAGE);
}

#[test]
fn test_response_round_trips_through_json() {
    let response = capnet::find_config(&FindConfigRequest::default());
    let text = serde_json::to_string(&response).unwrap();
    let back: FindConfigResponse = serde_json::from_str(&text).unwrap();
    assert_eq!(back, response);
}

#[test]
fn test_form_to_response() {
    let form = ConfigForm {
        target: "15".to_string(),
        branches: "2".to_string(),
        fixed: "10".to_string(),
        max_parallel: "3".to_string(),
        available: "5, 10, 15".to_string(),
    };
    let request = form.validate().unwrap();
    match capnet::find_config(&request) {
        FindConfigResponse::Success(report) => assert!(report.absolute_difference < 1e-9),
        other => panic!("expected success, got {:?}", other),
    }
}

#[test]
fn test_form_rejects_before_solving() {
    let form = ConfigForm {
        target: "15".to_string(),
        branches: "2".to_string(),
        fixed: "10".to_string(),
        max_parallel: "3".to_string(),
        available: "abc".to_string(),
    };
    assert_eq!(form.validate().unwrap_err(), FormError::NotANumber);
}
