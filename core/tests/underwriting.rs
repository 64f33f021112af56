//! Application submission, validation, and model administration.

use careledger_core::{
    applicant::HealthProfile,
    config::LedgerConfig,
    engine::LedgerEngine,
    error::LedgerError,
    risk_model::{RiskLevel, WeightParam},
    types::Identity,
};

fn engine() -> LedgerEngine {
    LedgerEngine::in_memory(LedgerConfig::default()).expect("in-memory engine")
}

fn admin() -> Identity {
    "admin".to_string()
}

fn profile(age: u64, bmi: u64, conditions: u64, lifestyle: u64) -> HealthProfile {
    HealthProfile {
        age,
        bmi,
        conditions,
        lifestyle,
    }
}

#[test]
fn valid_application_is_scored_and_stored() {
    let mut engine = engine();
    let alice = "alice".to_string();

    let assessment = engine
        .submit_application(&alice, 10, profile(30, 25, 1, 50))
        .unwrap();
    assert_eq!(assessment.risk_score, 19);
    assert_eq!(assessment.risk_level, RiskLevel::Low);

    let record = engine.applicant(&alice).unwrap().expect("stored record");
    assert_eq!(record.risk_score, 19);
    assert_eq!(record.risk_level, RiskLevel::Low);
    assert_eq!(record.profile.lifestyle, 50);
    assert_eq!(record.submitted_height, 10);
}

#[test]
fn out_of_range_metrics_are_rejected() {
    let mut engine = engine();
    let cases = [
        profile(17, 25, 1, 50),  // age below 18
        profile(101, 25, 1, 50), // age above 100
        profile(30, 14, 1, 50),  // bmi below 15
        profile(30, 51, 1, 50),  // bmi above 50
        profile(30, 25, 11, 50), // conditions above 10
        profile(30, 25, 1, 101), // lifestyle above 100
    ];
    for (i, p) in cases.into_iter().enumerate() {
        let caller = format!("applicant-{i}");
        let err = engine.submit_application(&caller, 1, p).unwrap_err();
        assert!(
            matches!(err, LedgerError::InvalidInput { .. }),
            "case {i}: expected InvalidInput, got {err:?}"
        );
        assert!(engine.applicant(&caller).unwrap().is_none());
    }
}

#[test]
fn duplicate_identity_is_rejected() {
    let mut engine = engine();
    let alice = "alice".to_string();

    engine
        .submit_application(&alice, 1, profile(30, 25, 1, 50))
        .unwrap();
    let err = engine
        .submit_application(&alice, 2, profile(40, 30, 2, 60))
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExists { .. }));

    // Original record untouched.
    let record = engine.applicant(&alice).unwrap().unwrap();
    assert_eq!(record.profile.age, 30);
    assert_eq!(record.submitted_height, 1);
}

#[test]
fn weight_update_requires_administrator() {
    let mut engine = engine();
    let mallory = "mallory".to_string();
    let err = engine
        .update_weight(&mallory, 1, WeightParam::Age, 40)
        .unwrap_err();
    assert!(matches!(err, LedgerError::OwnerOnly));
    assert_eq!(engine.stats().unwrap().model_version, 0);
}

#[test]
fn weight_above_one_hundred_is_rejected() {
    let mut engine = engine();
    let err = engine
        .update_weight(&admin(), 1, WeightParam::Bmi, 101)
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput { .. }));
    assert_eq!(engine.stats().unwrap().model_version, 0);
}

#[test]
fn weight_update_bumps_version_and_changes_scoring() {
    let mut engine = engine();
    let version = engine
        .update_weight(&admin(), 1, WeightParam::Age, 100)
        .unwrap();
    assert_eq!(version, 1);
    assert_eq!(engine.stats().unwrap().model_version, 1);

    // age now contributes fully: 30 + 7 + 0 + 5 = 42 -> Medium
    let bob = "bob".to_string();
    let assessment = engine
        .submit_application(&bob, 2, profile(30, 25, 1, 50))
        .unwrap();
    assert_eq!(assessment.risk_score, 42);
    assert_eq!(assessment.risk_level, RiskLevel::Medium);
}

#[test]
fn weight_sum_is_deliberately_unbounded() {
    let mut engine = engine();
    for param in [
        WeightParam::Age,
        WeightParam::Bmi,
        WeightParam::Conditions,
        WeightParam::Lifestyle,
    ] {
        engine.update_weight(&admin(), 1, param, 100).unwrap();
    }
    assert_eq!(engine.stats().unwrap().model_version, 4);

    // All metrics count fully: 30 + 25 + 1 + 50 = 106 -> Critical
    let carol = "carol".to_string();
    let assessment = engine
        .submit_application(&carol, 2, profile(30, 25, 1, 50))
        .unwrap();
    assert_eq!(assessment.risk_score, 106);
    assert_eq!(assessment.risk_level, RiskLevel::Critical);
}

#[test]
fn initialize_model_restores_defaults_without_touching_version() {
    let mut engine = engine();
    engine
        .update_weight(&admin(), 1, WeightParam::Age, 100)
        .unwrap();

    engine.initialize_model(&admin(), 2).unwrap();
    assert_eq!(engine.stats().unwrap().model_version, 1);

    let dave = "dave".to_string();
    let assessment = engine
        .submit_application(&dave, 3, profile(30, 25, 1, 50))
        .unwrap();
    assert_eq!(assessment.risk_score, 19);
}

#[test]
fn initialize_model_requires_administrator() {
    let mut engine = engine();
    let mallory = "mallory".to_string();
    let err = engine.initialize_model(&mallory, 1).unwrap_err();
    assert!(matches!(err, LedgerError::OwnerOnly));
}

#[test]
fn non_default_administrator_is_honored() {
    let config = LedgerConfig::new("underwriting-desk");
    let mut engine = LedgerEngine::in_memory(config).unwrap();

    let err = engine.initialize_model(&admin(), 1).unwrap_err();
    assert!(matches!(err, LedgerError::OwnerOnly));

    let desk = "underwriting-desk".to_string();
    engine.initialize_model(&desk, 1).unwrap();
}

#[test]
fn config_fraud_threshold_defaults_when_absent() {
    let config: LedgerConfig =
        serde_json::from_str(r#"{ "administrator": "desk" }"#).unwrap();
    assert_eq!(config.fraud_threshold, 70);
    assert_eq!(config.administrator, "desk");
}
