//! Policy issuance and premium payment.

use careledger_core::{
    applicant::HealthProfile,
    config::LedgerConfig,
    engine::LedgerEngine,
    error::LedgerError,
    policy::PolicyStatus,
    types::Identity,
};

fn admin() -> Identity {
    "admin".to_string()
}

/// Engine with one assessed applicant "alice" (score 19, Low).
fn engine_with_alice() -> (LedgerEngine, Identity) {
    let mut engine = LedgerEngine::in_memory(LedgerConfig::default()).unwrap();
    let alice = "alice".to_string();
    engine
        .submit_application(
            &alice,
            1,
            HealthProfile {
                age: 30,
                bmi: 25,
                conditions: 1,
                lifestyle: 50,
            },
        )
        .unwrap();
    (engine, alice)
}

#[test]
fn issuance_requires_administrator() {
    let (mut engine, alice) = engine_with_alice();
    let err = engine
        .issue_policy(&alice, 2, &alice, 50_000, 1_000)
        .unwrap_err();
    assert!(matches!(err, LedgerError::OwnerOnly));
}

#[test]
fn issuance_requires_an_assessed_applicant() {
    let mut engine = LedgerEngine::in_memory(LedgerConfig::default()).unwrap();
    let ghost = "ghost".to_string();
    let err = engine
        .issue_policy(&admin(), 2, &ghost, 50_000, 1_000)
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
    assert_eq!(engine.stats().unwrap().policy_count, 0);
}

#[test]
fn issued_policy_round_trips_through_query() {
    let (mut engine, alice) = engine_with_alice();
    let issued = engine
        .issue_policy(&admin(), 5, &alice, 50_000, 1_000)
        .unwrap();
    // Low risk: 50_000 * 2 / 100
    assert_eq!(issued.premium, 1_000);

    let policy = engine.policy(issued.policy_id).unwrap().expect("policy");
    assert_eq!(policy.holder, alice);
    assert_eq!(policy.premium, 1_000);
    assert_eq!(policy.coverage, 50_000);
    assert_eq!(policy.status, PolicyStatus::Active);
    assert_eq!(policy.start_height, 5);
    assert_eq!(policy.end_height, 1_005);
    assert_eq!(policy.claims_count, 0);
    assert_eq!(policy.total_claimed, 0);
}

#[test]
fn premium_follows_the_applicants_current_risk_level() {
    let mut engine = LedgerEngine::in_memory(LedgerConfig::default()).unwrap();
    let bob = "bob".to_string();
    // 100*25/100 + 50*30/100 + 10*35/100 + 100*10/100 = 25+15+3+10 = 53 -> Medium
    engine
        .submit_application(
            &bob,
            1,
            HealthProfile {
                age: 100,
                bmi: 50,
                conditions: 10,
                lifestyle: 100,
            },
        )
        .unwrap();
    let issued = engine
        .issue_policy(&admin(), 2, &bob, 100_000, 500)
        .unwrap();
    assert_eq!(issued.premium, 4_000);
}

#[test]
fn unquotable_coverage_is_rejected_before_issuance() {
    let (mut engine, alice) = engine_with_alice();
    let err = engine
        .issue_policy(&admin(), 2, &alice, u64::MAX, 1_000)
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidInput { .. }));
    assert_eq!(engine.stats().unwrap().policy_count, 0);
}

#[test]
fn one_policy_per_holder() {
    let (mut engine, alice) = engine_with_alice();
    engine
        .issue_policy(&admin(), 2, &alice, 50_000, 1_000)
        .unwrap();
    let err = engine
        .issue_policy(&admin(), 3, &alice, 80_000, 1_000)
        .unwrap_err();
    assert!(matches!(err, LedgerError::AlreadyExists { .. }));
    assert_eq!(engine.stats().unwrap().policy_count, 1);
}

#[test]
fn policy_ids_are_monotonic() {
    let mut engine = LedgerEngine::in_memory(LedgerConfig::default()).unwrap();
    for (i, name) in ["alice", "bob", "carol"].iter().enumerate() {
        let holder = name.to_string();
        engine
            .submit_application(
                &holder,
                1,
                HealthProfile {
                    age: 30,
                    bmi: 25,
                    conditions: 1,
                    lifestyle: 50,
                },
            )
            .unwrap();
        let issued = engine
            .issue_policy(&admin(), 2, &holder, 50_000, 1_000)
            .unwrap();
        assert_eq!(issued.policy_id, i as u64 + 1);
    }
}

#[test]
fn payment_requires_the_holder() {
    let (mut engine, alice) = engine_with_alice();
    let issued = engine
        .issue_policy(&admin(), 2, &alice, 50_000, 1_000)
        .unwrap();

    let mallory = "mallory".to_string();
    let err = engine
        .pay_premium(&mallory, 3, issued.policy_id, 1_000)
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));

    // The administrator is not the holder either.
    let err = engine
        .pay_premium(&admin(), 3, issued.policy_id, 1_000)
        .unwrap_err();
    assert!(matches!(err, LedgerError::Unauthorized { .. }));
}

#[test]
fn underpayment_is_rejected_and_leaves_aggregates_unchanged() {
    let (mut engine, alice) = engine_with_alice();
    let issued = engine
        .issue_policy(&admin(), 2, &alice, 50_000, 1_000)
        .unwrap();

    let err = engine
        .pay_premium(&alice, 3, issued.policy_id, 999)
        .unwrap_err();
    assert!(matches!(
        err,
        LedgerError::InsufficientFunds {
            paid: 999,
            required: 1_000
        }
    ));
    assert_eq!(engine.stats().unwrap().premiums_collected, 0);
}

#[test]
fn payment_feeds_the_premiums_collected_aggregate() {
    let (mut engine, alice) = engine_with_alice();
    let issued = engine
        .issue_policy(&admin(), 2, &alice, 50_000, 1_000)
        .unwrap();

    engine.pay_premium(&alice, 3, issued.policy_id, 1_000).unwrap();
    // Overpayment is accepted and recorded in full.
    engine.pay_premium(&alice, 4, issued.policy_id, 1_500).unwrap();
    assert_eq!(engine.stats().unwrap().premiums_collected, 2_500);

    // Payment does not extend expiry.
    let policy = engine.policy(issued.policy_id).unwrap().unwrap();
    assert_eq!(policy.end_height, 1_002);
}

#[test]
fn payment_on_unknown_policy_fails_not_found() {
    let (mut engine, alice) = engine_with_alice();
    let err = engine.pay_premium(&alice, 3, 42, 1_000).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}
