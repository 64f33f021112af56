//! File-backed stores survive a close and reopen with identical state.

use careledger_core::{
    applicant::HealthProfile,
    config::LedgerConfig,
    engine::LedgerEngine,
    policy::PolicyStatus,
    store::LedgerStore,
};
use std::fs;

#[test]
fn file_backed_ledger_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "careledger-persistence-{}.db",
        std::process::id()
    ));
    let path_str = path.to_str().expect("utf-8 temp path");
    let _ = fs::remove_file(&path);

    let admin = "admin".to_string();
    let alice = "alice".to_string();

    {
        let store = LedgerStore::open(path_str).unwrap();
        store.migrate().unwrap();
        let mut engine = LedgerEngine::new(store, LedgerConfig::default());

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
        let issued = engine
            .issue_policy(&admin, 2, &alice, 50_000, 1_000)
            .unwrap();
        engine
            .pay_premium(&alice, 3, issued.policy_id, 1_000)
            .unwrap();
    } // connection dropped here

    let store = LedgerStore::open(path_str).unwrap();
    store.migrate().unwrap(); // idempotent on an existing database
    let engine = LedgerEngine::new(store, LedgerConfig::default());

    let stats = engine.stats().unwrap();
    assert_eq!(stats.policy_count, 1);
    assert_eq!(stats.premiums_collected, 1_000);

    let policy = engine.policy(1).unwrap().expect("persisted policy");
    assert_eq!(policy.holder, alice);
    assert_eq!(policy.premium, 1_000);
    assert_eq!(policy.status, PolicyStatus::Active);

    assert_eq!(engine.audit_log().unwrap().len(), 3);

    let _ = fs::remove_file(&path);
}
