//! CareLedger — a deterministic underwriting and claims ledger.
//!
//! Evaluates health-insurance applicants with a fixed weighted risk
//! formula, derives risk-adjusted premiums, and runs the policy and claim
//! lifecycle as an atomic, auditable state machine. Time is a logical
//! height counter supplied by the caller; there is no randomness and no
//! wall clock, so the same operation sequence always produces the same
//! state and the same audit log.

pub mod applicant;
pub mod claim;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod policy;
pub mod premium;
pub mod risk_model;
pub mod store;
pub mod types;
