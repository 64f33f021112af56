//! ledger-runner: headless scenario runner for CareLedger.
//!
//! Applies a JSON scenario (an ordered list of operations, each with its
//! caller and logical height) against a ledger database and prints the
//! resulting contract statistics.
//!
//! Usage:
//!   ledger-runner --scenario scenario.json --db ledger.db
//!   ledger-runner --scenario scenario.json            (in-memory)
//!   ledger-runner --scenario scenario.json --config config.json

use anyhow::{Context, Result};
use careledger_core::{
    applicant::HealthProfile,
    config::LedgerConfig,
    engine::LedgerEngine,
    risk_model::WeightParam,
    store::LedgerStore,
    types::{Amount, ClaimId, Height, Identity, PolicyId},
};
use std::env;
use std::fs;

#[derive(serde::Deserialize)]
struct Scenario {
    steps: Vec<Step>,
}

#[derive(serde::Deserialize)]
struct Step {
    height: Height,
    caller: Identity,
    #[serde(flatten)]
    op: Op,
}

#[derive(serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Op {
    InitializeModel,
    UpdateWeight {
        param: WeightParam,
        value: u64,
    },
    SubmitApplication {
        age: u64,
        bmi: u64,
        conditions: u64,
        lifestyle: u64,
    },
    IssuePolicy {
        holder: Identity,
        coverage: Amount,
        duration: Height,
    },
    PayPremium {
        policy_id: PolicyId,
        amount: Amount,
    },
    SubmitClaim {
        policy_id: PolicyId,
        amount: Amount,
        claim_type: u64,
    },
    ResolveClaim {
        claim_id: ClaimId,
        approve: bool,
    },
    RecomputePremium {
        policy_id: PolicyId,
        new_health_score: u64,
        behavioral_improvement: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let scenario_path = arg_value(&args, "--scenario")
        .context("missing required --scenario <file>")?;
    let db = arg_value(&args, "--db").unwrap_or(":memory:");
    let config = match arg_value(&args, "--config") {
        Some(path) => LedgerConfig::from_file(path)?,
        None => LedgerConfig::default(),
    };

    println!("CareLedger — ledger-runner");
    println!("  scenario: {scenario_path}");
    println!("  db:       {db}");
    println!("  admin:    {}", config.administrator);
    println!();

    let raw = fs::read_to_string(scenario_path)
        .with_context(|| format!("reading scenario {scenario_path}"))?;
    let scenario: Scenario = serde_json::from_str(&raw).context("parsing scenario")?;

    let mut engine = if db == ":memory:" {
        LedgerEngine::in_memory(config)?
    } else {
        let store = LedgerStore::open(db)?;
        store.migrate()?;
        LedgerEngine::new(store, config)
    };

    let mut failures = 0u64;
    for (i, step) in scenario.steps.iter().enumerate() {
        match apply(&mut engine, step) {
            Ok(outcome) => println!("[{i}] h={} {} -> {outcome}", step.height, step.caller),
            Err(e) => {
                failures += 1;
                println!("[{i}] h={} {} -> FAILED: {e}", step.height, step.caller);
            }
        }
    }

    let stats = engine.stats()?;
    println!();
    println!("── Final contract statistics ──────────────────");
    println!("  policies issued:     {}", stats.policy_count);
    println!("  claims submitted:    {}", stats.claim_count);
    println!("  premiums collected:  {}", stats.premiums_collected);
    println!("  claims paid:         {}", stats.claims_paid);
    println!("  model version:       {}", stats.model_version);
    println!("  failed steps:        {failures}");

    Ok(())
}

fn apply(engine: &mut LedgerEngine, step: &Step) -> Result<String> {
    let caller = &step.caller;
    let height = step.height;
    let outcome = match &step.op {
        Op::InitializeModel => {
            engine.initialize_model(caller, height)?;
            "model initialized".to_string()
        }
        Op::UpdateWeight { param, value } => {
            let version = engine.update_weight(caller, height, *param, *value)?;
            format!("weight {param} = {value}, model version {version}")
        }
        Op::SubmitApplication {
            age,
            bmi,
            conditions,
            lifestyle,
        } => {
            let assessment = engine.submit_application(
                caller,
                height,
                HealthProfile {
                    age: *age,
                    bmi: *bmi,
                    conditions: *conditions,
                    lifestyle: *lifestyle,
                },
            )?;
            format!(
                "assessed: score {}, level {}",
                assessment.risk_score, assessment.risk_level
            )
        }
        Op::IssuePolicy {
            holder,
            coverage,
            duration,
        } => {
            let issued = engine.issue_policy(caller, height, holder, *coverage, *duration)?;
            format!("policy {} issued, premium {}", issued.policy_id, issued.premium)
        }
        Op::PayPremium { policy_id, amount } => {
            engine.pay_premium(caller, height, *policy_id, *amount)?;
            format!("premium {amount} paid on policy {policy_id}")
        }
        Op::SubmitClaim {
            policy_id,
            amount,
            claim_type,
        } => {
            let submitted =
                engine.submit_claim(caller, height, *policy_id, *amount, *claim_type)?;
            format!(
                "claim {} submitted, fraud score {}",
                submitted.claim_id, submitted.fraud_score
            )
        }
        Op::ResolveClaim { claim_id, approve } => {
            let verdict = engine.resolve_claim(caller, height, *claim_id, *approve)?;
            format!("claim {claim_id} resolved: {verdict:?}")
        }
        Op::RecomputePremium {
            policy_id,
            new_health_score,
            behavioral_improvement,
        } => {
            let adj = engine.recompute_premium(
                caller,
                height,
                *policy_id,
                *new_health_score,
                *behavioral_improvement,
            )?;
            format!(
                "policy {policy_id} premium {} -> {} ({:+}%)",
                adj.old_premium, adj.new_premium, adj.adjustment_percent
            )
        }
    };
    Ok(outcome)
}

fn arg_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
