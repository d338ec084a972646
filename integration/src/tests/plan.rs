//! Tests of approval plans applied on-chain

use std::collections::HashMap;

use action_codec::{ActionType, ApprovalRegistry};
use alloy::primitives::Address;
use eyre::Result;
use itertools::Itertools;
use scripts::plan::{AddressBook, ApprovalPlan, PlanCheck, PlanEntry};

use crate::{
    constants::{APPROVE_SIGNATURE, PING_SIGNATURE},
    integration_test,
    test_args::TestArgs,
    util::allowlist::{apply_approval, check_parity},
};

/// A named set of freshly generated addresses
struct Book(HashMap<&'static str, Address>);

impl AddressBook for Book {
    fn lookup(&self, name: &str) -> Option<Address> {
        self.0.get(name).copied()
    }
}

/// Applying a plan on-chain yields the same sample call outcomes as a dry run
async fn test_plan_matches_dry_run(args: TestArgs) -> Result<()> {
    let book = Book(HashMap::from([
        ("token", Address::random()),
        ("router", Address::random()),
        ("vault", Address::random()),
    ]));
    let plan = sample_plan();

    let mut dry_registry = ApprovalRegistry::new();
    let expected = plan.dry_run(&mut dry_registry, &book)?;
    eyre::ensure!(expected.iter().all(|outcome| outcome.passed()), "dry run failed its checks");

    let mut registry = ApprovalRegistry::new();
    let mut outcomes = Vec::new();
    for entry in &plan.approvals {
        let descriptor = entry.descriptor(&book)?;
        apply_approval(&args, &mut registry, &descriptor).await?;

        if let Some(data) = entry.check_calldata(&book)? {
            outcomes.push(check_parity(&args, &registry, descriptor.target, &data).await?);
        }
    }

    let expected = expected.iter().map(|outcome| outcome.allowed).collect_vec();
    eyre::ensure!(outcomes == expected, "on-chain {outcomes:?}, dry run {expected:?}");
    Ok(())
}
integration_test!(test_plan_matches_dry_run);

/// A plan that pins a spender, grants a whole function and a whole contract,
/// then revokes the pinned spender
fn sample_plan() -> ApprovalPlan {
    let approve = PlanEntry {
        scope: ActionType::Parameter,
        target: "token".to_string(),
        signature: Some(APPROVE_SIGNATURE.to_string()),
        locator: Some("0".to_string()),
        value: Some("router".to_string()),
        revoke: false,
        check: Some(PlanCheck { args: vec!["router".to_string(), "1".to_string()], expect: true }),
    };

    ApprovalPlan {
        approvals: vec![
            approve.clone(),
            PlanEntry {
                scope: ActionType::Function,
                target: "vault".to_string(),
                signature: Some(PING_SIGNATURE.to_string()),
                locator: None,
                value: None,
                revoke: false,
                check: Some(PlanCheck { args: vec!["5".to_string()], expect: true }),
            },
            PlanEntry {
                scope: ActionType::Contract,
                target: "router".to_string(),
                signature: None,
                locator: None,
                value: None,
                revoke: false,
                check: None,
            },
            PlanEntry {
                revoke: true,
                check: Some(PlanCheck {
                    args: vec!["router".to_string(), "1".to_string()],
                    expect: false,
                }),
                ..approve
            },
        ],
    }
}
