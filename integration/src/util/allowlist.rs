//! Helpers for driving the on-chain allowlist alongside a local registry

use action_codec::{ActionDescriptor, ApprovalRegistry};
use alloy::primitives::{Address, Bytes};
use eyre::Result;

use crate::{
    test_args::TestArgs,
    util::transactions::{call_helper, wait_for_tx_success},
};

/// Send an approval to the balance contract and mirror it in the local registry
pub async fn apply_approval(
    args: &TestArgs,
    registry: &mut ApprovalRegistry,
    descriptor: &ActionDescriptor,
) -> Result<()> {
    let call = descriptor.approve_call();
    wait_for_tx_success(args.balance_contract.call_builder(&call)).await?;
    registry.apply(descriptor);
    Ok(())
}

/// Check that the balance contract and the local registry agree on a call,
/// returning whether it is allowed
pub async fn check_parity(
    args: &TestArgs,
    registry: &ApprovalRegistry,
    target: Address,
    data: &Bytes,
) -> Result<bool> {
    let on_chain = call_helper(args.balance_contract.isActionAllowed(target, data.clone())).await?;
    let local = registry.is_action_allowed(target, data);
    eyre::ensure!(
        on_chain == local,
        "allowlist disagrees on call to {target:#x} with calldata {data}: on-chain {on_chain}, local {local}"
    );

    Ok(on_chain)
}
