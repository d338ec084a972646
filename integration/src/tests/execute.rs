//! Tests of relaying calls through the balance contract

use action_codec::{calldata::encode_call, ActionDescriptor};
use alloy::{
    primitives::{utils::parse_ether, Address, U256},
    providers::ext::AnvilApi,
    sol_types::SolCall,
};
use eyre::Result;
use scripts::solidity::IBalanceContract;

use crate::{
    constants::PING_SIGNATURE,
    integration_test,
    test_args::TestArgs,
    util::transactions::{send_unsigned_reverts, wait_for_tx_success},
};

/// The operator can relay an allowlisted call, and only an allowlisted call
async fn test_execute_allowlisted_call(args: TestArgs) -> Result<()> {
    // Calls to an account without code succeed for any calldata
    let target = Address::random();
    let data = encode_call(PING_SIGNATURE, &["42"])?;

    let refused = args
        .balance_contract
        .executeAction(target, U256::ZERO, data.clone())
        .call()
        .await;
    eyre::ensure!(refused.is_err(), "call relayed before it was allowlisted");

    let grant = ActionDescriptor::for_function(target, PING_SIGNATURE)?;
    wait_for_tx_success(args.balance_contract.call_builder(&grant.approve_call())).await?;
    wait_for_tx_success(args.balance_contract.executeAction(target, U256::ZERO, data)).await?;

    Ok(())
}
integration_test!(test_execute_allowlisted_call);

/// An account without the operator role cannot relay calls, even allowlisted ones
async fn test_execute_requires_operator(args: TestArgs) -> Result<()> {
    let target = Address::random();
    let grant = ActionDescriptor::contract(target);
    wait_for_tx_success(args.balance_contract.call_builder(&grant.approve_call())).await?;

    let intruder = Address::random();
    args.node.anvil_set_balance(intruder, parse_ether("1")?).await?;
    args.node.anvil_impersonate_account(intruder).await?;

    let data = IBalanceContract::executeActionCall {
        target,
        value: U256::ZERO,
        data: encode_call(PING_SIGNATURE, &["1"])?,
    }
    .abi_encode();
    let reverted =
        send_unsigned_reverts(&args.node, intruder, args.balance_contract_addr(), data.into())
            .await;
    args.node.anvil_stop_impersonating_account(intruder).await?;

    eyre::ensure!(reverted?, "call relayed for an account without the operator role");
    Ok(())
}
integration_test!(test_execute_requires_operator);
