//! Tests of the allowlist's grant precedence, checked against the local registry

use action_codec::{calldata::encode_call, ActionDescriptor, ApprovalRegistry, FieldLocator};
use alloy::primitives::{Address, Bytes};
use eyre::Result;

use crate::{
    constants::{APPROVE_SIGNATURE, EXACT_INPUT_SINGLE_SIGNATURE, PING_SIGNATURE},
    integration_test,
    test_args::TestArgs,
    util::allowlist::{apply_approval, check_parity},
};

// ---------
// | Tests |
// ---------

/// A parameter grant allows exactly the pinned argument, and revoking it
/// removes the grant
async fn test_parameter_grant(args: TestArgs) -> Result<()> {
    let mut registry = ApprovalRegistry::new();
    let token = Address::random();
    let spender = Address::random();
    let other_spender = Address::random();

    let grant = ActionDescriptor::for_parameter(
        token,
        APPROVE_SIGNATURE,
        FieldLocator::argument(0),
        &spender.to_string(),
    )?;
    apply_approval(&args, &mut registry, &grant).await?;

    let pinned = approve_calldata(spender)?;
    let other = approve_calldata(other_spender)?;
    eyre::ensure!(check_parity(&args, &registry, token, &pinned).await?, "pinned spender refused");
    eyre::ensure!(
        !check_parity(&args, &registry, token, &other).await?,
        "unpinned spender allowed"
    );

    apply_approval(&args, &mut registry, &grant.revoked()).await?;
    eyre::ensure!(
        !check_parity(&args, &registry, token, &pinned).await?,
        "revoked spender allowed"
    );

    Ok(())
}
integration_test!(test_parameter_grant);

/// A parameter grant on a struct field pins the field's head slot
async fn test_struct_field_grant(args: TestArgs) -> Result<()> {
    let mut registry = ApprovalRegistry::new();
    let router = Address::random();
    let recipient = Address::random();

    let grant = ActionDescriptor::for_parameter(
        router,
        EXACT_INPUT_SINGLE_SIGNATURE,
        FieldLocator::field(0, 3),
        &recipient.to_string(),
    )?;
    eyre::ensure!(grant.param_index == 3, "recipient resolved to slot {}", grant.param_index);
    apply_approval(&args, &mut registry, &grant).await?;

    let to_recipient = swap_calldata(recipient)?;
    let to_other = swap_calldata(Address::random())?;
    eyre::ensure!(
        check_parity(&args, &registry, router, &to_recipient).await?,
        "pinned recipient refused"
    );
    eyre::ensure!(
        !check_parity(&args, &registry, router, &to_other).await?,
        "unpinned recipient allowed"
    );

    Ok(())
}
integration_test!(test_struct_field_grant);

/// A function grant allows any arguments, and outlives a revoked parameter grant
async fn test_function_grant(args: TestArgs) -> Result<()> {
    let mut registry = ApprovalRegistry::new();
    let token = Address::random();
    let spender = Address::random();

    let parameter_grant = ActionDescriptor::for_parameter(
        token,
        APPROVE_SIGNATURE,
        FieldLocator::argument(0),
        &spender.to_string(),
    )?;
    let function_grant = ActionDescriptor::for_function(token, APPROVE_SIGNATURE)?;
    apply_approval(&args, &mut registry, &parameter_grant).await?;
    apply_approval(&args, &mut registry, &function_grant).await?;

    let any_spender = approve_calldata(Address::random())?;
    eyre::ensure!(
        check_parity(&args, &registry, token, &any_spender).await?,
        "function grant refused an argument"
    );

    apply_approval(&args, &mut registry, &parameter_grant.revoked()).await?;
    let pinned = approve_calldata(spender)?;
    eyre::ensure!(
        check_parity(&args, &registry, token, &pinned).await?,
        "function grant lost with a parameter revocation"
    );

    // A different selector on the same target is not covered
    let ping = encode_call(PING_SIGNATURE, &["1"])?;
    eyre::ensure!(!check_parity(&args, &registry, token, &ping).await?, "other selector allowed");

    Ok(())
}
integration_test!(test_function_grant);

/// A contract grant allows any selector on its target
async fn test_contract_grant(args: TestArgs) -> Result<()> {
    let mut registry = ApprovalRegistry::new();
    let target = Address::random();

    apply_approval(&args, &mut registry, &ActionDescriptor::contract(target)).await?;

    let approve = approve_calldata(Address::random())?;
    let ping = encode_call(PING_SIGNATURE, &["7"])?;
    eyre::ensure!(check_parity(&args, &registry, target, &approve).await?, "approve refused");
    eyre::ensure!(check_parity(&args, &registry, target, &ping).await?, "ping refused");

    // The grant does not extend to other targets
    eyre::ensure!(
        !check_parity(&args, &registry, Address::random(), &ping).await?,
        "other target allowed"
    );

    Ok(())
}
integration_test!(test_contract_grant);

// -----------
// | Helpers |
// -----------

/// Calldata approving `spender` for one token unit
fn approve_calldata(spender: Address) -> Result<Bytes> {
    Ok(encode_call(APPROVE_SIGNATURE, &[spender.to_string(), "1".to_string()])?)
}

/// Calldata of a single-hop swap paying out to `recipient`
fn swap_calldata(recipient: Address) -> Result<Bytes> {
    let params = format!(
        "({},{},3000,{},1000,0,0,0)",
        Address::random(),
        Address::random(),
        recipient
    );
    Ok(encode_call(EXACT_INPUT_SINGLE_SIGNATURE, &[params])?)
}
