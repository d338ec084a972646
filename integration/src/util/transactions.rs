//! Utilities for sending and waiting on transactions

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Ethereum, TransactionBuilder},
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use eyre::Result;

/// The call builder type for the tests
pub type TestCallBuilder<'a, C> = CallBuilder<&'a DynProvider, C, Ethereum>;

// ----------------
// | Transactions |
// ----------------

/// Wait for a transaction receipt and ensure it was successful
pub async fn wait_for_tx_success<C: CallDecoder>(
    tx: TestCallBuilder<'_, C>,
) -> Result<TransactionReceipt> {
    let receipt = send_tx(tx).await?;
    eyre::ensure!(receipt.status(), "transaction {:#x} reverted", receipt.transaction_hash);
    Ok(receipt)
}

/// Send a transaction and wait for it to succeed or fail
pub async fn send_tx<C: CallDecoder>(tx: TestCallBuilder<'_, C>) -> Result<TransactionReceipt> {
    let pending_tx = tx.send().await?;
    let receipt = pending_tx.get_receipt().await?;
    Ok(receipt)
}

/// Send a call and return the result
pub async fn call_helper<C: CallDecoder + Unpin>(
    call: TestCallBuilder<'_, C>,
) -> Result<C::CallOutput> {
    let res = call.call().await?;
    Ok(res)
}

/// Send raw calldata from an account the node signs for, e.g. an impersonated one
///
/// Returns whether the transaction reverted, either in gas estimation or on-chain
pub async fn send_unsigned_reverts(
    provider: &DynProvider,
    from: Address,
    to: Address,
    data: Bytes,
) -> Result<bool> {
    let tx = TransactionRequest::default().with_from(from).with_to(to).with_input(data);
    match provider.send_transaction(tx).await {
        Err(_) => Ok(true),
        Ok(pending_tx) => Ok(!pending_tx.get_receipt().await?.status()),
    }
}
