//! Utilities for the deploy and operations scripts.

use std::{fs, path::Path, str::FromStr};

use alloy::{
    contract::{CallBuilder, CallDecoder},
    network::{Ethereum, TransactionBuilder},
    primitives::{
        keccak256,
        utils::{format_ether, parse_ether},
        Address, Bytes, B256, U256,
    },
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use serde::Deserialize;
use tracing::info;

use crate::errors::ScriptError;

/// The call builder type for the scripts
pub type ScriptCallBuilder<'a, C> = CallBuilder<&'a DynProvider<Ethereum>, C, Ethereum>;

// ----------------
// | Transactions |
// ----------------

/// Send a transaction and wait for it to be included, failing if it reverted
pub async fn send_tx<C: CallDecoder>(
    tx: ScriptCallBuilder<'_, C>,
) -> Result<TransactionReceipt, ScriptError> {
    let pending_tx = tx
        .send()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    let receipt = pending_tx
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::TransactionReverted(format!(
            "{:#x}",
            receipt.transaction_hash
        )));
    }

    info!(
        "Transaction {:#x} included in block {}",
        receipt.transaction_hash,
        receipt.block_number.unwrap_or_default()
    );
    Ok(receipt)
}

/// Send a read-only call and return its decoded result
pub async fn call_helper<C: CallDecoder + Unpin>(
    call: ScriptCallBuilder<'_, C>,
) -> Result<C::CallOutput, ScriptError> {
    call.call()
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
}

// --------------
// | Deployment |
// --------------

/// The bytecode field of a compilation artifact, in Hardhat or Foundry layout
#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactBytecode {
    /// Hardhat: `"bytecode": "0x..."`
    Hex(Bytes),
    /// Foundry: `"bytecode": { "object": "0x..." }`
    Object {
        /// The creation bytecode
        object: Bytes,
    },
}

/// The subset of a compilation artifact the scripts read
#[derive(Deserialize)]
struct Artifact {
    /// The creation bytecode
    bytecode: ArtifactBytecode,
}

/// Parse creation bytecode from an artifact's contents
///
/// Accepts a Hardhat or Foundry JSON artifact, or a bare hex `.bin` file
pub fn parse_bytecode(contents: &str) -> Result<Bytes, ScriptError> {
    let contents = contents.trim();
    let bytecode = if contents.starts_with('{') {
        let artifact: Artifact = serde_json::from_str(contents)
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
        match artifact.bytecode {
            ArtifactBytecode::Hex(code) | ArtifactBytecode::Object { object: code } => code,
        }
    } else {
        Bytes::from_str(contents).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
    };

    if bytecode.is_empty() {
        return Err(ScriptError::ArtifactParsing(
            "artifact has no creation bytecode".to_string(),
        ));
    }

    Ok(bytecode)
}

/// Read creation bytecode from an artifact file
pub fn read_bytecode(path: &Path) -> Result<Bytes, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
    parse_bytecode(&contents)
}

/// Deploy a contract from its creation bytecode and ABI-encoded constructor arguments
pub async fn deploy_contract(
    provider: &DynProvider<Ethereum>,
    bytecode: &Bytes,
    constructor_args: &[u8],
) -> Result<Address, ScriptError> {
    let code: Bytes = [bytecode.as_ref(), constructor_args].concat().into();
    let tx = TransactionRequest::default().with_deploy_code(code);

    let receipt = provider
        .send_transaction(tx)
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
        .get_receipt()
        .await
        .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;

    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "deployment {:#x} reverted",
            receipt.transaction_hash
        )));
    }

    receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment("receipt has no contract address".to_string())
    })
}

/// Read an address stored in the low bytes of a storage slot, e.g. an EIP-1967 slot
pub async fn read_address_slot(
    provider: &DynProvider<Ethereum>,
    contract: Address,
    slot: &str,
) -> Result<Address, ScriptError> {
    let slot = B256::from_str(slot).map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
    let value = provider
        .get_storage_at(contract, U256::from_be_bytes(slot.0))
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(Address::from_word(B256::from(value.to_be_bytes::<32>())))
}

// -----------
// | Parsing |
// -----------

/// Parse a decimal token amount with 18 decimals, e.g. `1.5`
pub fn parse_amount(value: &str) -> Result<U256, ScriptError> {
    parse_ether(value).map_err(|e| ScriptError::InvalidArgument(format!("`{value}`: {e}")))
}

/// Format an 18-decimal token amount
pub fn format_amount(value: U256) -> String {
    format_ether(value)
}

/// Parse hex calldata, accepting an empty string as empty calldata
pub fn parse_calldata(value: &str) -> Result<Bytes, ScriptError> {
    if value.is_empty() {
        return Ok(Bytes::new());
    }
    Bytes::from_str(value).map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// Parse an access-control role: a 32-byte hex identifier, or a role name
/// which is hashed as `keccak256(name)`
pub fn parse_role(value: &str) -> B256 {
    B256::from_str(value).unwrap_or_else(|_| keccak256(value.as_bytes()))
}

/// Apply a slippage tolerance in basis points to an expected amount
pub fn apply_slippage(expected: U256, slippage_bps: u64, denominator: u64) -> U256 {
    let kept = denominator.saturating_sub(slippage_bps);
    expected * U256::from(kept) / U256::from(denominator)
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{b256, bytes};

    use super::*;

    #[test]
    fn test_parse_hardhat_artifact() {
        let artifact = r#"{ "contractName": "BalanceContract", "abi": [], "bytecode": "0x6080604052" }"#;
        assert_eq!(parse_bytecode(artifact).unwrap(), bytes!("6080604052"));
    }

    #[test]
    fn test_parse_foundry_artifact() {
        let artifact = r#"{ "abi": [], "bytecode": { "object": "0x6080", "linkReferences": {} } }"#;
        assert_eq!(parse_bytecode(artifact).unwrap(), bytes!("6080"));
    }

    #[test]
    fn test_parse_bin_artifact() {
        assert_eq!(parse_bytecode("6080604052\n").unwrap(), bytes!("6080604052"));
    }

    #[test]
    fn test_reject_empty_bytecode() {
        let artifact = r#"{ "abi": [], "bytecode": "0x" }"#;
        assert!(matches!(parse_bytecode(artifact), Err(ScriptError::ArtifactParsing(_))));
    }

    #[test]
    fn test_parse_role() {
        let hex = "0x97adf037b2472f4a6a9825eff7d2dd45e37f2dc308df2a260d6a72af4189a65b";
        assert_eq!(
            parse_role(hex),
            b256!("97adf037b2472f4a6a9825eff7d2dd45e37f2dc308df2a260d6a72af4189a65b")
        );
        assert_eq!(parse_role("OPERATOR_ROLE"), keccak256("OPERATOR_ROLE"));
    }

    #[test]
    fn test_amounts() {
        let one_and_half = parse_amount("1.5").unwrap();
        assert_eq!(one_and_half, U256::from(1_500_000_000_000_000_000u128));
        assert_eq!(format_amount(one_and_half), "1.500000000000000000");
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn test_apply_slippage() {
        let expected = U256::from(10_000u64);
        assert_eq!(apply_slippage(expected, 100, 10_000), U256::from(9_900u64));
        assert_eq!(apply_slippage(expected, 0, 10_000), expected);
        assert_eq!(apply_slippage(expected, 20_000, 10_000), U256::ZERO);
    }
}
