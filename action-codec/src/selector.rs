//! Derivation of function selectors from signature strings

use alloy_dyn_abi::DynSolType;
use alloy_json_abi::Function;
use alloy_primitives::{keccak256, Selector};

use crate::{constants::NUM_BYTES_SELECTOR, errors::CodecError};

/// Derive the selector of a function signature, i.e. the first 4 bytes of
/// `keccak256(signature)`.
///
/// No validation is performed: a signature containing whitespace, parameter
/// names, or type aliases yields a selector that no deployed contract
/// dispatches on. Prefer [`checked_selector`] for user-provided input.
pub fn function_selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes())[..NUM_BYTES_SELECTOR])
}

/// Derive the selector of a function signature, rejecting signatures that are
/// not written in canonical form
pub fn checked_selector(signature: &str) -> Result<Selector, CodecError> {
    let function = parse_signature(signature)?;
    let canonical = canonical_signature(&function)?;
    if canonical != signature {
        return Err(CodecError::NonCanonicalSignature {
            given: signature.to_string(),
            canonical,
        });
    }

    Ok(function_selector(signature))
}

/// Parse a Solidity function signature, e.g. `approve(address,uint256)`
pub fn parse_signature(signature: &str) -> Result<Function, CodecError> {
    Function::parse(signature).map_err(|e| CodecError::InvalidSignature(e.to_string()))
}

/// Resolve the ABI types of a function's inputs, with tuples expanded
pub fn input_types(function: &Function) -> Result<Vec<DynSolType>, CodecError> {
    function
        .inputs
        .iter()
        .map(|param| {
            DynSolType::parse(&param.selector_type())
                .map_err(|e| CodecError::InvalidSignature(e.to_string()))
        })
        .collect()
}

/// Render the canonical signature of a function: its name followed by the
/// comma-separated canonical type names of its inputs
pub fn canonical_signature(function: &Function) -> Result<String, CodecError> {
    let types = input_types(function)?
        .iter()
        .map(|ty| ty.sol_type_name().into_owned())
        .collect::<Vec<_>>();

    Ok(format!("{}({})", function.name, types.join(",")))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::hex;
    use alloy_sol_types::{sol, SolCall};

    use super::*;

    sol! {
        function approve(address spender, uint256 amount) external returns (bool);
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams params) external returns (uint256);
    }

    #[test]
    fn test_known_selectors() {
        assert_eq!(
            function_selector("approve(address,uint256)"),
            Selector::from(hex!("095ea7b3"))
        );
        assert_eq!(
            function_selector("transfer(address,uint256)"),
            Selector::from(hex!("a9059cbb"))
        );
        assert_eq!(function_selector("deposit()"), Selector::from(hex!("d0e30db0")));
        assert_eq!(
            function_selector("withdraw(uint256)"),
            Selector::from(hex!("2e1a7d4d"))
        );
    }

    #[test]
    fn test_selector_deterministic() {
        let sig = "acquireWithdrawalFunds(uint256,address[],uint256[])";
        assert_eq!(function_selector(sig), function_selector(sig));
    }

    #[test]
    fn test_selector_matches_sol_calls() {
        assert_eq!(
            function_selector("approve(address,uint256)"),
            Selector::from(approveCall::SELECTOR)
        );
        assert_eq!(
            checked_selector(
                "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))"
            )
            .unwrap(),
            Selector::from(exactInputSingleCall::SELECTOR)
        );
    }

    #[test]
    fn test_checked_selector_rejects_non_canonical() {
        let cases = [
            ("approve(address, uint256)", "approve(address,uint256)"),
            ("approve(address spender,uint256 amount)", "approve(address,uint256)"),
            ("transfer(address,uint)", "transfer(address,uint256)"),
        ];

        for (given, canonical) in cases {
            let err = checked_selector(given).unwrap_err();
            assert_eq!(
                err,
                CodecError::NonCanonicalSignature {
                    given: given.to_string(),
                    canonical: canonical.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_checked_selector_rejects_malformed() {
        let err = checked_selector("approve(address,uint256").unwrap_err();
        assert!(matches!(err, CodecError::InvalidSignature(_)));
    }
}
