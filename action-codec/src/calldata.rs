//! Helpers for building and inspecting encoded calls

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Function;
use alloy_primitives::{Bytes, Selector, B256};

use crate::{
    constants::{NUM_BYTES_SELECTOR, NUM_BYTES_WORD},
    errors::CodecError,
    hashing::word_hash,
    selector::{input_types, parse_signature},
};

/// A view over an encoded call: a selector followed by ABI-encoded arguments
#[derive(Clone, Copy, Debug)]
pub struct CallData<'a> {
    /// The raw calldata
    data: &'a [u8],
}

impl<'a> CallData<'a> {
    /// Wrap raw calldata, which must at least hold a selector
    pub fn new(data: &'a [u8]) -> Result<Self, CodecError> {
        if data.len() < NUM_BYTES_SELECTOR {
            return Err(CodecError::CalldataTooShort(data.len()));
        }

        Ok(Self { data })
    }

    /// The selector the call dispatches on
    pub fn selector(&self) -> Selector {
        Selector::from_slice(&self.data[..NUM_BYTES_SELECTOR])
    }

    /// The encoded arguments following the selector
    pub fn arguments(&self) -> &'a [u8] {
        &self.data[NUM_BYTES_SELECTOR..]
    }

    /// The word at the given index of the argument head, if present
    pub fn word(&self, slot: usize) -> Option<&'a [u8]> {
        let start = slot.checked_mul(NUM_BYTES_WORD)?;
        self.arguments().get(start..start.checked_add(NUM_BYTES_WORD)?)
    }

    /// The hash of the word at the given index of the argument head, if present
    pub fn word_hash(&self, slot: usize) -> Option<B256> {
        self.word(slot).map(word_hash)
    }
}

/// Encode a call from a signature and string-formatted arguments
///
/// Each argument is coerced into the corresponding ABI type, e.g. `0x55..55`
/// for an `address`, `1000` for a `uint256`, or `(0x01..,0x02..,3000)` for a
/// struct.
pub fn encode_call<S: AsRef<str>>(signature: &str, args: &[S]) -> Result<Bytes, CodecError> {
    let function = parse_signature(signature)?;
    let mut data = function.selector().to_vec();
    data.extend(coerce_arguments(&function, args)?.abi_encode_params());
    Ok(data.into())
}

/// ABI-encode string-formatted arguments for the inputs of `signature`,
/// without a selector
///
/// Used for constructor arguments, e.g. `constructor(address,uint256)`
pub fn encode_arguments<S: AsRef<str>>(signature: &str, args: &[S]) -> Result<Bytes, CodecError> {
    let function = parse_signature(signature)?;
    Ok(coerce_arguments(&function, args)?.abi_encode_params().into())
}

/// Coerce each argument into the type of the matching input
fn coerce_arguments<S: AsRef<str>>(
    function: &Function,
    args: &[S],
) -> Result<DynSolValue, CodecError> {
    let types = input_types(function)?;
    if types.len() != args.len() {
        return Err(CodecError::ArgumentCount {
            expected: types.len(),
            got: args.len(),
        });
    }

    let values = types
        .iter()
        .zip(args)
        .map(|(ty, arg)| {
            ty.coerce_str(arg.as_ref())
                .map_err(|e| CodecError::ValueCoercion(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DynSolValue::Tuple(values))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, U256};
    use alloy_sol_types::{sol, SolCall, SolValue};

    use super::*;
    use crate::{hashing::address_param_hash, selector::function_selector};

    sol! {
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[test]
    fn test_encode_call_matches_sol_encoding() {
        let spender = address!("4E2960a8cd19B467b82d26D83fAcb0fAE26b094D");
        let data = encode_call(
            "approve(address,uint256)",
            &[spender.to_string(), "1000".to_string()],
        )
        .unwrap();

        let expected = approveCall {
            spender,
            amount: U256::from(1000u64),
        }
        .abi_encode();
        assert_eq!(data.as_ref(), expected.as_slice());

        let call = CallData::new(&data).unwrap();
        assert_eq!(call.selector(), function_selector("approve(address,uint256)"));
        assert_eq!(call.word_hash(0), Some(address_param_hash(spender)));
        assert!(call.word(2).is_none());
    }

    #[test]
    fn test_encode_call_without_arguments() {
        let data = encode_call::<&str>("deposit()", &[]).unwrap();
        assert_eq!(data.as_ref(), function_selector("deposit()").as_slice());
    }

    #[test]
    fn test_encode_call_argument_count() {
        let err = encode_call("approve(address,uint256)", &["0x01"]).unwrap_err();
        assert_eq!(err, CodecError::ArgumentCount { expected: 2, got: 1 });
    }

    #[test]
    fn test_encode_arguments_omits_selector() {
        let owner = address!("543303266113B64d03Ec17B7ec3829f8CddADaC4");
        let args = [owner.to_string(), "1000".to_string()];

        let encoded = encode_arguments("constructor(address,uint256)", &args).unwrap();
        assert_eq!(encoded.as_ref(), (owner, U256::from(1000u64)).abi_encode_params().as_slice());

        let call = encode_call("approve(address,uint256)", &args).unwrap();
        assert_eq!(&call[NUM_BYTES_SELECTOR..], encoded.as_ref());

        let err = encode_arguments("constructor(address)", &args).unwrap_err();
        assert_eq!(err, CodecError::ArgumentCount { expected: 1, got: 2 });
    }

    #[test]
    fn test_short_calldata() {
        assert_eq!(
            CallData::new(&[0x09, 0x5e]).unwrap_err(),
            CodecError::CalldataTooShort(2)
        );
    }
}
