//! Derivation of the parameter hashes pinned by parameter-scoped approvals

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{keccak256, Address, B256};
use alloy_sol_types::SolValue;

/// Hash the ABI encoding of a single value, i.e. `keccak256(abi.encode(value))`
pub fn param_hash<T: SolValue>(value: &T) -> B256 {
    keccak256(value.abi_encode())
}

/// Hash the ABI encoding of a single address argument
pub fn address_param_hash(address: Address) -> B256 {
    param_hash(&address)
}

/// Hash the ABI encoding of a single dynamically typed value
pub fn dyn_param_hash(value: &DynSolValue) -> B256 {
    keccak256(value.abi_encode())
}

/// Hash a raw 32 byte word taken from encoded calldata
pub fn word_hash(word: &[u8]) -> B256 {
    keccak256(word)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, U256};

    use super::*;

    #[test]
    fn test_address_hash_is_padded_word_hash() {
        let addr = address!("543303266113B64d03Ec17B7ec3829f8CddADaC4");
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(addr.as_slice());

        assert_eq!(address_param_hash(addr), word_hash(&word));
    }

    #[test]
    fn test_distinct_addresses_distinct_hashes() {
        let a = address!("5b271dc20ba7beb8eee276eb4f1644b6a217f0a3");
        let b = address!("4E2960a8cd19B467b82d26D83fAcb0fAE26b094D");

        assert_ne!(address_param_hash(a), address_param_hash(b));
        assert_ne!(address_param_hash(a), address_param_hash(Address::ZERO));
    }

    #[test]
    fn test_dyn_hash_matches_typed_hash() {
        let addr = address!("d4737ef74fc7bb5932ce917cf51b2e1a0263210a");
        assert_eq!(
            dyn_param_hash(&DynSolValue::Address(addr)),
            address_param_hash(addr)
        );

        let amount = U256::from(1_000u64);
        assert_eq!(
            dyn_param_hash(&DynSolValue::Uint(amount, 256)),
            param_hash(&amount)
        );
    }
}
