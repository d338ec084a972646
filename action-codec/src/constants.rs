//! Constants describing the ABI layout the allowlist encoding relies on

use alloy_primitives::{Selector, B256};

/// The number of bytes in a function selector
pub const NUM_BYTES_SELECTOR: usize = 4;

/// The number of bytes in a single ABI-encoded word
pub const NUM_BYTES_WORD: usize = 32;

/// The parameter hash registered for scopes that do not constrain a parameter
pub const ZERO_PARAM_HASH: B256 = B256::ZERO;

/// The selector registered for contract-wide approvals
pub const ZERO_SELECTOR: Selector = Selector::ZERO;

/// The multiplier applied to the trove count before taking its square root
/// when sizing the hint search
pub const HINT_TRIALS_MULTIPLIER: u64 = 100;
