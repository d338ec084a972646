//! Integer arithmetic helpers

use alloy_primitives::U256;

use crate::constants::HINT_TRIALS_MULTIPLIER;

/// Compute `floor(sqrt(value))` by integer Newton iteration
///
/// The iteration starts from `value / 2` and stops once the estimate no
/// longer strictly decreases. Every estimate after the first is at least the
/// true root, so the sum in each step never exceeds `value`.
pub fn isqrt(value: U256) -> U256 {
    let two = U256::from(2u8);
    if value < two {
        return value;
    }

    let mut x0 = value / two;
    let mut x1 = (x0 + value / x0) / two;
    while x1 < x0 {
        x0 = x1;
        x1 = (x0 + value / x0) / two;
    }

    x0
}

/// The number of trials to sample when searching for an insert hint among
/// `trove_count` sorted troves
pub fn hint_trials(trove_count: U256) -> U256 {
    isqrt(trove_count.saturating_mul(U256::from(HINT_TRIALS_MULTIPLIER)))
}
