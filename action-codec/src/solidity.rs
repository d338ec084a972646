//! Solidity definitions of the balance contract's allowlist methods

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy_sol_types::sol;

sol! {
    /// Grant or revoke an approval in the balance contract's allowlist
    function approveAction(uint8 actionType, address target, bytes4 selector, uint256 paramIndex, bytes32 paramHash, bool status) external;

    /// Query whether the balance contract would relay the given call
    function isActionAllowed(address target, bytes data) external view returns (bool);
}
