//! Encoding of the balance contract's action allowlist: function selectors,
//! parameter hashes, typed field locators, and a local model of the registry
//! lookup used to classify relayed calls.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod calldata;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod locator;
pub mod math;
pub mod registry;
pub mod selector;
pub mod solidity;
pub mod types;

pub use errors::CodecError;
pub use locator::FieldLocator;
pub use registry::ApprovalRegistry;
pub use types::{ActionDescriptor, ActionType};
