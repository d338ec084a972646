//! Utilities for reading deployment addresses from the deployments file

use std::path::Path;

use alloy::primitives::Address;
use eyre::Result;
use scripts::config::Deployments;

/// Read the address recorded under `key` for the given chain
///
/// Returns an error if the file, the chain, or the key is missing
pub fn read_deployment(chain_id: u64, key: &str, deployments_path: &Path) -> Result<Address> {
    let deployments = Deployments::read(deployments_path)?;
    let address = deployments.get(chain_id, key)?;
    Ok(address)
}
