//! The per-invocation context shared by every script

use std::path::PathBuf;

use alloy::{
    network::Ethereum,
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    transports::http::reqwest::Url,
};
use tracing::info;

use crate::{
    config::{write_deployed_address, Deployments, Network, Secrets},
    errors::ScriptError,
    plan::AddressBook,
    types::Role,
};

/// Everything a script needs to talk to the chain, built once in `main`
pub struct ScriptContext {
    /// The RPC endpoint
    pub rpc_url: Url,
    /// A read-only provider
    pub provider: DynProvider<Ethereum>,
    /// The chain ID reported by the endpoint
    pub chain_id: u64,
    /// The well-known addresses of the connected chain
    pub network: &'static Network,
    /// The path of the deployments file
    pub deployments_path: PathBuf,
    /// The deployments recorded so far
    pub deployments: Deployments,
    /// The keys of the roles the command acts as
    pub secrets: Secrets,
}

impl ScriptContext {
    /// Connect to the chain and load the deployments and the keys for `roles`
    ///
    /// Secrets are loaded before any network access so that a misconfigured
    /// environment fails fast
    pub async fn new(
        rpc_url: &str,
        deployments_path: PathBuf,
        roles: &[Role],
    ) -> Result<Self, ScriptError> {
        let secrets = Secrets::load(roles)?;
        let deployments = Deployments::read(&deployments_path)?;

        let rpc_url =
            Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        let provider = DynProvider::new(ProviderBuilder::new().connect_http(rpc_url.clone()));
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        let network = Network::for_chain(chain_id)?;
        info!("Connected to {} (chain {})", network.name, chain_id);

        Ok(Self {
            rpc_url,
            provider,
            chain_id,
            network,
            deployments_path,
            deployments,
            secrets,
        })
    }

    /// A provider that signs transactions as the given role
    pub fn wallet(&self, role: Role) -> Result<DynProvider<Ethereum>, ScriptError> {
        let signer = self.secrets.signer(role)?.clone();
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .with_simple_nonce_management()
            .connect_http(self.rpc_url.clone());

        Ok(DynProvider::new(provider))
    }

    /// The address of the given role's key
    pub fn address_of(&self, role: Role) -> Result<Address, ScriptError> {
        self.secrets.address(role)
    }

    /// The recorded address of a deployed contract on the connected chain
    pub fn deployment(&self, key: &str) -> Result<Address, ScriptError> {
        self.deployments.get(self.chain_id, key)
    }

    /// Resolve an optional address argument, falling back to a deployment key
    pub fn resolve_or(
        &self,
        value: Option<&str>,
        default_key: &str,
    ) -> Result<Address, ScriptError> {
        match value {
            Some(value) => self.resolve(value),
            None => self.deployment(default_key),
        }
    }

    /// Record a deployed address, both in memory and in the deployments file
    pub fn record_deployment(&mut self, key: &str, address: Address) -> Result<(), ScriptError> {
        write_deployed_address(&self.deployments_path, self.chain_id, key, address)?;
        self.deployments.insert(self.chain_id, key, address);
        info!("Recorded `{}` at {:#x}", key, address);
        Ok(())
    }
}

/// Names resolve to well-known addresses on the connected network first, then
/// to entries in the deployments file
impl AddressBook for ScriptContext {
    fn lookup(&self, name: &str) -> Option<Address> {
        self.network
            .address_of(name)
            .or_else(|| self.deployment(name).ok())
    }
}
