//! Configuration of the scripts: keyholder secrets, known networks, and the
//! deployments file

use std::{
    collections::BTreeMap,
    env, fs,
    path::Path,
    str::FromStr,
};

use alloy::{
    primitives::{address, Address},
    signers::local::PrivateKeySigner,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{errors::ScriptError, types::Role};

// -----------
// | Secrets |
// -----------

/// The private keys of the keyholders a command acts as
pub struct Secrets {
    /// The signer for each loaded role
    signers: BTreeMap<Role, PrivateKeySigner>,
}

impl Secrets {
    /// Load the keys for the given roles from the environment
    ///
    /// Every missing or malformed key is reported in a single error
    pub fn load(roles: &[Role]) -> Result<Self, ScriptError> {
        Self::load_with(roles, |var| env::var(var).ok())
    }

    /// Load the keys for the given roles using the given variable lookup
    pub fn load_with(
        roles: &[Role],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ScriptError> {
        let mut signers = BTreeMap::new();
        let mut problems = Vec::new();

        for role in roles.iter().copied().unique() {
            let var = role.env_var();
            let Some(key) = lookup(var).filter(|key| !key.trim().is_empty()) else {
                problems.push(format!("{var} (missing)"));
                continue;
            };

            match PrivateKeySigner::from_str(key.trim()) {
                Ok(signer) => {
                    signers.insert(role, signer);
                }
                Err(_) => problems.push(format!("{var} (invalid)")),
            }
        }

        if !problems.is_empty() {
            return Err(ScriptError::MissingEnv(problems));
        }

        Ok(Self { signers })
    }

    /// The signer for the given role
    pub fn signer(&self, role: Role) -> Result<&PrivateKeySigner, ScriptError> {
        self.signers
            .get(&role)
            .ok_or_else(|| ScriptError::MissingEnv(vec![format!("{} (not loaded)", role.env_var())]))
    }

    /// The address of the given role's signer
    pub fn address(&self, role: Role) -> Result<Address, ScriptError> {
        self.signer(role).map(PrivateKeySigner::address)
    }
}

// ------------
// | Networks |
// ------------

/// A chain the scripts know well-known addresses for
#[derive(Debug)]
pub struct Network {
    /// The chain ID
    pub chain_id: u64,
    /// A human-readable name
    pub name: &'static str,
    /// The wrapped native token, the fund's default asset
    pub wrapped_native: Option<Address>,
    /// Well-known tokens and protocol contracts, by lowercase name
    pub addresses: &'static [(&'static str, Address)],
}

/// HyperEVM mainnet
pub const HYPEREVM_MAINNET: Network = Network {
    chain_id: 999,
    name: "hyperevm-mainnet",
    wrapped_native: Some(address!("5555555555555555555555555555555555555555")),
    addresses: &[
        ("whype", address!("5555555555555555555555555555555555555555")),
        ("sthype", address!("fFaa4a3D97fE9107Cef8a3F48c069F577Ff76cC1")),
        ("lhype", address!("5748ae796AE46A4F1348a1693de4b50560485562")),
        ("feusd", address!("02c6a2fa58cc01a18b8d9e00ea48d65e4df26c70")),
        ("felix", address!("5b271dc20ba7beb8eee276eb4f1644b6a217f0a3")),
        ("hyperlend", address!("3100f4e7bda2ed2452d9a57eb30260ab071bbe62")),
        ("hint_helpers", address!("a32e89c658f7fdcc0bdb2717f253bacd99f864d4")),
        ("trove_manager", address!("3100f4e7bda2ed2452d9a57eb30260ab071bbe62")),
        ("sorted_troves", address!("d1caa4218808eb94d36e1df7247f7406f43f2ef6")),
        ("trove_nft", address!("5AD1512e7006FdBD0f3EbB8aa35c5e9234a03AA7")),
        ("hyperswap_factory", address!("B1c0fa0B789320044A6F623cFe5eBda9562602E3")),
        ("hyperswap_router", address!("4E2960a8cd19B467b82d26D83fAcb0fAE26b094D")),
        ("hyperswap_nft_manager", address!("6eDA206207c09e5428F281761DdC0D300851fBC8")),
        ("staked_hype_overseer", address!("B96f07367e69e86d6e9C3F29215885104813eeAE")),
        ("hl_trader", address!("d4737ef74fc7bb5932ce917cf51b2e1a0263210a")),
    ],
};

/// HyperEVM testnet
pub const HYPEREVM_TESTNET: Network = Network {
    chain_id: 998,
    name: "hyperevm-testnet",
    wrapped_native: None,
    addresses: &[],
};

/// A local Anvil or Hardhat node
pub const LOCAL_DEVNET: Network = Network {
    chain_id: 31337,
    name: "local-devnet",
    wrapped_native: None,
    addresses: &[],
};

/// Every network the scripts support
pub const NETWORKS: [&Network; 3] = [&HYPEREVM_MAINNET, &HYPEREVM_TESTNET, &LOCAL_DEVNET];

impl Network {
    /// Look up the network with the given chain ID
    pub fn for_chain(chain_id: u64) -> Result<&'static Network, ScriptError> {
        NETWORKS
            .into_iter()
            .find(|n| n.chain_id == chain_id)
            .ok_or(ScriptError::UnsupportedChain(chain_id))
    }

    /// Look up a well-known address by name, ignoring case
    pub fn address_of(&self, name: &str) -> Option<Address> {
        let name = name.to_ascii_lowercase();
        self.addresses
            .iter()
            .find_map(|(known, addr)| (*known == name).then_some(*addr))
    }
}

// ---------------
// | Deployments |
// ---------------

/// The addresses of deployed contracts, keyed by chain ID then contract key
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deployments(BTreeMap<String, BTreeMap<String, String>>);

impl Deployments {
    /// Read the deployments file, treating a missing file as empty
    pub fn read(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ReadDeployments(format!("{}: {}", path.display(), e)))
    }

    /// Write the deployments file
    pub fn write(&self, path: &Path) -> Result<(), ScriptError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        fs::write(path, contents)
            .map_err(|e| ScriptError::WriteDeployments(format!("{}: {}", path.display(), e)))
    }

    /// The address recorded for the given contract on the given chain
    pub fn get(&self, chain_id: u64, key: &str) -> Result<Address, ScriptError> {
        let raw = self
            .0
            .get(&chain_id.to_string())
            .and_then(|chain| chain.get(key))
            .ok_or_else(|| {
                ScriptError::ReadDeployments(format!("no `{key}` deployment for chain {chain_id}"))
            })?;

        if raw.trim().is_empty() {
            return Err(ScriptError::ReadDeployments(format!(
                "`{key}` deployment for chain {chain_id} is empty"
            )));
        }

        Address::from_str(raw.trim()).map_err(|e| {
            ScriptError::ReadDeployments(format!("`{key}` for chain {chain_id}: {e}"))
        })
    }

    /// Record the address of a contract on the given chain
    pub fn insert(&mut self, chain_id: u64, key: &str, address: Address) {
        self.0
            .entry(chain_id.to_string())
            .or_default()
            .insert(key.to_string(), format!("{address:#x}"));
    }
}

/// Record a deployed address in the deployments file, creating the file if needed
pub fn write_deployed_address(
    path: &Path,
    chain_id: u64,
    key: &str,
    address: Address,
) -> Result<(), ScriptError> {
    let mut deployments = Deployments::read(path)?;
    deployments.insert(chain_id, key, address);
    deployments.write(path)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::PathBuf};

    use super::*;

    /// The first default Anvil account's key
    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// A temporary deployments path unique to the test
    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("deployments-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_secrets_report_every_missing_key() {
        let vars = HashMap::from([("OPERATOR_PRIVATE_KEY", ANVIL_KEY.to_string())]);
        let lookup = |var: &str| vars.get(var).cloned();

        let Err(ScriptError::MissingEnv(problems)) =
            Secrets::load_with(&[Role::Admin, Role::Operator, Role::Approver], lookup)
        else {
            panic!("expected missing env error");
        };
        assert_eq!(
            problems,
            vec!["ADMIN_PRIVATE_KEY (missing)", "APPROVER_PRIVATE_KEY (missing)"]
        );
    }

    #[test]
    fn test_secrets_reject_invalid_and_empty_keys() {
        let vars = HashMap::from([
            ("ADMIN_PRIVATE_KEY", "0xnothex".to_string()),
            ("USER_PRIVATE_KEY", "  ".to_string()),
        ]);
        let lookup = |var: &str| vars.get(var).cloned();

        let Err(ScriptError::MissingEnv(problems)) =
            Secrets::load_with(&[Role::Admin, Role::User], lookup)
        else {
            panic!("expected missing env error");
        };
        assert_eq!(problems, vec!["ADMIN_PRIVATE_KEY (invalid)", "USER_PRIVATE_KEY (missing)"]);
    }

    #[test]
    fn test_secrets_load() {
        let lookup = |_: &str| Some(ANVIL_KEY.to_string());
        let secrets = Secrets::load_with(&[Role::Approver, Role::Approver], lookup).unwrap();

        assert_eq!(
            secrets.address(Role::Approver).unwrap(),
            address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
        assert!(secrets.signer(Role::Admin).is_err());
    }

    #[test]
    fn test_network_lookup() {
        let network = Network::for_chain(999).unwrap();
        assert_eq!(network.address_of("WHYPE"), network.wrapped_native);
        assert!(network.address_of("unknown").is_none());
        assert!(matches!(Network::for_chain(1), Err(ScriptError::UnsupportedChain(1))));
    }

    #[test]
    fn test_deployments_round_trip() {
        let path = temp_path("round-trip");
        let addr = address!("543303266113B64d03Ec17B7ec3829f8CddADaC4");

        write_deployed_address(&path, 999, "balance_contract", addr).unwrap();
        write_deployed_address(&path, 31337, "balance_contract", Address::ZERO).unwrap();

        let deployments = Deployments::read(&path).unwrap();
        assert_eq!(deployments.get(999, "balance_contract").unwrap(), addr);
        assert_eq!(deployments.get(31337, "balance_contract").unwrap(), Address::ZERO);
        assert!(deployments.get(999, "fund_contract").is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_deployments_empty_entry() {
        let deployments: Deployments =
            serde_json::from_str(r#"{ "999": { "fund_contract": "" } }"#).unwrap();
        let err = deployments.get(999, "fund_contract").unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn test_missing_deployments_file_is_empty() {
        let deployments = Deployments::read(&temp_path("missing")).unwrap();
        assert_eq!(deployments, Deployments::default());
    }
}
