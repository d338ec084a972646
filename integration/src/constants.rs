//! Constants used in the integration tests

/// The default RPC URL of a local Anvil node
pub(crate) const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The default private key for the tests, the first default account in an Anvil node
pub(crate) const DEFAULT_PKEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The default path of the deployments file
pub(crate) const DEFAULT_DEPLOYMENTS_PATH: &str = "../deployments.json";

/// The ERC20 approval signature pinned in the allowlist tests
pub(crate) const APPROVE_SIGNATURE: &str = "approve(address,uint256)";

/// The single-hop swap signature whose struct fields are pinned in the allowlist tests
pub(crate) const EXACT_INPUT_SINGLE_SIGNATURE: &str =
    "exactInputSingle((address,address,uint24,address,uint256,uint256,uint256,uint160))";

/// The signature of the no-op call relayed to an externally owned account
pub(crate) const PING_SIGNATURE: &str = "ping(uint256)";
