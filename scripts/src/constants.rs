//! Constants used in the deploy and operations scripts

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: &str =
    "0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103";

/// The storage slot containing the implementation contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const PROXY_IMPLEMENTATION_STORAGE_SLOT: &str =
    "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";

/// The number of decimals in the fund's share token and in the wrapped native asset
pub const TOKEN_DECIMALS: u8 = 18;

/// The denominator of slippage tolerances, expressed in basis points
pub const BPS_DENOMINATOR: u64 = 10_000;

/// The default slippage tolerance on withdrawals, in basis points
pub const DEFAULT_SLIPPAGE_BPS: u64 = 100;

// ------------------------
// | Environment Variables |
// ------------------------

/// The environment variable holding the RPC URL
pub const RPC_URL_ENV_VAR: &str = "RPC_URL";

/// The environment variable holding the path to the deployments file
pub const DEPLOYMENTS_PATH_ENV_VAR: &str = "DEPLOYMENTS_PATH";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The environment variable holding the admin's private key
pub const ADMIN_PRIVATE_KEY_ENV_VAR: &str = "ADMIN_PRIVATE_KEY";

/// The environment variable holding the operator's private key
pub const OPERATOR_PRIVATE_KEY_ENV_VAR: &str = "OPERATOR_PRIVATE_KEY";

/// The environment variable holding the approver's private key
pub const APPROVER_PRIVATE_KEY_ENV_VAR: &str = "APPROVER_PRIVATE_KEY";

/// The environment variable holding a fund depositor's private key
pub const USER_PRIVATE_KEY_ENV_VAR: &str = "USER_PRIVATE_KEY";

// --------------------
// | Deployment Keys |
// --------------------

/// The balance contract proxy key in the deployments file
pub const BALANCE_CONTRACT_KEY: &str = "balance_contract";

/// The fund storage proxy key in the deployments file
pub const FUND_STORAGE_KEY: &str = "fund_storage";

/// The fund NAV contract proxy key in the deployments file
pub const FUND_NAV_CONTRACT_KEY: &str = "fund_nav_contract";

/// The fund contract proxy key in the deployments file
pub const FUND_CONTRACT_KEY: &str = "fund_contract";

/// The fund contract reader proxy key in the deployments file
pub const FUND_CONTRACT_READER_KEY: &str = "fund_contract_reader";

/// The suffix appended to a contract key to record its implementation
pub const IMPLEMENTATION_KEY_SUFFIX: &str = "_implementation";

/// The suffix appended to a contract key to record its proxy admin
pub const PROXY_ADMIN_KEY_SUFFIX: &str = "_proxy_admin";

// -----------------
// | Access Control |
// -----------------

/// The role the fund storage grants to the fund contract so it may write fund state
pub const FUND_STORAGE_CONTROLLER_ROLE: &str =
    "0x97adf037b2472f4a6a9825eff7d2dd45e37f2dc308df2a260d6a72af4189a65b";
