//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::primitives::U256;
use clap::ValueEnum;

use crate::constants::{
    ADMIN_PRIVATE_KEY_ENV_VAR, APPROVER_PRIVATE_KEY_ENV_VAR, BALANCE_CONTRACT_KEY,
    FUND_CONTRACT_KEY, FUND_CONTRACT_READER_KEY, FUND_NAV_CONTRACT_KEY, FUND_STORAGE_KEY,
    IMPLEMENTATION_KEY_SUFFIX, OPERATOR_PRIVATE_KEY_ENV_VAR, PROXY_ADMIN_KEY_SUFFIX,
    TOKEN_DECIMALS, USER_PRIVATE_KEY_ENV_VAR,
};

/// The upgradeable contracts the scripts deploy behind proxies
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContractKind {
    /// The balance contract, which relays allowlisted calls to external protocols
    BalanceContract,
    /// The fund storage contract
    FundStorage,
    /// The fund NAV contract, which tracks balances held on the perp DEX
    FundNavContract,
    /// The fund contract, the ERC4626-style vault users deposit into
    FundContract,
    /// The read-only fund contract reader
    FundContractReader,
}

impl ContractKind {
    /// The key under which the proxy address is recorded in the deployments file
    pub fn deployment_key(&self) -> &'static str {
        match self {
            ContractKind::BalanceContract => BALANCE_CONTRACT_KEY,
            ContractKind::FundStorage => FUND_STORAGE_KEY,
            ContractKind::FundNavContract => FUND_NAV_CONTRACT_KEY,
            ContractKind::FundContract => FUND_CONTRACT_KEY,
            ContractKind::FundContractReader => FUND_CONTRACT_READER_KEY,
        }
    }

    /// The key under which the implementation address is recorded
    pub fn implementation_key(&self) -> String {
        implementation_key(self.deployment_key())
    }

    /// The key under which the proxy admin address is recorded
    pub fn proxy_admin_key(&self) -> String {
        proxy_admin_key(self.deployment_key())
    }
}

/// The key under which the implementation behind the proxy at `key` is recorded
pub fn implementation_key(key: &str) -> String {
    format!("{key}{IMPLEMENTATION_KEY_SUFFIX}")
}

/// The key under which the admin of the proxy at `key` is recorded
pub fn proxy_admin_key(key: &str) -> String {
    format!("{key}{PROXY_ADMIN_KEY_SUFFIX}")
}

/// The keyholders the scripts act as
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Administers the contracts: upgrades, roles, and vault settings
    Admin,
    /// Executes allowlisted actions through the balance contract
    Operator,
    /// Grants and revokes allowlist approvals
    Approver,
    /// A depositor in the fund
    User,
}

impl Role {
    /// The environment variable holding this role's private key
    pub fn env_var(&self) -> &'static str {
        match self {
            Role::Admin => ADMIN_PRIVATE_KEY_ENV_VAR,
            Role::Operator => OPERATOR_PRIVATE_KEY_ENV_VAR,
            Role::Approver => APPROVER_PRIVATE_KEY_ENV_VAR,
            Role::User => USER_PRIVATE_KEY_ENV_VAR,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Operator => write!(f, "operator"),
            Role::Approver => write!(f, "approver"),
            Role::User => write!(f, "user"),
        }
    }
}

/// The steps of a fund withdrawal
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum RedeemAction {
    /// Only report the user's withdrawal state
    Status,
    /// Lock shares for withdrawal
    Initiate,
    /// Redeem shares whose withdrawal funds have been acquired
    Complete,
}

/// A fund depositor's shares and pending withdrawal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawalStatus {
    /// The user's share balance
    pub share_balance: U256,
    /// Shares locked by a pending withdrawal
    pub locked_shares: U256,
    /// Shares awaiting redemption
    pub withdrawal_shares: U256,
    /// The asset value of one share, scaled by 1e18
    pub price_per_share: U256,
    /// Whether the pending withdrawal can be completed
    pub can_complete: bool,
}

impl WithdrawalStatus {
    /// Shares that are not locked by a pending withdrawal
    pub fn available_shares(&self) -> U256 {
        self.share_balance.saturating_sub(self.locked_shares)
    }

    /// The assets the given shares are worth at the current share price
    pub fn expected_assets(&self, shares: U256) -> U256 {
        shares * self.price_per_share / U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
    }

    /// Whether a withdrawal is awaiting redemption
    pub fn has_pending_withdrawal(&self) -> bool {
        !self.withdrawal_shares.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One token with 18 decimals
    const ONE: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_withdrawal_status() {
        let status = WithdrawalStatus {
            share_balance: U256::from(10 * ONE),
            locked_shares: U256::from(4 * ONE),
            withdrawal_shares: U256::ZERO,
            price_per_share: U256::from(ONE + ONE / 2),
            can_complete: false,
        };

        assert_eq!(status.available_shares(), U256::from(6 * ONE));
        assert_eq!(status.expected_assets(U256::from(2 * ONE)), U256::from(3 * ONE));
        assert!(!status.has_pending_withdrawal());
    }

    #[test]
    fn test_available_shares_saturates() {
        let status = WithdrawalStatus {
            share_balance: U256::from(1u64),
            locked_shares: U256::from(2u64),
            withdrawal_shares: U256::from(2u64),
            price_per_share: U256::from(ONE),
            can_complete: true,
        };
        assert_eq!(status.available_shares(), U256::ZERO);
        assert!(status.has_pending_withdrawal());
    }

    #[test]
    fn test_deployment_keys() {
        assert_eq!(ContractKind::FundContract.deployment_key(), "fund_contract");
        assert_eq!(
            ContractKind::BalanceContract.implementation_key(),
            "balance_contract_implementation"
        );
        assert_eq!(ContractKind::FundStorage.proxy_admin_key(), "fund_storage_proxy_admin");
        assert_eq!(implementation_key("hl_vault"), "hl_vault_implementation");
        assert_eq!(proxy_admin_key("hl_vault"), "hl_vault_proxy_admin");
    }
}
