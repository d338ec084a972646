//! Definitions of CLI arguments and commands for the deploy and operations scripts

use std::path::PathBuf;

use action_codec::ActionType;
use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{
        acquire_withdrawal_funds, apply_plan, approve_action, check_action, deploy, deploy_proxy,
        deposit,
        execute_action, find_hints, fund_info, grant_role, redeem, set_blacklist, setup_vault,
        update_nav, update_vault_setting, update_vault_state, upgrade,
    },
    constants::{
        DEFAULT_DEPLOYMENTS_PATH, DEFAULT_SLIPPAGE_BPS, DEPLOYMENTS_PATH_ENV_VAR, RPC_URL_ENV_VAR,
    },
    context::ScriptContext,
    errors::ScriptError,
    plan::{PlanCheck, PlanEntry},
    types::{ContractKind, RedeemAction, Role},
};

/// Deploy and operate the balance contract and the fund contracts around it.
///
/// Address arguments accept a hex address, the name of a well-known address on
/// the connected network (e.g. `whype`), or a key in the deployments file
/// (e.g. `fund_contract`).
#[derive(Parser)]
pub struct Cli {
    /// Network RPC URL
    #[arg(short, long, env = RPC_URL_ENV_VAR)]
    pub rpc_url: String,

    /// Path to the deployments file, keyed by chain ID then contract
    #[arg(short, long, env = DEPLOYMENTS_PATH_ENV_VAR, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// The script to run
    #[command(subcommand)]
    pub command: Command,
}

/// The available scripts
#[derive(Subcommand)]
pub enum Command {
    /// Deploy a contract from its compilation artifact
    Deploy(DeployArgs),
    /// Deploy an implementation behind a transparent upgradeable proxy
    DeployProxy(DeployProxyArgs),
    /// Upgrade the implementation behind a proxy
    Upgrade(UpgradeArgs),
    /// Grant or revoke a single allowlist approval
    ApproveAction(ApproveActionArgs),
    /// Ask the balance contract whether it would relay a call
    CheckAction(CheckActionArgs),
    /// Apply a JSON plan of allowlist approvals
    ApplyPlan(ApplyPlanArgs),
    /// Relay a call through the balance contract
    ExecuteAction(ExecuteActionArgs),
    /// Grant an access-control role
    GrantRole(GrantRoleArgs),
    /// Grant the fund its storage role and configure the vault
    SetupVault(SetupVaultArgs),
    /// Update the vault's settings
    UpdateVaultSetting(VaultSettingArgs),
    /// Update the vault's fee accounting state
    UpdateVaultState(UpdateVaultStateArgs),
    /// Set the fund's blacklist contract
    SetBlacklist(SetBlacklistArgs),
    /// Sync the perp DEX balance and update the fund's NAV
    UpdateNav(UpdateNavArgs),
    /// Report the fund's share price, TVL, and supply
    FundInfo(FundInfoArgs),
    /// Deposit the fund's asset as the user
    Deposit(DepositArgs),
    /// Inspect, initiate, or complete a user's withdrawal
    Redeem(RedeemArgs),
    /// Acquire funds for pending withdrawals through the balance contract
    AcquireWithdrawalFunds(AcquireWithdrawalFundsArgs),
    /// Find insert-position hints for a lending-market trove
    FindHints(FindHintsArgs),
}

impl Command {
    /// The roles whose keys the command needs
    pub fn roles(&self) -> &'static [Role] {
        match self {
            Command::Deploy(_)
            | Command::DeployProxy(_)
            | Command::Upgrade(_)
            | Command::GrantRole(_)
            | Command::SetupVault(_)
            | Command::UpdateVaultSetting(_)
            | Command::UpdateVaultState(_)
            | Command::SetBlacklist(_) => &[Role::Admin],
            Command::UpdateNav(args) if !args.dry_run => &[Role::Admin],
            Command::ApproveAction(_) => &[Role::Approver],
            Command::ApplyPlan(args) if !args.dry_run => &[Role::Approver],
            Command::ExecuteAction(_) | Command::AcquireWithdrawalFunds(_) => &[Role::Operator],
            Command::Deposit(_) | Command::Redeem(_) => &[Role::User],
            Command::CheckAction(_)
            | Command::ApplyPlan(_)
            | Command::UpdateNav(_)
            | Command::FundInfo(_)
            | Command::FindHints(_) => &[],
        }
    }

    /// Run the command
    pub async fn run(self, mut ctx: ScriptContext) -> Result<(), ScriptError> {
        match self {
            Command::Deploy(args) => deploy(args, &mut ctx).await,
            Command::DeployProxy(args) => deploy_proxy(args, &mut ctx).await,
            Command::Upgrade(args) => upgrade(args, &mut ctx).await,
            Command::ApproveAction(args) => approve_action(args, &ctx).await,
            Command::CheckAction(args) => check_action(args, &ctx).await,
            Command::ApplyPlan(args) => apply_plan(args, &ctx).await,
            Command::ExecuteAction(args) => execute_action(args, &ctx).await,
            Command::GrantRole(args) => grant_role(args, &ctx).await,
            Command::SetupVault(args) => setup_vault(args, &ctx).await,
            Command::UpdateVaultSetting(args) => update_vault_setting(args, &ctx).await,
            Command::UpdateVaultState(args) => update_vault_state(args, &ctx).await,
            Command::SetBlacklist(args) => set_blacklist(args, &ctx).await,
            Command::UpdateNav(args) => update_nav(args, &ctx).await,
            Command::FundInfo(args) => fund_info(args, &ctx).await,
            Command::Deposit(args) => deposit(args, &ctx).await,
            Command::Redeem(args) => redeem(args, &ctx).await,
            Command::AcquireWithdrawalFunds(args) => acquire_withdrawal_funds(args, &ctx).await,
            Command::FindHints(args) => find_hints(args, &ctx).await,
        }
    }
}

/// Deploy a contract that is not behind a proxy, recording it under `key`
#[derive(Args)]
pub struct DeployArgs {
    /// Path to the contract's compilation artifact
    #[arg(long)]
    pub artifact: PathBuf,

    /// The key under which to record the contract in the deployments file
    #[arg(short, long)]
    pub key: String,

    /// The constructor's signature, e.g. `constructor(address,uint256)`
    #[arg(long)]
    pub constructor: Option<String>,

    /// The constructor's arguments, in order
    #[arg(long = "constructor-arg", requires = "constructor")]
    pub constructor_args: Vec<String>,
}

/// Deploy an upgradeable contract.
///
/// Concretely, this deploys the implementation and then a
/// [`TransparentUpgradeableProxy`](https://docs.openzeppelin.com/contracts/5.x/api/proxy#transparent_proxy),
/// which itself deploys a `ProxyAdmin` contract owned by the admin. The proxy
/// calls the implementation's initializer in its constructor.
///
/// Either `--contract` picks one of the fund suite's contracts, whose
/// initializer is built from the typed flags below, or `--key` names any other
/// contract, initialized through `--initializer` and `--init-arg`.
#[derive(Args)]
pub struct DeployProxyArgs {
    /// The fund suite contract to deploy
    #[arg(short, long, required_unless_present = "key", conflicts_with = "key")]
    pub contract: Option<ContractKind>,

    /// The deployments key of a contract outside the fund suite
    #[arg(short, long)]
    pub key: Option<String>,

    /// The initializer's signature, e.g. `initialize(address,address)`
    #[arg(long)]
    pub initializer: Option<String>,

    /// The initializer's arguments, in order
    #[arg(long = "init-arg", requires = "initializer")]
    pub init_args: Vec<String>,

    /// Path to the implementation's compilation artifact
    #[arg(long)]
    pub artifact: PathBuf,

    /// Path to the `TransparentUpgradeableProxy` compilation artifact
    #[arg(long)]
    pub proxy_artifact: PathBuf,

    /// The contract admin, defaults to the admin key's address
    #[arg(long)]
    pub admin: Option<String>,

    /// The balance contract's operator
    #[arg(long)]
    pub operator: Option<String>,

    /// The balance contract's approver
    #[arg(long)]
    pub approver: Option<String>,

    /// The fund's asset, defaults to the network's wrapped native token
    #[arg(long)]
    pub asset: Option<String>,

    /// The fund storage contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_storage: Option<String>,

    /// The balance contract, defaults to the recorded deployment
    #[arg(long)]
    pub balance_contract: Option<String>,

    /// The fund NAV contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_nav_contract: Option<String>,

    /// The name of the fund's share token
    #[arg(long)]
    pub name: Option<String>,

    /// The symbol of the fund's share token
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Upgrade a contract's implementation through its proxy admin
#[derive(Args)]
pub struct UpgradeArgs {
    /// The fund suite contract to upgrade
    #[arg(short, long, required_unless_present = "key", conflicts_with = "key")]
    pub contract: Option<ContractKind>,

    /// The deployments key of a proxy outside the fund suite
    #[arg(short, long)]
    pub key: Option<String>,

    /// Path to a compilation artifact to deploy as the new implementation
    #[arg(long, conflicts_with = "implementation", required_unless_present = "implementation")]
    pub artifact: Option<PathBuf>,

    /// Address of an already-deployed implementation
    #[arg(short, long)]
    pub implementation: Option<String>,

    /// Optional calldata, in hex form, with which to
    /// call the implementation contract when upgrading
    #[arg(long)]
    pub calldata: Option<String>,
}

impl DeployProxyArgs {
    /// The key under which the proxy is recorded
    pub fn deployment_key(&self) -> Result<String, ScriptError> {
        deployment_key(self.contract, self.key.as_deref())
    }
}

impl UpgradeArgs {
    /// The key under which the proxy is recorded
    pub fn deployment_key(&self) -> Result<String, ScriptError> {
        deployment_key(self.contract, self.key.as_deref())
    }
}

/// The deployments key named by either `--contract` or `--key`
fn deployment_key(contract: Option<ContractKind>, key: Option<&str>) -> Result<String, ScriptError> {
    match (contract, key) {
        (_, Some(key)) => Ok(key.to_string()),
        (Some(contract), None) => Ok(contract.deployment_key().to_string()),
        (None, None) => Err(ScriptError::InvalidArgument("pass --contract or --key".to_string())),
    }
}

/// Grant or revoke an allowlist approval on the balance contract
#[derive(Args)]
pub struct ApproveActionArgs {
    /// The scope of the approval: `contract`, `function`, or `parameter`
    #[arg(short, long)]
    pub scope: ActionType,

    /// The contract the approval applies to
    #[arg(short, long)]
    pub target: String,

    /// The canonical signature of the approved function, e.g. `approve(address,uint256)`
    #[arg(long)]
    pub signature: Option<String>,

    /// The pinned argument, `<argument>` or `<argument>.<field>` for a struct field
    #[arg(long)]
    pub locator: Option<String>,

    /// The pinned argument's value
    #[arg(long)]
    pub value: Option<String>,

    /// Revoke the approval instead of granting it
    #[arg(long)]
    pub revoke: bool,

    /// Arguments of a sample call to check once the approval is applied
    #[arg(long = "check-arg")]
    pub check_args: Vec<String>,

    /// The balance contract, defaults to the recorded deployment
    #[arg(long)]
    pub balance_contract: Option<String>,
}

impl ApproveActionArgs {
    /// The plan entry these arguments describe
    pub fn plan_entry(&self) -> PlanEntry {
        let check = (!self.check_args.is_empty()).then(|| PlanCheck {
            args: self.check_args.clone(),
            expect: !self.revoke,
        });

        PlanEntry {
            scope: self.scope,
            target: self.target.clone(),
            signature: self.signature.clone(),
            locator: self.locator.clone(),
            value: self.value.clone(),
            revoke: self.revoke,
            check,
        }
    }
}

/// The call to check or relay, given as a signature and arguments or as raw calldata
#[derive(Args)]
pub struct CallArgs {
    /// The contract the call is directed at
    #[arg(short, long)]
    pub target: String,

    /// The canonical signature of the called function
    #[arg(long, required_unless_present = "calldata")]
    pub signature: Option<String>,

    /// The call's arguments, in order
    #[arg(long = "arg")]
    pub args: Vec<String>,

    /// Raw calldata in hex form, instead of a signature and arguments
    #[arg(long, conflicts_with_all = ["signature", "args"])]
    pub calldata: Option<String>,

    /// The balance contract, defaults to the recorded deployment
    #[arg(long)]
    pub balance_contract: Option<String>,
}

/// Check whether the balance contract would relay a call
#[derive(Args)]
pub struct CheckActionArgs {
    /// The call to check
    #[command(flatten)]
    pub call: CallArgs,
}

/// Apply a plan of allowlist approvals
#[derive(Args)]
pub struct ApplyPlanArgs {
    /// Path to the JSON plan
    #[arg(short, long)]
    pub plan: PathBuf,

    /// Evaluate the plan against an empty local allowlist without sending transactions
    #[arg(long)]
    pub dry_run: bool,

    /// The balance contract, defaults to the recorded deployment
    #[arg(long)]
    pub balance_contract: Option<String>,
}

/// Relay a call through the balance contract
#[derive(Args)]
pub struct ExecuteActionArgs {
    /// The call to relay
    #[command(flatten)]
    pub call: CallArgs,

    /// Native value to send with the call, in whole tokens
    #[arg(long, default_value = "0")]
    pub value: String,

    /// Send the call even if the allowlist would refuse it
    #[arg(long)]
    pub force: bool,
}

/// Grant an access-control role
#[derive(Args)]
pub struct GrantRoleArgs {
    /// The access-controlled contract
    #[arg(short, long)]
    pub target: String,

    /// The role, as a 32-byte hex identifier or a role name
    #[arg(short, long)]
    pub role: String,

    /// The account to grant the role to
    #[arg(short, long)]
    pub account: String,
}

/// The vault's settings
#[derive(Args)]
pub struct VaultSettingArgs {
    /// The minimum supply, in whole tokens
    #[arg(long)]
    pub minimum_supply: String,

    /// The deposit capacity, in whole tokens
    #[arg(long)]
    pub capacity: String,

    /// The performance fee rate, in percent
    #[arg(long)]
    pub performance_fee_rate: u64,

    /// The management fee rate, in percent
    #[arg(long)]
    pub management_fee_rate: u64,

    /// The management fee receiver
    #[arg(long)]
    pub management_fee_receiver: String,

    /// The performance fee receiver
    #[arg(long)]
    pub performance_fee_receiver: String,

    /// The network cost charged on withdrawals, in whole tokens
    #[arg(long)]
    pub network_cost: String,

    /// The fund contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_contract: Option<String>,
}

/// Grant the fund its storage role and configure the vault
#[derive(Args)]
pub struct SetupVaultArgs {
    /// The vault's settings
    #[command(flatten)]
    pub settings: VaultSettingArgs,

    /// The fund storage contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_storage: Option<String>,

    /// Skip granting the fund contract its role on the fund storage
    #[arg(long)]
    pub skip_role_grant: bool,
}

/// The vault's fee accounting state
#[derive(Args)]
pub struct UpdateVaultStateArgs {
    /// The high watermark share price, in whole tokens
    #[arg(long)]
    pub high_watermark: String,

    /// The vault's deployment timestamp, in seconds
    #[arg(long)]
    pub deployed_timestamp: u64,

    /// The last management fee harvest, in seconds
    #[arg(long)]
    pub last_harvest_management_fee_time: u64,

    /// The last performance fee harvest, in seconds
    #[arg(long)]
    pub last_harvest_performance_fee_time: u64,

    /// The fund contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_contract: Option<String>,
}

/// Set the fund's blacklist contract
#[derive(Args)]
pub struct SetBlacklistArgs {
    /// The blacklist contract
    #[arg(short, long)]
    pub blacklist: String,

    /// The fund contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_contract: Option<String>,
}

/// The fund contracts read by the reporting scripts
#[derive(Args)]
pub struct FundArgs {
    /// The fund contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_contract: Option<String>,

    /// The fund contract reader, defaults to the recorded deployment
    #[arg(long)]
    pub fund_contract_reader: Option<String>,

    /// The balance contract, defaults to the recorded deployment
    #[arg(long)]
    pub balance_contract: Option<String>,

    /// The fund's asset, defaults to the network's wrapped native token
    #[arg(long)]
    pub asset: Option<String>,
}

/// Sync the perp DEX balance and update the fund's NAV
#[derive(Args)]
pub struct UpdateNavArgs {
    /// The fund's balance on the perp DEX, in whole tokens, excluding the
    /// balance contract's holdings
    #[arg(short, long)]
    pub perp_dex_balance: String,

    /// Only report the fund's state
    #[arg(long)]
    pub dry_run: bool,

    /// The fund NAV contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_nav_contract: Option<String>,

    /// The fund contracts
    #[command(flatten)]
    pub fund: FundArgs,
}

/// Report the fund's state
#[derive(Args)]
pub struct FundInfoArgs {
    /// Fee receivers whose share balances to report
    #[arg(long = "fee-receiver")]
    pub fee_receivers: Vec<String>,

    /// The fund contracts
    #[command(flatten)]
    pub fund: FundArgs,
}

/// Deposit into the fund, approving it to pull the asset if needed
#[derive(Args)]
pub struct DepositArgs {
    /// The amount of the fund's asset to deposit, in whole tokens
    #[arg(short, long)]
    pub amount: String,

    /// The fund's asset, defaults to the network's wrapped native token
    #[arg(long)]
    pub asset: Option<String>,

    /// The fund contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_contract: Option<String>,
}

/// Inspect, initiate, or complete the user key's withdrawal
#[derive(Args)]
pub struct RedeemArgs {
    /// The withdrawal step to take
    #[arg(short, long, default_value = "status")]
    pub action: RedeemAction,

    /// Shares to withdraw, in whole shares, defaults to every available share
    #[arg(short, long)]
    pub shares: Option<String>,

    /// The tolerated slippage on the withdrawn assets, in basis points
    #[arg(long, default_value_t = DEFAULT_SLIPPAGE_BPS)]
    pub slippage_bps: u64,

    /// The fund's asset, defaults to the network's wrapped native token
    #[arg(long)]
    pub asset: Option<String>,

    /// The fund contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_contract: Option<String>,
}

/// Acquire funds for pending withdrawals
#[derive(Args)]
pub struct AcquireWithdrawalFundsArgs {
    /// The amount of the fund's asset to acquire, in whole tokens
    #[arg(short, long)]
    pub amount: String,

    /// Tokens to convert into the fund's asset
    #[arg(long = "token")]
    pub tokens: Vec<String>,

    /// The amount of each token to convert, in whole tokens
    #[arg(long = "token-amount")]
    pub token_amounts: Vec<String>,

    /// The fund contract, defaults to the recorded deployment
    #[arg(long)]
    pub fund_contract: Option<String>,

    /// The balance contract, defaults to the recorded deployment
    #[arg(long)]
    pub balance_contract: Option<String>,
}

/// Find insert-position hints for opening a trove
#[derive(Args)]
pub struct FindHintsArgs {
    /// The annual interest rate, e.g. `0.06`
    #[arg(short, long)]
    pub interest_rate: String,

    /// The collateral branch index
    #[arg(short, long, default_value_t = 0)]
    pub branch: u64,

    /// The random seed for the hint search, defaults to the current time
    #[arg(long)]
    pub seed: Option<u64>,

    /// The hint helpers contract
    #[arg(long, default_value = "hint_helpers")]
    pub hint_helpers: String,

    /// The trove manager contract
    #[arg(long, default_value = "trove_manager")]
    pub trove_manager: String,

    /// The sorted troves contract
    #[arg(long, default_value = "sorted_troves")]
    pub sorted_troves: String,

    /// The debt to borrow, in whole tokens, to predict the upfront fee for
    #[arg(long)]
    pub borrow_amount: Option<String>,

    /// The collateral to deposit, in whole tokens, to build the `openTrove` call
    #[arg(long, requires = "borrow_amount")]
    pub collateral_amount: Option<String>,

    /// The trove's owner in the `openTrove` call
    #[arg(long, default_value = "balance_contract")]
    pub owner: String,

    /// The owner's trove index in the `openTrove` call
    #[arg(long, default_value_t = 0)]
    pub owner_index: u64,
}
