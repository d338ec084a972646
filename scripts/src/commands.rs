//! Implementations of the deploy and operations scripts

use std::{
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use action_codec::{
    calldata::{encode_arguments, encode_call},
    math::hint_trials,
    ApprovalRegistry,
};
use alloy::{
    primitives::{Address, Bytes, B256, U256},
    rpc::types::Log,
    sol_types::{SolCall, SolValue},
};
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    cli::{
        AcquireWithdrawalFundsArgs, ApplyPlanArgs, ApproveActionArgs, CallArgs, CheckActionArgs,
        DeployArgs, DeployProxyArgs, DepositArgs, ExecuteActionArgs, FindHintsArgs, FundArgs, FundInfoArgs,
        GrantRoleArgs, RedeemArgs, SetBlacklistArgs, SetupVaultArgs, UpdateNavArgs,
        UpdateVaultStateArgs, UpgradeArgs, VaultSettingArgs,
    },
    constants::{
        BALANCE_CONTRACT_KEY, BPS_DENOMINATOR, FUND_CONTRACT_KEY, FUND_CONTRACT_READER_KEY,
        FUND_NAV_CONTRACT_KEY, FUND_STORAGE_CONTROLLER_ROLE, FUND_STORAGE_KEY,
        PROXY_ADMIN_STORAGE_SLOT, PROXY_IMPLEMENTATION_STORAGE_SLOT,
    },
    context::ScriptContext,
    errors::ScriptError,
    plan::{AddressBook, ApprovalPlan, PlanEntry},
    solidity::{
        AccessControl, BalanceContract, Erc20, FundContract, FundContractReader, FundNavContract,
        HintHelpers, IAccessControl, IBorrowerOperations, IBalanceContract, IERC20, IFundContract,
        IFundContractReader, IFundNavContract, IFundStorage, IHintHelpers, IProxyAdmin,
        ISortedTroves, ITroveManager, ProxyAdmin, SortedTroves, TroveManager,
    },
    types::{
        implementation_key, proxy_admin_key, ContractKind, RedeemAction, Role, WithdrawalStatus,
    },
    utils::{
        apply_slippage, call_helper, deploy_contract, format_amount, parse_amount,
        parse_calldata, parse_role, read_address_slot, read_bytecode, send_tx,
    },
};

// --------------
// | Deployment |
// --------------

/// Deploy a contract without a proxy and record it under its key
pub async fn deploy(args: DeployArgs, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
    let wallet = ctx.wallet(Role::Admin)?;
    let constructor_args = match args.constructor.as_deref() {
        Some(constructor) => {
            let args: Vec<String> =
                args.constructor_args.iter().map(|arg| ctx.substitute(arg)).collect();
            encode_arguments(constructor, &args)?
        }
        None => Bytes::new(),
    };

    info!("Deploying {}", args.key);
    let code = read_bytecode(&args.artifact)?;
    let address = deploy_contract(&wallet, &code, &constructor_args).await?;
    info!("{} deployed at {:#x}", args.key, address);

    ctx.record_deployment(&args.key, address)
}

/// Deploy an implementation and a transparent upgradeable proxy in front of it,
/// initializing the proxy in its constructor
pub async fn deploy_proxy(
    args: DeployProxyArgs,
    ctx: &mut ScriptContext,
) -> Result<(), ScriptError> {
    let key = args.deployment_key()?;
    let wallet = ctx.wallet(Role::Admin)?;
    let admin = match args.admin.as_deref() {
        Some(admin) => ctx.resolve(admin)?,
        None => ctx.address_of(Role::Admin)?,
    };
    let init_data = initializer_calldata(&args, admin, ctx)?;
    if init_data.is_empty() {
        warn!("{} proxy will not call an initializer", key);
    }

    info!("Deploying {} implementation", key);
    let implementation_code = read_bytecode(&args.artifact)?;
    let implementation = deploy_contract(&wallet, &implementation_code, &[]).await?;
    info!("{} implementation deployed at {:#x}", key, implementation);

    info!("Deploying {} proxy", key);
    let proxy_code = read_bytecode(&args.proxy_artifact)?;
    let constructor_args = (implementation, admin, Bytes::from(init_data)).abi_encode_params();
    let proxy = deploy_contract(&wallet, &proxy_code, &constructor_args).await?;
    info!("{} proxy deployed at {:#x}", key, proxy);

    let proxy_admin = read_address_slot(&ctx.provider, proxy, PROXY_ADMIN_STORAGE_SLOT).await?;
    let slot_implementation =
        read_address_slot(&ctx.provider, proxy, PROXY_IMPLEMENTATION_STORAGE_SLOT).await?;
    check_implementation_slot(slot_implementation, implementation)
        .map_err(ScriptError::ContractDeployment)?;
    info!("{} proxy admin deployed at {:#x}", key, proxy_admin);

    ctx.record_deployment(&key, proxy)?;
    ctx.record_deployment(&implementation_key(&key), implementation)?;
    ctx.record_deployment(&proxy_admin_key(&key), proxy_admin)?;

    Ok(())
}

/// Check that a proxy's implementation slot holds the expected implementation
fn check_implementation_slot(slot: Address, expected: Address) -> Result<(), String> {
    if slot != expected {
        return Err(format!("proxy implementation slot holds {slot:#x}, expected {expected:#x}"));
    }
    Ok(())
}

/// The calldata of the initializer the proxy calls on deployment
///
/// An explicit `--initializer` is encoded from its string arguments, otherwise
/// the fund suite contract's typed `initialize` call is built
fn initializer_calldata(
    args: &DeployProxyArgs,
    admin: Address,
    ctx: &ScriptContext,
) -> Result<Vec<u8>, ScriptError> {
    if let Some(initializer) = args.initializer.as_deref() {
        let init_args: Vec<String> = args.init_args.iter().map(|arg| ctx.substitute(arg)).collect();
        return Ok(encode_call(initializer, &init_args)?.to_vec());
    }

    let Some(contract) = args.contract else {
        return Ok(Vec::new());
    };

    let calldata = match contract {
        ContractKind::BalanceContract => IBalanceContract::initializeCall {
            admin,
            operator: required_address(ctx, args.operator.as_deref(), "operator")?,
            approver: required_address(ctx, args.approver.as_deref(), "approver")?,
        }
        .abi_encode(),
        ContractKind::FundStorage => IFundStorage::initializeCall { admin }.abi_encode(),
        ContractKind::FundNavContract => IFundNavContract::initializeCall { admin }.abi_encode(),
        ContractKind::FundContract => {
            let asset = resolve_asset(ctx, args.asset.as_deref())?;

            IFundContract::initializeCall {
                admin,
                asset,
                fundStorage: ctx.resolve_or(args.fund_storage.as_deref(), FUND_STORAGE_KEY)?,
                balanceContract: ctx
                    .resolve_or(args.balance_contract.as_deref(), BALANCE_CONTRACT_KEY)?,
                fundNavContract: ctx
                    .resolve_or(args.fund_nav_contract.as_deref(), FUND_NAV_CONTRACT_KEY)?,
                name: required_string(args.name.as_deref(), "name")?,
                symbol: required_string(args.symbol.as_deref(), "symbol")?,
            }
            .abi_encode()
        }
        ContractKind::FundContractReader => IFundContractReader::initializeCall {
            fundStorage: ctx.resolve_or(args.fund_storage.as_deref(), FUND_STORAGE_KEY)?,
        }
        .abi_encode(),
    };

    Ok(calldata)
}

/// Resolve an address argument the chosen contract requires
fn required_address(
    ctx: &ScriptContext,
    value: Option<&str>,
    name: &str,
) -> Result<Address, ScriptError> {
    let value = value.ok_or_else(|| ScriptError::InvalidArgument(format!("missing --{name}")))?;
    ctx.resolve(value)
}

/// Resolve the fund's asset, defaulting to the network's wrapped native token
fn resolve_asset(ctx: &ScriptContext, asset: Option<&str>) -> Result<Address, ScriptError> {
    match asset {
        Some(asset) => ctx.resolve(asset),
        None => ctx.network.wrapped_native.ok_or_else(|| {
            ScriptError::InvalidArgument(format!(
                "{} has no wrapped native token, pass --asset",
                ctx.network.name
            ))
        }),
    }
}

/// Unwrap a string argument the chosen contract requires
fn required_string(value: Option<&str>, name: &str) -> Result<String, ScriptError> {
    value
        .map(str::to_string)
        .ok_or_else(|| ScriptError::InvalidArgument(format!("missing --{name}")))
}

/// Upgrade the implementation behind a proxy, optionally deploying it first
///
/// The implementation is recorded only once the proxy reports it
pub async fn upgrade(args: UpgradeArgs, ctx: &mut ScriptContext) -> Result<(), ScriptError> {
    let key = args.deployment_key()?;
    let wallet = ctx.wallet(Role::Admin)?;
    let proxy = ctx.deployment(&key)?;

    let implementation = match (&args.artifact, args.implementation.as_deref()) {
        (Some(artifact), _) => {
            info!("Deploying new {} implementation", key);
            let code = read_bytecode(artifact)?;
            let implementation = deploy_contract(&wallet, &code, &[]).await?;
            info!("{} implementation deployed at {:#x}", key, implementation);
            implementation
        }
        (None, Some(implementation)) => ctx.resolve(implementation)?,
        (None, None) => {
            return Err(ScriptError::InvalidArgument(
                "pass --artifact or --implementation".to_string(),
            ))
        }
    };

    let calldata = match args.calldata.as_deref() {
        Some(calldata) => parse_calldata(calldata)?,
        None => Bytes::new(),
    };

    let proxy_admin_address =
        read_address_slot(&ctx.provider, proxy, PROXY_ADMIN_STORAGE_SLOT).await?;
    let proxy_admin: ProxyAdmin = IProxyAdmin::new(proxy_admin_address, wallet);

    info!("Upgrading {} at {:#x} to {:#x}", key, proxy, implementation);
    send_tx(proxy_admin.upgradeAndCall(proxy, implementation, calldata)).await?;

    let new_implementation =
        read_address_slot(&ctx.provider, proxy, PROXY_IMPLEMENTATION_STORAGE_SLOT).await?;
    check_implementation_slot(new_implementation, implementation)
        .map_err(ScriptError::ContractInteraction)?;
    info!("{} implementation is now {:#x}", key, new_implementation);

    ctx.record_deployment(&implementation_key(&key), implementation)
}

// -------------
// | Allowlist |
// -------------

/// Grant or revoke a single allowlist approval
pub async fn approve_action(
    args: ApproveActionArgs,
    ctx: &ScriptContext,
) -> Result<(), ScriptError> {
    let address = ctx.resolve_or(args.balance_contract.as_deref(), BALANCE_CONTRACT_KEY)?;
    let balance_contract: BalanceContract =
        IBalanceContract::new(address, ctx.wallet(Role::Approver)?);

    apply_entry(&balance_contract, &args.plan_entry(), ctx).await
}

/// Send a plan entry's approval, then check its sample call if it has one
async fn apply_entry(
    balance_contract: &BalanceContract,
    entry: &PlanEntry,
    ctx: &ScriptContext,
) -> Result<(), ScriptError> {
    let descriptor = entry.descriptor(ctx)?;
    info!(
        "{} {} approval on {:#x} (selector {}, param {}, hash {})",
        if descriptor.status { "Granting" } else { "Revoking" },
        descriptor.action_type,
        descriptor.target,
        descriptor.selector,
        descriptor.param_index,
        descriptor.param_hash,
    );
    send_tx(balance_contract.call_builder(&descriptor.approve_call())).await?;

    let (Some(data), Some(check)) = (entry.check_calldata(ctx)?, &entry.check) else {
        return Ok(());
    };

    let allowed = call_helper(balance_contract.isActionAllowed(descriptor.target, data)).await?;
    if allowed != check.expect {
        return Err(ScriptError::ContractInteraction(format!(
            "sample call to {:#x} is {}allowed after the approval",
            descriptor.target,
            if allowed { "" } else { "not " },
        )));
    }
    info!("Sample call allowed: {}", allowed);

    Ok(())
}

/// Resolve the target and encode the calldata of a call given on the command line
fn resolve_call(call: &CallArgs, ctx: &ScriptContext) -> Result<(Address, Bytes), ScriptError> {
    let target = ctx.resolve(&call.target)?;
    let data = match (call.calldata.as_deref(), call.signature.as_deref()) {
        (Some(calldata), _) => parse_calldata(calldata)?,
        (None, Some(signature)) => {
            let args = call.args.iter().map(|arg| ctx.substitute(arg)).collect_vec();
            encode_call(signature, &args)?
        }
        (None, None) => {
            return Err(ScriptError::InvalidArgument(
                "pass --signature or --calldata".to_string(),
            ))
        }
    };

    Ok((target, data))
}

/// Ask the balance contract whether it would relay a call
pub async fn check_action(args: CheckActionArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let (target, data) = resolve_call(&args.call, ctx)?;
    let address = ctx.resolve_or(args.call.balance_contract.as_deref(), BALANCE_CONTRACT_KEY)?;
    let balance_contract: BalanceContract = IBalanceContract::new(address, ctx.provider.clone());

    let allowed = call_helper(balance_contract.isActionAllowed(target, data.clone())).await?;
    info!("Call to {:#x} with calldata {} allowed: {}", target, data, allowed);

    Ok(())
}

/// Apply a plan of approvals, or evaluate it locally on a dry run
pub async fn apply_plan(args: ApplyPlanArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let plan = ApprovalPlan::read(&args.plan)?;
    info!("Read {} approvals from {}", plan.approvals.len(), args.plan.display());

    if args.dry_run {
        let mut registry = ApprovalRegistry::new();
        let outcomes = plan.dry_run(&mut registry, ctx)?;
        let failed = outcomes.iter().filter(|outcome| !outcome.passed()).collect_vec();
        for outcome in &outcomes {
            info!(
                "Entry {}: allowed = {}, expected = {}",
                outcome.entry, outcome.allowed, outcome.expected
            );
        }

        if !failed.is_empty() {
            let entries = failed.iter().map(|outcome| outcome.entry).join(", ");
            return Err(ScriptError::InvalidArgument(format!(
                "sample calls of entries {entries} did not behave as expected"
            )));
        }
        return Ok(());
    }

    // Validate every entry before sending any transaction
    plan.descriptors(ctx)?;
    for entry in &plan.approvals {
        entry.check_calldata(ctx)?;
    }

    let address = ctx.resolve_or(args.balance_contract.as_deref(), BALANCE_CONTRACT_KEY)?;
    let balance_contract: BalanceContract =
        IBalanceContract::new(address, ctx.wallet(Role::Approver)?);
    for (i, entry) in plan.approvals.iter().enumerate() {
        info!("Applying entry {} of {}", i + 1, plan.approvals.len());
        apply_entry(&balance_contract, entry, ctx).await?;
    }

    Ok(())
}

/// Relay a call through the balance contract as the operator
pub async fn execute_action(
    args: ExecuteActionArgs,
    ctx: &ScriptContext,
) -> Result<(), ScriptError> {
    let (target, data) = resolve_call(&args.call, ctx)?;
    let value = parse_amount(&args.value)?;
    let address = ctx.resolve_or(args.call.balance_contract.as_deref(), BALANCE_CONTRACT_KEY)?;
    let balance_contract: BalanceContract =
        IBalanceContract::new(address, ctx.wallet(Role::Operator)?);

    let allowed = call_helper(balance_contract.isActionAllowed(target, data.clone())).await?;
    if !allowed {
        if !args.force {
            return Err(ScriptError::ActionNotAllowed(format!("call to {target:#x}")));
        }
        warn!("Call to {:#x} is not allowlisted, sending anyway", target);
    }

    info!("Executing call to {:#x} with value {}", target, format_amount(value));
    send_tx(balance_contract.executeAction(target, value, data)).await?;

    Ok(())
}

/// Grant an access-control role, unless the account already holds it
pub async fn grant_role(args: GrantRoleArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let target = ctx.resolve(&args.target)?;
    let account = ctx.resolve(&args.account)?;
    let role = parse_role(&args.role);

    let contract: AccessControl = IAccessControl::new(target, ctx.wallet(Role::Admin)?);
    ensure_role(&contract, role, account).await
}

/// Grant `role` to `account` on an access-controlled contract if it is missing
async fn ensure_role(
    contract: &AccessControl,
    role: B256,
    account: Address,
) -> Result<(), ScriptError> {
    if call_helper(contract.hasRole(role, account)).await? {
        info!("{:#x} already holds role {} on {:#x}", account, role, contract.address());
        return Ok(());
    }

    info!("Granting role {} to {:#x} on {:#x}", role, account, contract.address());
    send_tx(contract.grantRole(role, account)).await?;
    Ok(())
}

// ------------------------
// | Vault Administration |
// ------------------------

/// Vault settings parsed from the command line
struct VaultSettings {
    /// The minimum supply
    minimum_supply: U256,
    /// The deposit capacity
    capacity: U256,
    /// The performance fee rate
    performance_fee_rate: U256,
    /// The management fee rate
    management_fee_rate: U256,
    /// The management fee receiver
    management_fee_receiver: Address,
    /// The performance fee receiver
    performance_fee_receiver: Address,
    /// The network cost charged on withdrawals
    network_cost: U256,
}

impl VaultSettings {
    /// Parse the settings' amounts and resolve their receivers
    fn parse(args: &VaultSettingArgs, ctx: &ScriptContext) -> Result<Self, ScriptError> {
        Ok(Self {
            minimum_supply: parse_amount(&args.minimum_supply)?,
            capacity: parse_amount(&args.capacity)?,
            performance_fee_rate: U256::from(args.performance_fee_rate),
            management_fee_rate: U256::from(args.management_fee_rate),
            management_fee_receiver: ctx.resolve(&args.management_fee_receiver)?,
            performance_fee_receiver: ctx.resolve(&args.performance_fee_receiver)?,
            network_cost: parse_amount(&args.network_cost)?,
        })
    }
}

/// The fund contract, signing as the admin
fn admin_fund_contract(
    fund_contract: Option<&str>,
    ctx: &ScriptContext,
) -> Result<FundContract, ScriptError> {
    let address = ctx.resolve_or(fund_contract, FUND_CONTRACT_KEY)?;
    Ok(IFundContract::new(address, ctx.wallet(Role::Admin)?))
}

/// Grant the fund contract its role on the fund storage, then set up the vault
pub async fn setup_vault(args: SetupVaultArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let settings = VaultSettings::parse(&args.settings, ctx)?;
    let fund_contract = admin_fund_contract(args.settings.fund_contract.as_deref(), ctx)?;

    if !args.skip_role_grant {
        let fund_storage = ctx.resolve_or(args.fund_storage.as_deref(), FUND_STORAGE_KEY)?;
        let storage: AccessControl = IAccessControl::new(fund_storage, ctx.wallet(Role::Admin)?);
        let role = B256::from_str(FUND_STORAGE_CONTROLLER_ROLE)
            .map_err(|e| ScriptError::InvalidArgument(e.to_string()))?;
        ensure_role(&storage, role, *fund_contract.address()).await?;
    }

    info!("Setting up vault at {:#x}", fund_contract.address());
    send_tx(fund_contract.setupVault(
        settings.minimum_supply,
        settings.capacity,
        settings.performance_fee_rate,
        settings.management_fee_rate,
        settings.management_fee_receiver,
        settings.performance_fee_receiver,
        settings.network_cost,
    ))
    .await?;

    Ok(())
}

/// Update the vault's settings
pub async fn update_vault_setting(
    args: VaultSettingArgs,
    ctx: &ScriptContext,
) -> Result<(), ScriptError> {
    let settings = VaultSettings::parse(&args, ctx)?;
    let fund_contract = admin_fund_contract(args.fund_contract.as_deref(), ctx)?;

    info!("Updating vault settings at {:#x}", fund_contract.address());
    send_tx(fund_contract.updateVaultSetting(
        settings.minimum_supply,
        settings.capacity,
        settings.performance_fee_rate,
        settings.management_fee_rate,
        settings.management_fee_receiver,
        settings.performance_fee_receiver,
        settings.network_cost,
    ))
    .await?;

    Ok(())
}

/// Update the vault's fee accounting state
pub async fn update_vault_state(
    args: UpdateVaultStateArgs,
    ctx: &ScriptContext,
) -> Result<(), ScriptError> {
    let high_watermark = parse_amount(&args.high_watermark)?;
    let fund_contract = admin_fund_contract(args.fund_contract.as_deref(), ctx)?;

    info!("Updating vault state at {:#x}", fund_contract.address());
    send_tx(fund_contract.updateVaultState(
        high_watermark,
        U256::from(args.deployed_timestamp),
        U256::from(args.last_harvest_management_fee_time),
        U256::from(args.last_harvest_performance_fee_time),
    ))
    .await?;

    Ok(())
}

/// Set the fund's blacklist contract
pub async fn set_blacklist(args: SetBlacklistArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let blacklist = ctx.resolve(&args.blacklist)?;
    let fund_contract = admin_fund_contract(args.fund_contract.as_deref(), ctx)?;

    info!("Setting blacklist of {:#x} to {:#x}", fund_contract.address(), blacklist);
    send_tx(fund_contract.setBlackListContract(blacklist)).await?;

    Ok(())
}

// --------------
// | Fund State |
// --------------

/// Read-only handles on the fund contracts
struct FundReader {
    /// The fund contract
    fund_contract: FundContract,
    /// The fund contract reader
    reader: FundContractReader,
    /// The balance contract
    balance_contract: Address,
    /// The fund's asset, if known on the connected network
    asset: Option<Erc20>,
}

impl FundReader {
    /// Resolve the fund contracts from the command line and the deployments
    fn new(args: &FundArgs, ctx: &ScriptContext) -> Result<Self, ScriptError> {
        let fund_contract = ctx.resolve_or(args.fund_contract.as_deref(), FUND_CONTRACT_KEY)?;
        let reader =
            ctx.resolve_or(args.fund_contract_reader.as_deref(), FUND_CONTRACT_READER_KEY)?;
        let balance_contract =
            ctx.resolve_or(args.balance_contract.as_deref(), BALANCE_CONTRACT_KEY)?;
        let asset = match args.asset.as_deref() {
            Some(asset) => Some(ctx.resolve(asset)?),
            None => ctx.network.wrapped_native,
        };

        Ok(Self {
            fund_contract: IFundContract::new(fund_contract, ctx.provider.clone()),
            reader: IFundContractReader::new(reader, ctx.provider.clone()),
            balance_contract,
            asset: asset.map(|asset| IERC20::new(asset, ctx.provider.clone())),
        })
    }

    /// Log the fund's share price, NAV, and supply
    async fn log_state(&self) -> Result<(), ScriptError> {
        let fund = *self.fund_contract.address();
        let price_per_share = call_helper(self.reader.pricePerShare(fund)).await?;
        let tvl = call_helper(self.reader.totalValueLocked(fund)).await?;
        let withdraw_pool = call_helper(self.reader.getWithdrawPoolAmount(fund)).await?;
        let total_assets = call_helper(self.fund_contract.totalAssets()).await?;
        let total_supply = call_helper(self.fund_contract.totalSupply()).await?;

        info!("Price per share: {}", format_amount(price_per_share));
        info!("Total value locked: {}", format_amount(tvl));
        info!("Total assets: {}", format_amount(total_assets));
        info!("Withdraw pool: {}", format_amount(withdraw_pool));
        info!("Total supply: {}", format_amount(total_supply));

        if let Some(asset) = &self.asset {
            let held = call_helper(asset.balanceOf(self.balance_contract)).await?;
            info!("Balance contract asset holdings: {}", format_amount(held));
        }

        Ok(())
    }
}

/// Sync the perp DEX balance into the NAV contract and update the fund's NAV
pub async fn update_nav(args: UpdateNavArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let perp_dex_balance = parse_amount(&args.perp_dex_balance)?;
    let fund = FundReader::new(&args.fund, ctx)?;

    info!("Fund state before the update:");
    fund.log_state().await?;
    if args.dry_run {
        return Ok(());
    }

    let wallet = ctx.wallet(Role::Admin)?;
    let nav_address = ctx.resolve_or(args.fund_nav_contract.as_deref(), FUND_NAV_CONTRACT_KEY)?;
    let nav_contract: FundNavContract = IFundNavContract::new(nav_address, wallet.clone());
    let fund_contract: FundContract = IFundContract::new(*fund.fund_contract.address(), wallet);

    info!("Syncing perp DEX balance of {}", format_amount(perp_dex_balance));
    send_tx(nav_contract.syncPerpDexBalance(perp_dex_balance)).await?;
    send_tx(fund_contract.updateNav()).await?;

    info!("Fund state after the update:");
    fund.log_state().await
}

/// Report the fund's state and the share balances of its fee receivers
pub async fn fund_info(args: FundInfoArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let fund = FundReader::new(&args.fund, ctx)?;
    fund.log_state().await?;

    for receiver in &args.fee_receivers {
        let receiver = ctx.resolve(receiver)?;
        let shares = call_helper(fund.fund_contract.balanceOf(receiver)).await?;
        info!("Fee receiver {:#x} holds {} shares", receiver, format_amount(shares));
    }

    Ok(())
}

// ---------------
// | Withdrawals |
// ---------------

/// Deposit the fund's asset as the user, topping up the fund's allowance first
pub async fn deposit(args: DepositArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let amount = parse_amount(&args.amount)?;
    let user = ctx.address_of(Role::User)?;
    let wallet = ctx.wallet(Role::User)?;
    let address = ctx.resolve_or(args.fund_contract.as_deref(), FUND_CONTRACT_KEY)?;
    let asset = resolve_asset(ctx, args.asset.as_deref())?;

    let asset: Erc20 = IERC20::new(asset, wallet.clone());
    let fund_contract: FundContract = IFundContract::new(address, wallet);

    let allowance = call_helper(asset.allowance(user, address)).await?;
    if allowance < amount {
        info!("Approving the fund to pull {}", format_amount(amount));
        send_tx(asset.approve(address, amount)).await?;
    }

    info!("Depositing {} into {:#x}", format_amount(amount), address);
    send_tx(fund_contract.deposit(amount, user)).await?;

    let shares = call_helper(fund_contract.balanceOf(user)).await?;
    info!("{:#x} now holds {} shares", user, format_amount(shares));
    Ok(())
}

/// Read a user's shares and pending withdrawal
async fn withdrawal_status(
    fund_contract: &FundContract,
    user: Address,
) -> Result<WithdrawalStatus, ScriptError> {
    Ok(WithdrawalStatus {
        share_balance: call_helper(fund_contract.balanceOf(user)).await?,
        locked_shares: call_helper(fund_contract.getLockedShares(user)).await?,
        withdrawal_shares: call_helper(fund_contract.getUserWithdrawlShares(user)).await?,
        price_per_share: call_helper(fund_contract.pricePerShare()).await?,
        can_complete: call_helper(fund_contract.canCompleteWithdraw(user)).await?,
    })
}

/// Inspect, initiate, or complete the user's withdrawal
pub async fn redeem(args: RedeemArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let user = ctx.address_of(Role::User)?;
    let address = ctx.resolve_or(args.fund_contract.as_deref(), FUND_CONTRACT_KEY)?;
    let fund_contract: FundContract = IFundContract::new(address, ctx.wallet(Role::User)?);

    let status = withdrawal_status(&fund_contract, user).await?;
    info!("Shares of {:#x}: {}", user, format_amount(status.share_balance));
    info!("Locked shares: {}", format_amount(status.locked_shares));
    info!("Shares awaiting redemption: {}", format_amount(status.withdrawal_shares));
    info!("Price per share: {}", format_amount(status.price_per_share));
    info!("Withdrawal can complete: {}", status.can_complete);

    let shares = args.shares.as_deref().map(parse_amount).transpose()?;
    match args.action {
        RedeemAction::Status => Ok(()),
        RedeemAction::Initiate => {
            let available = status.available_shares();
            let shares = shares.unwrap_or(available);
            if shares.is_zero() || shares > available {
                return Err(ScriptError::InvalidArgument(format!(
                    "cannot withdraw {} shares, {} available",
                    format_amount(shares),
                    format_amount(available)
                )));
            }

            let min_assets_out =
                apply_slippage(status.expected_assets(shares), args.slippage_bps, BPS_DENOMINATOR);
            info!(
                "Initiating withdrawal of {} shares for at least {} assets",
                format_amount(shares),
                format_amount(min_assets_out)
            );
            let receipt =
                send_tx(fund_contract.initiateWithdrawal(shares, min_assets_out)).await?;

            let initiated = initiated_withdrawals(receipt.inner.logs());
            if initiated.is_empty() {
                warn!("No WithdrawalInitiated event in the receipt");
            }
            for event in initiated {
                info!(
                    "Withdrawal initiated for {:#x}: {} shares for {} assets",
                    event.account,
                    format_amount(event.shares),
                    format_amount(event.withdrawalAmount)
                );
            }
            Ok(())
        }
        RedeemAction::Complete => {
            if !status.has_pending_withdrawal() || !status.can_complete {
                return Err(ScriptError::InvalidArgument(
                    "no withdrawal is ready to complete".to_string(),
                ));
            }

            let asset: Erc20 =
                IERC20::new(resolve_asset(ctx, args.asset.as_deref())?, ctx.provider.clone());
            let balance_before = call_helper(asset.balanceOf(user)).await?;

            let shares = shares.unwrap_or(status.withdrawal_shares);
            info!("Redeeming {} shares", format_amount(shares));
            send_tx(fund_contract.redeem(shares, user, user)).await?;

            let balance_after = call_helper(asset.balanceOf(user)).await?;
            info!(
                "Received {} assets, balance is now {}",
                format_amount(balance_after.saturating_sub(balance_before)),
                format_amount(balance_after)
            );
            Ok(())
        }
    }
}

/// The withdrawal initiations among a receipt's logs
fn initiated_withdrawals(logs: &[Log]) -> Vec<IFundContract::WithdrawalInitiated> {
    logs.iter()
        .filter_map(|log| log.log_decode::<IFundContract::WithdrawalInitiated>().ok())
        .map(|log| log.inner.data)
        .collect()
}

/// Relay the fund's `acquireWithdrawalFunds` through the balance contract
pub async fn acquire_withdrawal_funds(
    args: AcquireWithdrawalFundsArgs,
    ctx: &ScriptContext,
) -> Result<(), ScriptError> {
    if args.tokens.len() != args.token_amounts.len() {
        return Err(ScriptError::InvalidArgument(format!(
            "{} tokens but {} token amounts",
            args.tokens.len(),
            args.token_amounts.len()
        )));
    }

    let fund_contract = ctx.resolve_or(args.fund_contract.as_deref(), FUND_CONTRACT_KEY)?;
    let tokens: Vec<Address> =
        args.tokens.iter().map(|token| ctx.resolve(token)).collect::<Result<_, _>>()?;
    let amounts: Vec<U256> =
        args.token_amounts.iter().map(|amount| parse_amount(amount)).collect::<Result<_, _>>()?;
    let data: Bytes = IFundContract::acquireWithdrawalFundsCall {
        amount: parse_amount(&args.amount)?,
        tokens,
        amounts,
    }
    .abi_encode()
    .into();

    let address = ctx.resolve_or(args.balance_contract.as_deref(), BALANCE_CONTRACT_KEY)?;
    let balance_contract: BalanceContract =
        IBalanceContract::new(address, ctx.wallet(Role::Operator)?);
    if !call_helper(balance_contract.isActionAllowed(fund_contract, data.clone())).await? {
        return Err(ScriptError::ActionNotAllowed(format!(
            "acquireWithdrawalFunds on {fund_contract:#x}"
        )));
    }

    info!("Acquiring {} of withdrawal funds", args.amount);
    send_tx(balance_contract.executeAction(fund_contract, U256::ZERO, data)).await?;

    Ok(())
}

// ---------
// | Hints |
// ---------

/// Find insert-position hints for a trove at the given interest rate
pub async fn find_hints(args: FindHintsArgs, ctx: &ScriptContext) -> Result<(), ScriptError> {
    let interest_rate = parse_amount(&args.interest_rate)?;
    let hint_helpers: HintHelpers =
        IHintHelpers::new(ctx.resolve(&args.hint_helpers)?, ctx.provider.clone());
    let trove_manager: TroveManager =
        ITroveManager::new(ctx.resolve(&args.trove_manager)?, ctx.provider.clone());
    let sorted_troves: SortedTroves =
        ISortedTroves::new(ctx.resolve(&args.sorted_troves)?, ctx.provider.clone());

    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ScriptError::InvalidArgument(e.to_string()))?
            .as_secs(),
    };

    let trove_count = call_helper(trove_manager.getTroveIdsCount()).await?;
    let trials = hint_trials(trove_count);
    info!("Sampling {} of {} troves", trials, trove_count);

    let approx = call_helper(hint_helpers.getApproxHint(
        U256::from(args.branch),
        interest_rate,
        trials,
        U256::from(seed),
    ))
    .await?;
    let position = call_helper(sorted_troves.findInsertPosition(
        interest_rate,
        approx.hintId,
        approx.hintId,
    ))
    .await?;

    info!("Approximate hint: {}", approx.hintId);
    info!("Upper hint: {}", position.upperHint);
    info!("Lower hint: {}", position.lowerHint);

    let Some(borrow_amount) = args.borrow_amount.as_deref() else {
        return Ok(());
    };
    let borrow = parse_amount(borrow_amount)?;
    let upfront_fee = call_helper(hint_helpers.predictOpenTroveUpfrontFee(
        U256::from(args.branch),
        borrow,
        interest_rate,
    ))
    .await?;
    info!("Predicted upfront fee: {}", format_amount(upfront_fee));

    let Some(collateral_amount) = args.collateral_amount.as_deref() else {
        return Ok(());
    };
    let call = open_trove_call(
        ctx.resolve(&args.owner)?,
        args.owner_index,
        parse_amount(collateral_amount)?,
        borrow,
        &position,
        interest_rate,
        upfront_fee,
    );
    info!("openTrove calldata: {}", Bytes::from(call.abi_encode()));

    Ok(())
}

/// The `openTrove` call for a trove at the found position, with no managers or receiver
fn open_trove_call(
    owner: Address,
    owner_index: u64,
    collateral: U256,
    borrow: U256,
    position: &ISortedTroves::findInsertPositionReturn,
    interest_rate: U256,
    max_upfront_fee: U256,
) -> IBorrowerOperations::openTroveCall {
    IBorrowerOperations::openTroveCall {
        owner,
        ownerIndex: U256::from(owner_index),
        collAmount: collateral,
        boldAmount: borrow,
        upperHint: position.upperHint,
        lowerHint: position.lowerHint,
        annualInterestRate: interest_rate,
        maxUpfrontFee: max_upfront_fee,
        addManager: Address::ZERO,
        removeManager: Address::ZERO,
        receiver: Address::ZERO,
    }
}
