//! Definitions of the Solidity interfaces the scripts call

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use alloy::{network::Ethereum, providers::DynProvider, sol};

/// A balance contract instance using the default generics
pub type BalanceContract = IBalanceContract::IBalanceContractInstance<DynProvider, Ethereum>;
/// A fund contract instance using the default generics
pub type FundContract = IFundContract::IFundContractInstance<DynProvider, Ethereum>;
/// A fund storage instance using the default generics
pub type FundStorage = IFundStorage::IFundStorageInstance<DynProvider, Ethereum>;
/// A fund NAV contract instance using the default generics
pub type FundNavContract = IFundNavContract::IFundNavContractInstance<DynProvider, Ethereum>;
/// A fund contract reader instance using the default generics
pub type FundContractReader =
    IFundContractReader::IFundContractReaderInstance<DynProvider, Ethereum>;
/// A proxy admin instance using the default generics
pub type ProxyAdmin = IProxyAdmin::IProxyAdminInstance<DynProvider, Ethereum>;
/// An ERC20 instance using the default generics
pub type Erc20 = IERC20::IERC20Instance<DynProvider, Ethereum>;
/// An access-controlled contract instance using the default generics
pub type AccessControl = IAccessControl::IAccessControlInstance<DynProvider, Ethereum>;
/// A lending-market hint helpers instance using the default generics
pub type HintHelpers = IHintHelpers::IHintHelpersInstance<DynProvider, Ethereum>;
/// A lending-market trove manager instance using the default generics
pub type TroveManager = ITroveManager::ITroveManagerInstance<DynProvider, Ethereum>;
/// A lending-market sorted troves instance using the default generics
pub type SortedTroves = ISortedTroves::ISortedTrovesInstance<DynProvider, Ethereum>;

sol! {
    #[sol(rpc)]
    interface IBalanceContract {
        function initialize(address admin, address operator, address approver) external;
        function approveAction(uint8 actionType, address target, bytes4 selector, uint256 paramIndex, bytes32 paramHash, bool status) external;
        function isActionAllowed(address target, bytes data) external view returns (bool);
        function executeAction(address target, uint256 value, bytes data) external;
    }

    #[sol(rpc)]
    interface IFundStorage {
        function initialize(address admin) external;
    }

    #[sol(rpc)]
    interface IFundNavContract {
        function initialize(address admin) external;
        function syncPerpDexBalance(uint256 balance) external;
    }

    #[sol(rpc)]
    interface IFundContract {
        event WithdrawalInitiated(address indexed account, uint256 withdrawalAmount, uint256 shares);

        function initialize(address admin, address asset, address fundStorage, address balanceContract, address fundNavContract, string name, string symbol) external;
        function setupVault(uint256 minimumSupply, uint256 capacity, uint256 performanceFeeRate, uint256 managementFeeRate, address managementFeeReceiver, address performanceFeeReceiver, uint256 networkCost) external;
        function updateVaultSetting(uint256 minimumSupply, uint256 capacity, uint256 performanceFeeRate, uint256 managementFeeRate, address managementFeeReceiver, address performanceFeeReceiver, uint256 networkCost) external;
        function updateVaultState(uint256 highWatermark, uint256 deployedTimestamp, uint256 lastHarvestManagementFeeTime, uint256 lastHarvestPerformanceFeeTime) external;
        function setBlackListContract(address blackListContract) external;
        function updateNav() external;
        function deposit(uint256 assets, address receiver) external returns (uint256);
        function initiateWithdrawal(uint256 shares, uint256 minAssetsOut) external;
        function redeem(uint256 shares, address receiver, address owner) external returns (uint256);
        function acquireWithdrawalFunds(uint256 amount, address[] tokens, uint256[] amounts) external;
        function balanceOf(address account) external view returns (uint256);
        function totalSupply() external view returns (uint256);
        function totalAssets() external view returns (uint256);
        function pricePerShare() external view returns (uint256);
        function getLockedShares(address user) external view returns (uint256);
        function getUserWithdrawlShares(address user) external view returns (uint256);
        function canCompleteWithdraw(address user) external view returns (bool);
    }

    #[sol(rpc)]
    interface IFundContractReader {
        function initialize(address fundStorage) external;
        function pricePerShare(address fundContract) external view returns (uint256);
        function totalValueLocked(address fundContract) external view returns (uint256);
        function getWithdrawPoolAmount(address fundContract) external view returns (uint256);
    }

    #[sol(rpc)]
    interface IProxyAdmin {
        function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
    }

    #[sol(rpc)]
    interface IAccessControl {
        function grantRole(bytes32 role, address account) external;
        function hasRole(bytes32 role, address account) external view returns (bool);
    }

    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    #[sol(rpc)]
    interface IHintHelpers {
        function getApproxHint(uint256 collIndex, uint256 interestRate, uint256 numTrials, uint256 inputRandomSeed) external view returns (uint256 hintId, uint256 diff, uint256 latestRandomSeed);
        function predictOpenTroveUpfrontFee(uint256 collIndex, uint256 borrowedAmount, uint256 interestRate) external view returns (uint256);
    }

    interface IBorrowerOperations {
        function openTrove(address owner, uint256 ownerIndex, uint256 collAmount, uint256 boldAmount, uint256 upperHint, uint256 lowerHint, uint256 annualInterestRate, uint256 maxUpfrontFee, address addManager, address removeManager, address receiver) external returns (uint256);
    }

    #[sol(rpc)]
    interface ITroveManager {
        function getTroveIdsCount() external view returns (uint256);
    }

    #[sol(rpc)]
    interface ISortedTroves {
        function findInsertPosition(uint256 annualInterestRate, uint256 prevId, uint256 nextId) external view returns (uint256 upperHint, uint256 lowerHint);
    }
}
