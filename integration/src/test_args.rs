//! Defines arguments passed to each test

use std::str::FromStr;

use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use eyre::Result;
use scripts::{
    constants::BALANCE_CONTRACT_KEY,
    solidity::{BalanceContract, IBalanceContract},
};

use crate::{util::deployments::read_deployment, CliArgs};

/// The arguments provided to each integration test
///
/// The test key is expected to hold the balance contract's operator and
/// approver roles, as it does on a devnet deployed with a single key
#[derive(Clone)]
pub(crate) struct TestArgs {
    /// A provider without a signer, for accounts the node signs for
    pub node: DynProvider,
    /// The balance contract, signing as the test key
    pub balance_contract: BalanceContract,
}

impl TestArgs {
    /// Connect to the node and resolve the deployed contracts
    pub async fn new(cli_args: CliArgs) -> Result<Self> {
        let signer = PrivateKeySigner::from_str(&cli_args.pkey)?;
        let url: Url = cli_args.rpc_url.parse()?;
        let wallet =
            DynProvider::new(ProviderBuilder::new().wallet(signer).connect_http(url.clone()));
        let node = DynProvider::new(ProviderBuilder::new().connect_http(url));

        let chain_id = wallet.get_chain_id().await?;
        let balance_address =
            read_deployment(chain_id, BALANCE_CONTRACT_KEY, &cli_args.deployments)?;
        let balance_contract = IBalanceContract::new(balance_address, wallet);

        Ok(Self { node, balance_contract })
    }

    /// Get the address of the balance contract
    pub fn balance_contract_addr(&self) -> Address {
        *self.balance_contract.address()
    }
}
