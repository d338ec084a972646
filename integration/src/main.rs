//! Integration tests for the balance contract and its operations scripts.
//! These assume that an Anvil node is already running with the contracts deployed.

use std::path::PathBuf;

use alloy::providers::ext::AnvilApi;
use clap::Parser;
use colored::Colorize;
use constants::{DEFAULT_DEPLOYMENTS_PATH, DEFAULT_PKEY, DEFAULT_RPC_URL};
use eyre::Result;
use test_args::TestArgs;
use test_inventory::IntegrationTest;
use tracing_subscriber::EnvFilter;

mod constants;
mod test_args;
mod test_inventory;
mod tests;
mod util;

/// The CLI arguments for the integration tests
#[derive(Debug, Clone, Parser)]
struct CliArgs {
    /// The path to the deployments file
    #[clap(long, default_value = DEFAULT_DEPLOYMENTS_PATH)]
    deployments: PathBuf,
    /// The private key to use for testing
    #[clap(short = 'p', long, default_value = DEFAULT_PKEY)]
    pkey: String,
    /// The RPC url to run the tests against
    #[clap(short = 'r', long, default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
    /// Only run tests whose name contains this filter
    #[arg(short, long)]
    test: Option<String>,
}

// --------------
// | Entrypoint |
// --------------

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli_args = CliArgs::parse();
    let filter = cli_args.test.clone();
    let args = TestArgs::new(cli_args).await?;

    let tests = inventory::iter::<IntegrationTest>
        .into_iter()
        .filter(|test| filter.as_deref().map_or(true, |f| test.name.contains(f)))
        .collect::<Vec<_>>();

    let mut failures = 0;
    for test in &tests {
        // Roll back each test's grants once it finishes
        let snapshot = args.node.anvil_snapshot().await?;
        let res = (test.test_fn)(args.clone()).await;
        let reverted = args.node.anvil_revert(snapshot).await?;
        eyre::ensure!(reverted, "failed to roll back the node after {}", test.name);

        match res {
            Ok(()) => println!("{} {}", "PASSED".green().bold(), test.name),
            Err(e) => {
                failures += 1;
                println!("{} {}: {:#}", "FAILED".red().bold(), test.name, e);
            }
        }
    }

    println!("\n{} of {} tests passed", tests.len() - failures, tests.len());
    eyre::ensure!(failures == 0, "{failures} integration tests failed");
    Ok(())
}
