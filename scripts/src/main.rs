use clap::Parser;
use scripts::{cli::Cli, context::ScriptContext, errors::ScriptError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli {
        rpc_url,
        deployments_path,
        command,
    } = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .pretty()
        .init();

    let ctx = ScriptContext::new(&rpc_url, deployments_path, command.roles()).await?;
    command.run(ctx).await
}
