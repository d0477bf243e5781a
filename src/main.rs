mod cli;
mod commands;
mod config;
mod error;
mod kubernetes;
mod namespace;
mod output;
mod scanner;
mod tags;
mod types;
mod usage;
mod vcs;

use clap::Parser;
use tracing::warn;

use cli::{Cli, Command};
use commands::CommandContext;
use types::ResourceKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Candidates may go to stdout in batch/yaml mode, so logs always go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let client = kubernetes::initialize_client(cli.context.as_deref()).await?;
    let ctx = CommandContext::new(client, cli.namespace.clone(), cli.output_format());

    // Nothing is deleted until a pass has finished, so dropping it midway is safe
    tokio::select! {
        result = run(&ctx, &cli.command) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, aborting");
            std::process::exit(130);
        }
    }
}

async fn run(ctx: &CommandContext, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::History(args) => commands::history::run(ctx, args).await,
        Command::Orphans(args) => commands::orphans::run(ctx, args).await,
        Command::Configmaps(args) => {
            commands::resources::run(ctx, ResourceKind::ConfigMap, args).await
        }
        Command::Secrets(args) => {
            commands::resources::run(ctx, ResourceKind::Secret, args).await
        }
        Command::Namespaces(args) => commands::namespaces::run(ctx, args).await,
    }
}
