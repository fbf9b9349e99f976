use anyhow::Context;
use clap::Parser;
use tiny_squeeze::cli::{Args, Commands};
use tiny_squeeze::logger::{set_verbosity, Verbosity};
use tiny_squeeze::{
    backup_directory, BatchOptions, BatchOrchestrator, ClientOptions, FailureStore,
    ResolverInput, RetryOutcome, TinyClient,
};
use tiny_squeeze::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    set_verbosity(Verbosity::from_flags(args.quiet, args.verbose));

    let batch_options = BatchOptions::new(args.tuning.batch_size, args.tuning.cooldown)?;
    let client_options = ClientOptions::new(
        args.tuning.api_url.clone(),
        args.tuning.timeout,
        args.tuning.spoof_ip,
    );
    let client = TinyClient::new(client_options)?;
    let store = FailureStore::in_current_dir().context("cannot locate working directory")?;
    let orchestrator = BatchOrchestrator::new(client, batch_options, store);

    match args.command {
        Some(Commands::Retry) => match orchestrator.retry_failed().await {
            RetryOutcome::NothingToRetry => info!("✨ Nothing to retry."),
            RetryOutcome::Completed(_) => {}
        },
        None => {
            let input = ResolverInput::new(args.paths, args.recursive);
            if args.backup {
                run_backup(&input)?;
            }
            orchestrator.execute(&input).await;
        }
    }

    Ok(())
}

fn run_backup(input: &ResolverInput) -> anyhow::Result<()> {
    match input.target_directory() {
        Some(dir) => {
            let target = backup_directory(&dir)
                .with_context(|| format!("failed to back up {}", dir.display()))?;
            info!("🗂️  Backed up {} to {}", dir.display(), target.display());
        }
        None => warn!("--backup only applies to a directory; skipping backup"),
    }
    Ok(())
}
