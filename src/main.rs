use std::io;
use std::process::ExitCode;

use clap::Parser;

use vexa::cli::{Cli, Commands, apply_overrides, build_session, commands};
use vexa::config::AppConfig;
use vexa::core::Result;
use vexa::{logging, tui};

async fn dispatch(cli: Cli, config: AppConfig) -> Result<()> {
    let mut stdout = io::stdout().lock();

    match cli.command {
        None => {
            drop(stdout);
            let session = build_session(config, cli.ephemeral)?;
            tui::run_tui(session).await
        }
        Some(Commands::Ask { prompt }) => {
            let session = build_session(config, cli.ephemeral)?;
            let outcome = commands::ask(&session, &prompt.join(" "), &mut stdout).await;
            session.store.dispose();
            outcome
        }
        Some(Commands::Memory { command }) => {
            commands::memory(&config, cli.ephemeral, &command, &mut stdout)
        }
        Some(Commands::Speak { text }) => commands::speak(&config, &text.join(" ")).await,
        Some(Commands::Config { command }) => commands::config(&command, &mut stdout),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    apply_overrides(&cli, &mut config);

    let _log_guard = config
        .data_dir()
        .and_then(|dir| logging::init(&dir, cli.verbose));

    tracing::debug!(transport = %config.transport, model = %config.model, "Starting vexa");

    match dispatch(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("✗ {e}");
            ExitCode::FAILURE
        }
    }
}
