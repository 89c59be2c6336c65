mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use climasync_core::Synchronizer;

use crate::cli::{CampaignsCommand, Cli, Command};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.quiet);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a Mautic connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "climasync", &mut std::io::stdout());
            Ok(())
        }

        // The trigger only talks to the console
        Command::Campaigns(cli::CampaignsArgs {
            command: CampaignsCommand::Trigger { attempts, delay },
        }) => {
            let cfg = config::load(&cli.global)?;
            commands::campaigns::trigger(&cfg, attempts, delay, &cli.global).await
        }

        // All other commands require a Mautic connection
        cmd => {
            let cfg = config::load(&cli.global)?;
            let settings = config::resolve_settings(&cli.global, &cfg)?;
            let sync = Synchronizer::new(&settings)?;

            tracing::debug!(command = ?cmd, url = %settings.mautic.url, "dispatching command");
            commands::dispatch(cmd, &sync, &settings, &cli.global).await
        }
    }
}
