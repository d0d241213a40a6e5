//! `gotcha`: probe platforms for accounts matching a username or email.

mod banner;
mod cli;
mod run;
mod targets;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::Cli;
use run::Outcome;
use std::process::ExitCode;
use tracing::debug;

fn init_tracing(quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if quiet { "error" } else { "warn,gotcha=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if !cli.list_platforms {
        if !cli.has_target() {
            Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "provide at least one target with --username, --email, or --file",
                )
                .exit();
        }
        if cli.categories().is_empty() && !cli.analyze_domain() {
            Cli::command()
                .error(
                    ErrorKind::MissingRequiredArgument,
                    "select at least one category or --domain, or use --all",
                )
                .exit();
        }
    }

    init_tracing(cli.quiet);
    if !cli.quiet {
        banner::print();
    }
    debug!(version = env!("CARGO_PKG_VERSION"), "starting gotcha");

    match execute(&cli).await {
        Ok(Outcome::Completed) => ExitCode::SUCCESS,
        Ok(Outcome::Exhausted) => ExitCode::from(1),
        Ok(Outcome::Interrupted) => {
            eprintln!("Scan interrupted by user");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn execute(cli: &Cli) -> anyhow::Result<Outcome> {
    let config = run::load_config(cli)?;
    let registry = run::load_registry(&config)?;

    if cli.list_platforms {
        run::list_platforms(cli, &registry)?;
        return Ok(Outcome::Completed);
    }

    run::scan(cli, &config, registry).await
}
