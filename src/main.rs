use clap::Parser;
use tracing_subscriber::EnvFilter;

use guardian_vault::cli::{ops, Cli, CliError};
use guardian_vault::config::VaultConfig;
use guardian_vault::env::{Clock, ManualClock, SystemClock};
use guardian_vault::storage::Storage;

fn run(cli: Cli, config: &VaultConfig) -> Result<(), CliError> {
    let clock: Box<dyn Clock> = match cli.at {
        Some(at) => Box::new(ManualClock::at(at)),
        None => Box::new(SystemClock),
    };
    let storage = Storage::open(&config.store.db_path)?;
    ops::handle_command(cli.command, &storage, clock.as_ref(), config)
}

fn main() {
    let cli = Cli::parse();

    // The config picks the log level, so anything it logs while loading is dropped
    let config = VaultConfig::load_or_default(&cli.config);
    let level = config
        .as_ref()
        .map(|c| c.log.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = config
        .map_err(CliError::from)
        .and_then(|config| run(cli, &config));
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
