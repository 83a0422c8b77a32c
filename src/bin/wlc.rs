//! Weblate command-line client.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wlc::cli::{run, Cli};
use wlc::{Config, ErrorKind, Transport, WeblateError};

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "wlc=debug" } else { "wlc=warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match Config::load(cli.config.as_deref(), &cli.config_section) {
        Ok(config) => config.with_overrides(cli.url.clone(), cli.key.clone()),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    let stdin = io::stdin();
    match run(&cli, &config, &mut stdout.lock(), &mut stdin.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e, &config);
            ExitCode::from(e.exit_code())
        }
    }
}

fn report(error: &WeblateError, config: &Config) {
    match error.kind() {
        ErrorKind::Auth => {
            if has_key(config) {
                eprintln!("API key configured for {} was rejected by server.", config.url);
            } else {
                eprintln!("Missing API key for {}.", config.url);
                eprintln!("The API key can be specified by --key or in the configuration file.");
            }
        }
        ErrorKind::Transport => eprintln!("{error}"),
        _ => eprintln!("Error: {error}"),
    }
}

fn has_key(config: &Config) -> bool {
    config
        .credentials()
        .and_then(|credentials| Transport::new(&config.url, credentials, config.retry.clone()))
        .is_ok_and(|transport| transport.has_key())
}
