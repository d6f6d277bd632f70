mod cli;

use clap::Parser;
use cli::Cli;
use theknife::config::{LoggingSettings, Settings};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Initialize logging; `LOG_LEVEL` and `LOG_FORMAT` override the configured values
fn init_logging(logging: &LoggingSettings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| logging.format.clone());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };

    let settings = match settings {
        Ok(settings) => {
            init_logging(&settings.logging);
            settings
        }
        Err(e) => {
            init_logging(&LoggingSettings::default());
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    debug!("Using data directory {}", settings.storage.data_dir.display());

    if let Err(e) = cli::run(cli.command, &settings) {
        error!("{}", e);
        std::process::exit(1);
    }
}
