use clap::Parser;
use log::{error, LevelFilter};

use tally::cli::{self, CliArgs};
use tally::process;
use tally::storage::BlobStore;

fn init_logging() {
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info);

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // Exported before logging so LOG_LEVEL can arrive via --env_vars.
    if let Some(spec) = args.env_vars.as_deref() {
        if let Err(e) = cli::export_env_vars(spec) {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    init_logging();

    if let Err(e) = cli::validate_for_action(&args) {
        error!("{}", e);
        std::process::exit(1);
    }

    let store = BlobStore::new();
    if let Err(e) = process::run(&args, &store).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
