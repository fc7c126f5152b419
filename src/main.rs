use std::process::ExitCode;

use dotenvy::dotenv;
use shielded_indexer::{config, logger};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    let config = match config::initialize_configuration() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Failed to load configuration: {error}");
            return ExitCode::FAILURE;
        }
    };
    logger::initialize(&config.logger, &config.telemetry);

    match shielded_indexer::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(error = %error, "Indexer stopped with fatal error");
            ExitCode::FAILURE
        }
    }
}
