mod bootstrap;
pub mod config;
pub mod controllers;
pub mod error;
pub mod logger;
mod runtime;
pub mod sync;

#[cfg(test)]
mod testing;

use config::Config;
use error::IndexerError;

/// Build every component from `config` and run until shutdown.
///
/// Returns an error when the sync engine stops on its own after reaching
/// `max_consecutive_failures`, or when startup fails.
pub async fn run(config: Config) -> Result<(), IndexerError> {
    display_banner(&config);

    let core = bootstrap::build_core(config).await?;
    let sync_engine = bootstrap::build_sync_engine(&core);
    let http_router = bootstrap::build_http_router(&core, &sync_engine);

    runtime::run(runtime::RuntimeDeps {
        sync_engine,
        http_router,
    })
    .await
}

fn display_banner(config: &Config) {
    tracing::info!("======================================================");
    tracing::info!(
        "             Shielded Indexer v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("======================================================");
    tracing::info!("Indexer is running in {} environment", config.environment);
}
