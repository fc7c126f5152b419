use tokio::{select, signal::unix::SignalKind, task::JoinError};
use tokio_util::sync::CancellationToken;

use super::{
    RuntimeDeps,
    shutdown::{self, ShutdownContext, TaskState},
};
use crate::{error::IndexerError, sync::SyncError};

enum Trigger {
    Signal,
    SyncExited(Result<Result<(), SyncError>, JoinError>),
    HttpExited(Result<std::io::Result<()>, JoinError>),
}

/// Run the sync engine and HTTP API until a signal arrives or one of them exits.
pub(crate) async fn run(deps: RuntimeDeps) -> Result<(), IndexerError> {
    let RuntimeDeps {
        sync_engine,
        http_router,
    } = deps;

    // Separate tokens so HTTP keeps serving while the engine drains.
    let sync_shutdown = CancellationToken::new();
    let http_shutdown = CancellationToken::new();

    let mut sync_task = tokio::task::spawn({
        let shutdown = sync_shutdown.clone();
        async move { sync_engine.run(shutdown).await }
    });

    let mut http_task = tokio::task::spawn({
        let shutdown = http_shutdown.clone();
        async move {
            match http_router {
                Some(router) => router.listen_and_handle_http_requests(shutdown).await,
                None => {
                    // HTTP API disabled - wait for shutdown signal
                    shutdown.cancelled().await;
                    Ok(())
                }
            }
        }
    });

    let ctrl_c = tokio::signal::ctrl_c();
    let mut sigterm = tokio::signal::unix::signal(SignalKind::terminate())?;

    let trigger = select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, initiating shutdown...");
            Trigger::Signal
        }
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, initiating shutdown...");
            Trigger::Signal
        }
        joined = &mut sync_task => {
            tracing::warn!("Sync engine exited, initiating shutdown...");
            Trigger::SyncExited(joined)
        }
        joined = &mut http_task => {
            tracing::warn!("HTTP server exited, initiating shutdown...");
            Trigger::HttpExited(joined)
        }
    };

    let (sync_task, http_task) = match trigger {
        Trigger::Signal => (TaskState::Running(sync_task), TaskState::Running(http_task)),
        Trigger::SyncExited(joined) => (TaskState::Finished(joined), TaskState::Running(http_task)),
        Trigger::HttpExited(joined) => (TaskState::Running(sync_task), TaskState::Finished(joined)),
    };

    shutdown::graceful_shutdown(ShutdownContext {
        sync_shutdown,
        sync_task,
        http_shutdown,
        http_task,
    })
    .await
}
