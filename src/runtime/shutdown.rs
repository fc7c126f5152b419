use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{error::IndexerError, sync::SyncError};

const SYNC_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(60);
const HTTP_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A spawned task that may already have been joined while waiting for a signal.
pub(super) enum TaskState<T> {
    Running(JoinHandle<T>),
    Finished(Result<T, JoinError>),
}

impl<T> TaskState<T> {
    async fn join(self, task: &'static str, timeout: Duration) -> Option<Result<T, JoinError>> {
        match self {
            TaskState::Running(handle) => wait_for_shutdown_task(task, timeout, handle).await,
            TaskState::Finished(joined) => Some(joined),
        }
    }
}

pub(super) struct ShutdownContext {
    pub(super) sync_shutdown: CancellationToken,
    pub(super) sync_task: TaskState<Result<(), SyncError>>,
    pub(super) http_shutdown: CancellationToken,
    pub(super) http_task: TaskState<std::io::Result<()>>,
}

pub(super) async fn graceful_shutdown(context: ShutdownContext) -> Result<(), IndexerError> {
    // 1. Stop the sync engine; it finishes the current step and closes the reader
    // 2. Wait for it to exit
    // 3. Stop HTTP so /health stays readable until the engine is down
    // 4. Wait for HTTP to finish in-flight requests
    let ShutdownContext {
        sync_shutdown,
        sync_task,
        http_shutdown,
        http_task,
    } = context;

    tracing::info!("Shutting down gracefully...");

    sync_shutdown.cancel();
    let sync_result = sync_task.join("sync_engine", SYNC_SHUTDOWN_TIMEOUT).await;

    http_shutdown.cancel();
    let http_result = http_task.join("http_server", HTTP_SHUTDOWN_TIMEOUT).await;

    tracing::info!("Shutdown complete");

    match sync_result {
        Some(Ok(Err(error))) => return Err(error.into()),
        Some(Err(error)) => return Err(task_panicked("sync_engine", error)),
        Some(Ok(Ok(()))) | None => {}
    }
    match http_result {
        Some(Ok(Err(error))) => Err(error.into()),
        Some(Err(error)) => Err(task_panicked("http_server", error)),
        Some(Ok(Ok(()))) | None => Ok(()),
    }
}

fn task_panicked(task: &'static str, error: JoinError) -> IndexerError {
    IndexerError::TaskPanicked {
        task,
        reason: error.to_string(),
    }
}

/// Aborts the task if it has not finished within `timeout`; returns `None` then.
async fn wait_for_shutdown_task<T>(
    task: &str,
    timeout: Duration,
    mut handle: JoinHandle<T>,
) -> Option<Result<T, JoinError>> {
    match tokio::time::timeout(timeout, &mut handle).await {
        Ok(joined) => {
            if let Err(error) = &joined {
                tracing::error!(task, error = ?error, "Shutdown task panicked");
            }
            Some(joined)
        }
        Err(_) => {
            tracing::warn!(
                task,
                timeout_secs = timeout.as_secs(),
                "Shutdown timeout reached, aborting task"
            );
            handle.abort();
            let _ = handle.await;
            None
        }
    }
}
