use std::time::Instant;

use indexer_observability::record_repository_query;

use crate::error::Result;

/// Record the outcome of one repository query.
pub(crate) fn observe<T>(
    repository: &str,
    method: &str,
    started: Instant,
    result: &Result<T>,
    rows: impl FnOnce(&T) -> Option<usize>,
) {
    match result {
        Ok(value) => {
            record_repository_query(repository, method, "ok", started.elapsed(), rows(value));
        }
        Err(err) => {
            tracing::debug!(repository, method, error = %err, "Repository query failed");
            record_repository_query(repository, method, "error", started.elapsed(), None);
        }
    }
}
