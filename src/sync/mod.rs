mod config;
mod engine;
mod error;
mod state;

pub use config::SyncConfig;
pub use engine::SyncEngine;
pub use error::SyncError;
pub use state::{SyncState, SyncStatus};

#[cfg(test)]
mod tests;
