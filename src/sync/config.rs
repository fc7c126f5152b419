use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// First block to index when no checkpoint exists yet.
    pub start_block: u64,
    /// Upper bound on how far past the cursor one range reaches.
    pub max_blocks_per_batch: u64,
    /// Blocks behind the chain head that are treated as not yet final.
    pub block_difference: u64,
    /// Idle wait when caught up; error backoff is twice this.
    pub poll_delay_ms: u64,
    /// Consecutive failed iterations before the engine stops.
    pub max_consecutive_failures: u32,
}

impl SyncConfig {
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        if self.max_blocks_per_batch == 0 {
            return Err(ConfigError::InvalidConfig(
                "sync.max_blocks_per_batch must be greater than 0".to_string(),
            ));
        }
        if self.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidConfig(
                "sync.max_consecutive_failures must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_delay(&self) -> Duration {
        Duration::from_millis(self.poll_delay_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        self.poll_delay().saturating_mul(2)
    }
}
