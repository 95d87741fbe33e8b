use serde::{Deserialize, Serialize};

use crate::errors::{ScanError, ScanResult};
use crate::stream::{DEFAULT_MAX_READ_FAILURES, MIN_RECORD_LEN};

/// Tuning knobs the orchestrator hands to the streaming core
///
/// The core reads no files and no environment; whoever drives the scan
/// builds this struct (deserialized or by hand) and passes it down.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Size in bytes of the batch buffer the caller should allocate per
    /// directory stream
    #[serde(default = "default_batch_capacity")]
    pub batch_capacity: usize,

    /// Consecutive directory read failures tolerated before a cursor drops
    /// its handle
    #[serde(default = "default_max_read_failures")]
    pub max_read_failures: u32,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_batch_capacity() -> usize {
    64 * 1024
}

fn default_max_read_failures() -> u32 {
    DEFAULT_MAX_READ_FAILURES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_capacity: default_batch_capacity(),
            max_read_failures: default_max_read_failures(),
            log_level: default_log_level(),
        }
    }
}

impl ScanConfig {
    /// Checks that the configuration can actually stream entries
    pub fn validate(&self) -> ScanResult<()> {
        if self.batch_capacity < MIN_RECORD_LEN {
            return Err(ScanError::config_error(format!(
                "batch_capacity must be at least {} bytes, got {}",
                MIN_RECORD_LEN, self.batch_capacity
            )));
        }
        if self.max_read_failures == 0 {
            return Err(ScanError::config_error(
                "max_read_failures must be at least 1",
            ));
        }
        Ok(())
    }
}
