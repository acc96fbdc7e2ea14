//! Redemption engine configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Upper bound accepted for `max_jitter_ms`.
const MAX_JITTER_LIMIT_MS: u64 = 5_000;

/// Redemption engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedemptionConfig {
    /// Upper bound of the random delay before each redemption; 0 disables it
    #[serde(default = "default_max_jitter_ms")]
    pub max_jitter_ms: u64,

    /// Interval of the cleanup sweep in seconds; 0 disables the sweep
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl RedemptionConfig {
    /// Get max jitter as Duration
    pub fn max_jitter(&self) -> Duration {
        Duration::from_millis(self.max_jitter_ms)
    }

    /// Cleanup interval, or `None` when the sweep is disabled
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_secs > 0).then(|| Duration::from_secs(self.cleanup_interval_secs))
    }

    /// Validate redemption configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_jitter_ms > MAX_JITTER_LIMIT_MS {
            return Err(ValidationError::JitterTooLarge);
        }
        Ok(())
    }
}

impl Default for RedemptionConfig {
    fn default() -> Self {
        Self {
            max_jitter_ms: default_max_jitter_ms(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_max_jitter_ms() -> u64 {
    300
}

fn default_cleanup_interval() -> u64 {
    3600
}
