//! Monitor configuration.

use crate::error::{Result, SystemError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling and retention settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Time between two collection ticks
    pub interval: Duration,
    /// Number of snapshots kept in history
    pub history_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(crate::DEFAULT_INTERVAL_MS),
            history_capacity: crate::DEFAULT_HISTORY_SIZE,
        }
    }
}

impl MonitorConfig {
    /// Set the collection interval in milliseconds.
    pub fn with_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval = Duration::from_millis(interval_ms);
        self
    }

    /// Set the history capacity. Non-positive values fall back to the default.
    pub fn with_history_capacity(mut self, capacity: i64) -> Self {
        self.history_capacity = match usize::try_from(capacity) {
            Ok(capacity) if capacity > 0 => capacity,
            _ => crate::DEFAULT_HISTORY_SIZE,
        };
        self
    }

    /// Reject settings the collection loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(SystemError::config_error(
                "collection interval must be positive",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.history_capacity, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_positive_capacity_falls_back() {
        assert_eq!(MonitorConfig::default().with_history_capacity(0).history_capacity, 60);
        assert_eq!(MonitorConfig::default().with_history_capacity(-5).history_capacity, 60);
        assert_eq!(MonitorConfig::default().with_history_capacity(7).history_capacity, 7);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = MonitorConfig::default().with_interval_ms(0).validate().unwrap_err();
        assert!(matches!(err, SystemError::Config(_)));
    }
}
