//! Hub tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HubError, HubResult};

/// Default per-subscriber outbound queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default keepalive ping period.
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 30;

/// Configuration for the broadcast hub and its sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Messages a subscriber may have queued before it is dropped.
    pub queue_capacity: usize,
    /// Seconds between transport pings on an idle connection.
    pub ping_interval_secs: u64,
    /// When false every broadcast reaches every subscriber.
    pub store_scoped: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            ping_interval_secs: DEFAULT_PING_INTERVAL_SECS,
            store_scoped: true,
        }
    }
}

impl HubConfig {
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    /// Rejects values tokio would panic on (zero-capacity channel, zero period).
    pub fn validate(&self) -> HubResult<()> {
        if self.queue_capacity == 0 {
            return Err(HubError::InvalidConfig(
                "queue_capacity must be at least 1".into(),
            ));
        }
        if self.ping_interval_secs == 0 {
            return Err(HubError::InvalidConfig(
                "ping_interval_secs must be at least 1".into(),
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
        let config = HubConfig::default();
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.ping_interval(), Duration::from_secs(30));
        assert!(config.store_scoped);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = HubConfig {
            queue_capacity: 0,
            ..HubConfig::default()
        };
        assert!(matches!(config.validate(), Err(HubError::InvalidConfig(_))));

        let config = HubConfig {
            ping_interval_secs: 0,
            ..HubConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: HubConfig = serde_json::from_str(r#"{"store_scoped": false}"#).unwrap();
        assert!(!config.store_scoped);
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    }
}
