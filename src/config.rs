//! Client configuration with environment overrides
//!
//! Defaults target a local server on port 8000; every knob can be
//! overridden from the environment at startup.

use std::env;
use std::time::Duration;

use crate::sync::ReconnectPolicy;

/// Configuration for the sync client and its REST collaborator
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the REST collaborator, no trailing slash
    pub api_base_url: String,
    /// WebSocket endpoint for the change channel
    pub ws_url: String,
    /// Resource path segment for the record collection
    pub resource: String,
    /// Reconnect backoff tuning
    pub reconnect: ReconnectPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            ws_url: "ws://localhost:8000/ws".to_string(),
            resource: "products".to_string(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl SyncConfig {
    /// Build a config from the environment, falling back to defaults
    ///
    /// Recognized variables: `INVENTORY_API_URL`, `INVENTORY_WS_URL`,
    /// `INVENTORY_RESOURCE`, `INVENTORY_MAX_RECONNECTS`,
    /// `INVENTORY_RECONNECT_BASE_MS`, `INVENTORY_RECONNECT_CAP_MS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("INVENTORY_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(url) = env::var("INVENTORY_WS_URL") {
            config.ws_url = url;
        }
        if let Ok(resource) = env::var("INVENTORY_RESOURCE") {
            config.resource = resource;
        }
        if let Some(max) = env_u64("INVENTORY_MAX_RECONNECTS") {
            config.reconnect.max_attempts = max as u32;
        }
        if let Some(ms) = env_u64("INVENTORY_RECONNECT_BASE_MS") {
            config.reconnect.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = env_u64("INVENTORY_RECONNECT_CAP_MS") {
            config.reconnect.max_delay = Duration::from_millis(ms);
        }
        config
    }
}

/// Read a numeric environment variable, ignoring unset or unparseable values
fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let config = SyncConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.ws_url, "ws://localhost:8000/ws");
        assert_eq!(config.resource, "products");
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.base_delay, Duration::from_secs(1));
        assert_eq!(config.reconnect.max_delay, Duration::from_secs(30));
    }

    #[test]
    fn test_env_u64_ignores_garbage() {
        // Unset and malformed values both fall through to the default.
        assert_eq!(env_u64("INVENTORY_TEST_UNSET_VARIABLE"), None);
    }
}
