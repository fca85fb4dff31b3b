//! # Kaori API Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PORT=8080  JWT_SECRET=...  KAORI_TRANSITIONS=permissive            │
//! │                                                                         │
//! │  2. TOML Config File (path from KAORI_CONFIG)                          │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//! default_store_id = "store-1"
//!
//! [auth]
//! jwt_secret = "change-me"
//! access_lifetime_hours = 24
//!
//! [hub]
//! queue_capacity = 256
//! ping_interval_secs = 30
//! store_scoped = true
//!
//! [lifecycle]
//! transitions = "strict"    # strict | permissive
//! pricing = "permissive"    # permissive | strict
//! ```

use std::env;
use std::path::Path;

use serde::de::{value::StrDeserializer, DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use kaori_core::validation::validate_store_id;
use kaori_core::DEFAULT_STORE_ID;
use kaori_orders::LifecyclePolicy;
use kaori_realtime::HubConfig;

/// Secret used when nothing is configured. Fine for a laptop, not a shop.
pub const DEV_JWT_SECRET: &str = "kaori-dev-secret-change-in-production";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Store used when a request does not name one.
    pub default_store_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            default_store_id: DEFAULT_STORE_ID.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_lifetime_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            access_lifetime_hours: 24,
        }
    }
}

// =============================================================================
// KaoriConfig
// =============================================================================

/// Full server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KaoriConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub hub: HubConfig,
    pub lifecycle: LifecyclePolicy,
}

impl KaoriConfig {
    /// Loads defaults, then the TOML file named by `KAORI_CONFIG`, then
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var("KAORI_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;

        if config.auth.jwt_secret == DEV_JWT_SECRET {
            warn!("JWT_SECRET not set - using development secret");
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        info!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::LoadFailed(e.to_string()))
    }

    /// Applies overrides from a key lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("KAORI_BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = lookup("PORT") {
            self.server.port = parse_number("PORT", &v)?;
        }
        if let Some(v) = lookup("KAORI_STORE_ID") {
            self.server.default_store_id = v;
        }
        if let Some(v) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            self.auth.access_lifetime_hours = parse_number("JWT_EXPIRY_HOURS", &v)?;
        }
        if let Some(v) = lookup("KAORI_HUB_QUEUE_CAPACITY") {
            self.hub.queue_capacity = parse_number("KAORI_HUB_QUEUE_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("KAORI_HUB_PING_SECS") {
            self.hub.ping_interval_secs = parse_number("KAORI_HUB_PING_SECS", &v)?;
        }
        if let Some(v) = lookup("KAORI_STORE_SCOPED") {
            self.hub.store_scoped = parse_number("KAORI_STORE_SCOPED", &v)?;
        }
        if let Some(v) = lookup("KAORI_TRANSITIONS") {
            self.lifecycle.transitions = parse_keyword("KAORI_TRANSITIONS", &v)?;
        }
        if let Some(v) = lookup("KAORI_PRICING") {
            self.lifecycle.pricing = parse_keyword("KAORI_PRICING", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("JWT_SECRET".to_string()));
        }
        if self.auth.access_lifetime_hours <= 0 {
            return Err(ConfigError::InvalidValue("JWT_EXPIRY_HOURS".to_string()));
        }
        validate_store_id(&self.server.default_store_id)
            .map_err(|_| ConfigError::InvalidValue("KAORI_STORE_ID".to_string()))?;
        self.hub
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Parses a snake_case policy keyword through its serde representation.
fn parse_keyword<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T, ConfigError> {
    let de: StrDeserializer<'_, serde::de::value::Error> = raw.trim().into_deserializer();
    T::deserialize(de).map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load config: {0}")]
    LoadFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaori_core::PricingPolicy;
    use kaori_orders::TransitionPolicy;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = KaoriConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.server.default_store_id, "store-1");
        assert_eq!(config.hub.queue_capacity, 256);
        assert_eq!(config.lifecycle.transitions, TransitionPolicy::Strict);
        assert_eq!(config.lifecycle.pricing, PricingPolicy::Permissive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_partial() {
        let config = KaoriConfig::from_toml(
            r#"
            [server]
            port = 9090

            [hub]
            store_scoped = false

            [lifecycle]
            transitions = "permissive"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert!(!config.hub.store_scoped);
        assert_eq!(config.hub.ping_interval_secs, 30);
        assert_eq!(config.lifecycle.transitions, TransitionPolicy::Permissive);
        assert_eq!(config.lifecycle.pricing, PricingPolicy::Permissive);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = KaoriConfig::from_toml("[server]\nport = 9090\n").unwrap();
        config
            .apply_env(env_of(&[
                ("PORT", "7000"),
                ("JWT_SECRET", "s3cret"),
                ("KAORI_PRICING", "strict"),
                ("KAORI_STORE_SCOPED", "false"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.lifecycle.pricing, PricingPolicy::Strict);
        assert!(!config.hub.store_scoped);
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = KaoriConfig::default();
        assert!(matches!(
            config.apply_env(env_of(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidValue(key)) if key == "PORT"
        ));
        assert!(config
            .apply_env(env_of(&[("KAORI_TRANSITIONS", "loose")]))
            .is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = KaoriConfig::default();
        config.hub.queue_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = KaoriConfig::default();
        config.auth.jwt_secret = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));

        let mut config = KaoriConfig::default();
        config.server.default_store_id = "store 1".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            KaoriConfig::from_toml("[server]\nport = \"x\""),
            Err(ConfigError::LoadFailed(_))
        ));
    }
}
