//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Record store backend configuration. Both fields are required at boot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted record store.
    #[serde(default)]
    pub url: String,

    /// Service-role credential used for backend requests.
    #[serde(default)]
    pub service_key: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// API surface authentication configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for protected routes. When unset, protected routes are
    /// open; the binary surfaces this as a boot-time warning.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Origins allowed on protected routes. Empty means unrestricted.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Cadence-check interval in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Maximum job runs retained in memory (oldest evicted first).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_tick_secs() -> u64 {
    30
}

fn default_history_limit() -> usize {
    200
}

impl Config {
    /// Build a configuration from the process environment.
    ///
    /// Recognized variables: `OPSWATCH_BACKEND_URL`, `OPSWATCH_SERVICE_KEY`,
    /// `OPSWATCH_API_KEY`, `OPSWATCH_ALLOWED_ORIGINS` (comma-separated),
    /// `OPSWATCH_HOST`, `PORT`, `OPSWATCH_TICK_SECS`,
    /// `OPSWATCH_HISTORY_LIMIT`.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(url) = std::env::var("OPSWATCH_BACKEND_URL") {
            config.backend.url = url;
        }
        if let Ok(key) = std::env::var("OPSWATCH_SERVICE_KEY") {
            config.backend.service_key = key;
        }
        if let Ok(key) = std::env::var("OPSWATCH_API_KEY") {
            if !key.is_empty() {
                config.auth.api_key = Some(key);
            }
        }
        if let Ok(origins) = std::env::var("OPSWATCH_ALLOWED_ORIGINS") {
            config.auth.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(host) = std::env::var("OPSWATCH_HOST") {
            config.server.host = host;
        }
        // Hosting platforms inject the listening port as PORT.
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }
        if let Ok(tick) = std::env::var("OPSWATCH_TICK_SECS") {
            if let Ok(tick) = tick.parse() {
                config.scheduler.tick_secs = tick;
            }
        }
        if let Ok(limit) = std::env::var("OPSWATCH_HISTORY_LIMIT") {
            if let Ok(limit) = limit.parse() {
                config.scheduler.history_limit = limit;
            }
        }

        config
    }

    /// Validate required fields and value ranges. Failure is fatal at boot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.url.is_empty() {
            return Err(ConfigError::MissingField("backend.url".to_string()));
        }
        if self.backend.service_key.is_empty() {
            return Err(ConfigError::MissingField("backend.service_key".to_string()));
        }
        if self.scheduler.tick_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.tick_secs".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        if self.scheduler.history_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.history_limit".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.scheduler.tick_secs, 30);
        assert_eq!(config.scheduler.history_limit, 200);
        assert!(config.auth.api_key.is_none());
        assert!(config.auth.allowed_origins.is_empty());
    }

    #[test]
    fn test_validate_requires_backend() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backend.url"));

        let mut config = Config::default();
        config.backend.url = "https://example.supabase.co".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backend.service_key"));
    }

    #[test]
    fn test_validate_ok() {
        let mut config = Config::default();
        config.backend.url = "https://example.supabase.co".to_string();
        config.backend.service_key = "service-role-key".to_string();
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let mut config = Config::default();
        config.backend.url = "https://example.supabase.co".to_string();
        config.backend.service_key = "service-role-key".to_string();
        config.scheduler.tick_secs = 0;
        assert!(config.validate().is_err());
    }
}
