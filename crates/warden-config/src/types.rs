//! Configuration struct definitions mirroring the recognized options: data
//! directory, transport selection, signing secret, token lifetimes, quotas,
//! and execution timeout.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Top-level configuration, as read from `[server]`, `[auth]`, `[quotas]`,
/// and `[execution]` sections of a TOML file.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identity and transport settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Signing secret and token lifetimes.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Default per-client resource quotas.
    #[serde(default)]
    pub quotas: QuotaConfig,
    /// Execution pipeline defaults.
    #[serde(default)]
    pub execution: ExecutionConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server", &self.server)
            .field("auth", &self.auth)
            .field("quotas", &self.quotas)
            .field("execution", &self.execution)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            quotas: QuotaConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

impl Config {
    /// Enforce the invariants the rest of the server relies on: a signing
    /// secret of at least 32 bytes, and non-zero timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first rule violated.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth.signing_secret.len() < 32 {
            return Err(ConfigError::Invalid(
                "auth.signing_secret must be at least 32 bytes".to_string(),
            ));
        }
        if self.auth.access_token_minutes == 0 {
            return Err(ConfigError::Invalid(
                "auth.access_token_minutes must be non-zero".to_string(),
            ));
        }
        if self.auth.refresh_token_days == 0 {
            return Err(ConfigError::Invalid(
                "auth.refresh_token_days must be non-zero".to_string(),
            ));
        }
        if self.execution.default_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "execution.default_timeout_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Which transport the server binds, and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root directory for `clients.json`, `tokens.json`, `audit.json`, and
    /// every client's jailed workspace.
    pub data_dir: std::path::PathBuf,
    /// The transport to serve on.
    #[serde(default)]
    pub transport: TransportKind,
    /// `host:port` for the `tcp` and `websocket` transports. Ignored for `stdio`.
    #[serde(default)]
    pub bind: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: std::path::PathBuf::from("./warden-data"),
            transport: TransportKind::default(),
            bind: None,
        }
    }
}

/// The set of transports the server can be configured to serve on.
/// Defaults to `stdio` when no transport is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Line-framed stdin/stdout.
    #[default]
    Stdio,
    /// Length-prefixed TCP.
    Tcp,
    /// Axum-upgraded WebSocket.
    Websocket,
}

/// Signing secret and token lifetime configuration. The secret is preferably
/// supplied via the `WARDEN_SIGNING_SECRET` environment variable rather than
/// committed to a config file.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric signing key for issued tokens. Must be at least 32 bytes.
    #[serde(default)]
    pub signing_secret: String,
    /// Access token lifetime, in minutes.
    #[serde(default = "default_access_token_minutes")]
    pub access_token_minutes: u64,
    /// Refresh token lifetime, in days.
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_days: u64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("signing_secret", &"<redacted>")
            .field("access_token_minutes", &self.access_token_minutes)
            .field("refresh_token_days", &self.refresh_token_days)
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: String::new(),
            access_token_minutes: default_access_token_minutes(),
            refresh_token_days: default_refresh_token_days(),
        }
    }
}

fn default_access_token_minutes() -> u64 {
    60
}

fn default_refresh_token_days() -> u64 {
    7
}

/// Default per-client resource quotas, applied to every newly initialized
/// client unless overridden later by an operator action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum CPU percentage.
    #[serde(default = "default_cpu_percent")]
    pub cpu_percent: u32,
    /// Maximum resident memory, in megabytes.
    #[serde(default = "default_memory_mb")]
    pub memory_mb: u64,
    /// Maximum disk usage, in gigabytes.
    #[serde(default = "default_disk_gb")]
    pub disk_gb: u64,
    /// Maximum concurrent processes.
    #[serde(default = "default_max_processes")]
    pub max_processes: u32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            cpu_percent: default_cpu_percent(),
            memory_mb: default_memory_mb(),
            disk_gb: default_disk_gb(),
            max_processes: default_max_processes(),
        }
    }
}

fn default_cpu_percent() -> u32 {
    50
}

fn default_memory_mb() -> u64 {
    512
}

fn default_disk_gb() -> u64 {
    1
}

fn default_max_processes() -> u32 {
    5
}

/// Execution pipeline defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Default per-call timeout, in seconds, used when a tool does not
    /// declare its own.
    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_the_signing_secret() {
        let config = Config {
            auth: AuthConfig {
                signing_secret: "a very secret value that should never print".to_string(),
                ..AuthConfig::default()
            },
            ..Config::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("very secret value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn validate_rejects_short_secrets() {
        let config = Config {
            auth: AuthConfig {
                signing_secret: "too short".to_string(),
                ..AuthConfig::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults_with_a_long_enough_secret() {
        let config = Config {
            auth: AuthConfig {
                signing_secret: "x".repeat(32),
                ..AuthConfig::default()
            },
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
