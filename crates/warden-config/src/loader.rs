//! Defaults → file → environment loading, in that precedence order.

use std::path::Path;

use tracing::info;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Environment variable carrying the signing secret, preferred over any
/// value present in the config file.
pub const SIGNING_SECRET_ENV: &str = "WARDEN_SIGNING_SECRET";

/// Load configuration: start from [`Config::default`], overlay `path` if it
/// exists, then overlay environment variables for secret material, and
/// validate the result.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if `path` exists but cannot be read,
/// [`ConfigError::Parse`] if its contents are not valid TOML, or
/// [`ConfigError::Invalid`] if the merged configuration fails validation.
pub fn load(path: &Path) -> ConfigResult<Config> {
    let mut config = if path.exists() {
        load_file(path)?
    } else {
        info!(path = %path.display(), "no config file found, using defaults");
        Config::default()
    };

    if let Ok(secret) = std::env::var(SIGNING_SECRET_ENV) {
        config.auth.signing_secret = secret;
    }

    config.validate()?;
    Ok(config)
}

/// Parse a single TOML file into a [`Config`], without defaults layering or
/// environment overlay.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Parse`] if its contents are not valid TOML.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults_and_still_needs_a_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent.toml");
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn file_values_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("warden.toml");
        std::fs::write(
            &path,
            format!(
                "[auth]\nsigning_secret = \"{}\"\n",
                "x".repeat(32)
            ),
        )
        .unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.auth.signing_secret, "x".repeat(32));
    }
}
