//! Configuration for the server binary: a `[server]`/`[auth]`/`[quotas]`/
//! `[execution]` TOML file, overlaid by the `WARDEN_SIGNING_SECRET`
//! environment variable, validated before the server assembly starts.
//!
//! Deliberately simpler than a full multi-layer precedence system: this
//! server has one operator-controlled config file and one secret-bearing
//! environment variable, not a workspace/user/system hierarchy.
//!
//! # Example
//!
//! ```no_run
//! use warden_config::Config;
//! use std::path::Path;
//!
//! let config = warden_config::load(Path::new("warden.toml"))?;
//! assert!(config.auth.signing_secret.len() >= 32);
//! # Ok::<(), warden_config::ConfigError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod loader;
pub mod prelude;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load, load_file, SIGNING_SECRET_ENV};
pub use types::{AuthConfig, Config, ExecutionConfig, QuotaConfig, ServerConfig, TransportKind};
