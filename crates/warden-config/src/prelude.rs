//! Convenience re-exports for crates consuming `warden-config`.

pub use crate::error::{ConfigError, ConfigResult};
pub use crate::loader::{load, load_file, SIGNING_SECRET_ENV};
pub use crate::types::{AuthConfig, Config, ExecutionConfig, QuotaConfig, ServerConfig, TransportKind};
