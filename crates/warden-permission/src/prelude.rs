//! Convenience re-exports for downstream crates.

pub use crate::defaults::default_permissions;
pub use crate::engine::AuthorizationEngine;
pub use crate::error::{PermissionError, PermissionResult};
pub use crate::permission::{Permission, PermissionType, Resource};
