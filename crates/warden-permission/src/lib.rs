//! Permission values and the per-client authorization engine.
//!
//! # Example
//!
//! ```
//! use warden_core::ClientId;
//! use warden_permission::{AuthorizationEngine, Permission, PermissionType, Resource};
//!
//! let mut engine = AuthorizationEngine::new();
//! let client = ClientId::new("alice");
//! engine.initialize(client.clone(), None);
//!
//! let required = Permission::new(PermissionType::FileRead, Resource::path("/app/data/report.txt"));
//! assert!(engine.has(&client, &required));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod defaults;
pub mod engine;
pub mod error;
pub mod permission;
pub mod prelude;

pub use defaults::default_permissions;
pub use engine::AuthorizationEngine;
pub use error::{PermissionError, PermissionResult};
pub use permission::{Permission, PermissionType, Resource};
