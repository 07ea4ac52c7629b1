//! Per-client filesystem jails, resource quotas, and persistent sandbox state.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), warden_sandbox::SandboxError> {
//! use warden_sandbox::JailManager;
//! use warden_core::ClientId;
//!
//! let jail = JailManager::new("/tmp/warden/clients");
//! let client = ClientId::new("alice");
//! let path = jail.resolve(&client, "notes/todo.txt").await?;
//! assert!(path.starts_with("/tmp/warden/clients/alice"));
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod jail;
pub mod prelude;
pub mod quota;
pub mod state;

pub use error::{SandboxError, SandboxResult};
pub use jail::JailManager;
pub use quota::{Quota, QuotaManager, ResourceRequirement};
pub use state::SandboxStateStore;
