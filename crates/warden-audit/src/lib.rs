//! Append-only audit log, optionally chain-linked via content hashes.
//!
//! # Example
//!
//! ```no_run
//! # async fn run() -> Result<(), warden_audit::AuditError> {
//! use warden_audit::{AuditLog, AuditEvent, AuditOutcome};
//! use warden_core::ClientId;
//!
//! let log = AuditLog::new("/tmp/warden/audit.json");
//! log.append(
//!     ClientId::new("alice"),
//!     AuditEvent::AuthSuccess { username: "alice".to_string() },
//!     AuditOutcome::success(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod entry;
pub mod error;
pub mod log;
pub mod prelude;

pub use entry::{AuditEntry, AuditEvent, AuditOutcome};
pub use error::{AuditError, AuditResult};
pub use log::AuditLog;
