//! Convenience re-exports for downstream crates.

pub use crate::entry::{AuditEntry, AuditEvent, AuditOutcome};
pub use crate::error::{AuditError, AuditResult};
pub use crate::log::AuditLog;
