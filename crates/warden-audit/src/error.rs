//! Audit log error types.

use thiserror::Error;

/// Errors raised by the audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Underlying storage failure.
    #[error(transparent)]
    Store(#[from] warden_store::StoreError),

    /// An entry's `previous_hash` does not match the chain head, meaning the
    /// log has been tampered with or entries were appended out of order.
    #[error("audit chain broken: entry {index} does not follow the chain head")]
    ChainBroken {
        /// Index of the offending entry.
        index: usize,
    },
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
