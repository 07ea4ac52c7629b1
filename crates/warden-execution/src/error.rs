//! Execution pipeline error types.

use thiserror::Error;

/// Why a single parameter failed schema validation.
#[derive(Debug, Clone, Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

/// The distinct failure classes the orchestrator can report, matching the
/// on-wire JSON-RPC error families.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The tool is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Parameters failed schema validation.
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    /// The caller lacks a permission the tool requires.
    #[error(transparent)]
    Denied(#[from] warden_permission::PermissionError),

    /// The client's resource quota would be exceeded.
    #[error(transparent)]
    QuotaExceeded(#[from] warden_sandbox::SandboxError),

    /// The handler did not complete within its timeout.
    #[error("execution timed out after {0}s")]
    Timeout(u64),

    /// The handler raised an error during execution.
    #[error("execution failed: {0}")]
    Handler(String),

    /// The audit log could not be written.
    #[error(transparent)]
    Audit(#[from] warden_audit::AuditError),
}

/// Result type for execution pipeline operations.
pub type ExecutionResult<T> = Result<T, ExecutionError>;
