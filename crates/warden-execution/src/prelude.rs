//! Convenience re-exports for crates consuming `warden-execution`.

pub use crate::error::{ExecutionError, ExecutionResult, FieldError};
pub use crate::executor::{SubprocessExecutor, SubprocessOutcome};
pub use crate::orchestrator::{CallResult, ExecutionOrchestrator, ExecutionStats};
pub use crate::schema::{validate_params, PrimitiveType, PropertySchema, ToolSchema};
pub use crate::tool::{HandlerError, Tool, ToolContext, ToolHandler, ToolRegistry};
