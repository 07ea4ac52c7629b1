//! Tool descriptors and the registry clients list and call into.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warden_core::ClientId;
use warden_permission::Permission;
use warden_sandbox::ResourceRequirement;

use crate::schema::ToolSchema;

/// Per-call context handed to a tool handler.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// The calling client.
    pub client_id: ClientId,
}

/// Errors a handler may raise; anything else escaping `call` is treated the
/// same way as [`HandlerError::Other`] by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// The handler failed for a domain-specific reason.
    #[error("{0}")]
    Other(String),
}

/// Implemented by every tool's executable body.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool with validated `params`, returning a JSON result.
    async fn call(&self, ctx: &ToolContext, params: Value) -> Result<Value, HandlerError>;
}

/// An immutable tool descriptor, registered once at startup.
pub struct Tool {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description, surfaced via `tools/list`.
    pub description: String,
    /// Schema validated against incoming `arguments`.
    pub input_schema: ToolSchema,
    /// Schema describing the shape of a successful result (informational only).
    pub output_schema: ToolSchema,
    /// Permissions the caller must hold for every call.
    pub permissions: Vec<Permission>,
    /// Per-call timeout; falls back to the orchestrator's default if `None`.
    pub timeout_secs: Option<u64>,
    /// Resources to reserve against the caller's quota while this tool runs.
    pub resource_requirement: ResourceRequirement,
    /// The executable body.
    pub handler: Arc<dyn ToolHandler>,
}

impl Tool {
    /// The effective timeout for this tool, given the orchestrator's default.
    #[must_use]
    pub fn timeout_secs_or(&self, default_secs: u64) -> u64 {
        self.timeout_secs.unwrap_or(default_secs)
    }
}

/// Holds every registered tool, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Returns `false` without registering if the name is
    /// already taken.
    pub fn register(&mut self, tool: Tool) -> bool {
        if self.tools.contains_key(&tool.name) {
            return false;
        }
        self.tools.insert(tool.name.clone(), Arc::new(tool));
        true
    }

    /// Fetch a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Tool>> {
        self.tools.get(name).cloned()
    }

    /// List every registered tool's descriptor, for `tools/list`.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<Tool>> {
        self.tools.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ToolHandler for Echo {
        async fn call(&self, _ctx: &ToolContext, params: Value) -> Result<Value, HandlerError> {
            Ok(params)
        }
    }

    fn sample_tool() -> Tool {
        Tool {
            name: "echo".to_string(),
            description: "echoes its input".to_string(),
            input_schema: ToolSchema::empty(),
            output_schema: ToolSchema::empty(),
            permissions: vec![],
            timeout_secs: None,
            resource_requirement: ResourceRequirement::default(),
            handler: Arc::new(Echo),
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(sample_tool()));
        assert!(!registry.register(sample_tool()));
    }

    #[test]
    fn list_returns_registered_tools() {
        let mut registry = ToolRegistry::new();
        registry.register(sample_tool());
        assert_eq!(registry.list().len(), 1);
    }
}
