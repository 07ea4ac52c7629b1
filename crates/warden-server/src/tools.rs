//! A minimal reference tool registered by the default binary so a freshly
//! bootstrapped server has something to call. Real deployments build their
//! own [`warden_execution::ToolRegistry`] and pass it to
//! [`crate::WardenServer::bootstrap`] instead.

use async_trait::async_trait;
use serde_json::Value;
use warden_execution::{HandlerError, Tool, ToolContext, ToolHandler, ToolRegistry, ToolSchema};
use warden_permission::{Permission, PermissionType};
use warden_sandbox::ResourceRequirement;

struct Echo;

#[async_trait]
impl ToolHandler for Echo {
    async fn call(&self, _ctx: &ToolContext, params: Value) -> Result<Value, HandlerError> {
        Ok(params)
    }
}

/// A tool registry containing only `echo`, which returns its `arguments`
/// unchanged. Requires the caller to hold `code_execution`.
#[must_use]
pub fn default_tools() -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(Tool {
        name: "echo".to_string(),
        description: "Returns its arguments unchanged.".to_string(),
        input_schema: ToolSchema::empty(),
        output_schema: ToolSchema::empty(),
        permissions: vec![Permission::wildcard(PermissionType::CodeExecution)],
        timeout_secs: None,
        resource_requirement: ResourceRequirement::default(),
        handler: std::sync::Arc::new(Echo),
    });
    tools
}
