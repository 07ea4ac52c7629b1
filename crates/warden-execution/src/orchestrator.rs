//! Ties the registry, authorization, sandbox, and subprocess executor
//! together into the single path every `tools/call` request takes:
//! validate parameters, authorize, reserve quota, run in isolation,
//! release quota, and record the outcome.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{info, warn};
use warden_audit::{AuditEvent, AuditLog, AuditOutcome};
use warden_core::{ClientId, Timestamp};
use warden_permission::{AuthorizationEngine, Permission, PermissionType};
use warden_sandbox::{JailManager, QuotaManager};

use crate::error::{ExecutionError, ExecutionResult};
use crate::executor::{SubprocessExecutor, SubprocessOutcome};
use crate::schema::validate_params;
use crate::tool::{Tool, ToolContext, ToolRegistry};

/// The result of a tool call that actually ran (schema validation,
/// authorization, and quota all cleared).
#[derive(Debug, Clone)]
pub struct CallResult {
    /// Whether the handler reported success.
    pub success: bool,
    /// The handler's returned value, present on success.
    pub result: Option<Value>,
    /// The handler's error message, present on failure.
    pub error: Option<String>,
    /// Wall-clock time the call took, in milliseconds.
    pub execution_time_ms: u64,
}

/// Aggregate counters across every call the orchestrator has handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionStats {
    /// Total calls attempted, regardless of outcome.
    pub total_calls: u64,
    /// Calls whose handler reported success.
    pub successful_calls: u64,
    /// Calls that failed for any reason (validation, denial, quota, timeout, handler error).
    pub failed_calls: u64,
    /// Sum of execution time across every call that actually ran a handler.
    pub total_execution_time_ms: u64,
}

impl ExecutionStats {
    /// Mean execution time in milliseconds across calls that ran a handler.
    /// Zero if none have run yet.
    #[must_use]
    pub fn average_execution_time_ms(&self) -> u64 {
        let ran = self.successful_calls + self.failed_calls;
        if ran == 0 {
            0
        } else {
            self.total_execution_time_ms / ran
        }
    }
}

/// Drives a single `tools/call` request from validation through to an
/// audited, resource-bounded result.
pub struct ExecutionOrchestrator {
    tools: ToolRegistry,
    permissions: Mutex<AuthorizationEngine>,
    quotas: Mutex<QuotaManager>,
    jail: JailManager,
    audit: AuditLog,
    executor: SubprocessExecutor,
    default_timeout_secs: u64,
    stats: Mutex<ExecutionStats>,
}

impl ExecutionOrchestrator {
    /// Assemble an orchestrator from its already-constructed collaborators.
    #[must_use]
    pub fn new(
        tools: ToolRegistry,
        permissions: AuthorizationEngine,
        quotas: QuotaManager,
        jail: JailManager,
        audit: AuditLog,
        executor: SubprocessExecutor,
        default_timeout_secs: u64,
    ) -> Self {
        Self {
            tools,
            permissions: Mutex::new(permissions),
            quotas: Mutex::new(quotas),
            jail,
            audit,
            executor,
            default_timeout_secs,
            stats: Mutex::new(ExecutionStats::default()),
        }
    }

    /// The tools available for `tools/list`.
    #[must_use]
    pub fn list_tools(&self) -> Vec<std::sync::Arc<Tool>> {
        self.tools.list()
    }

    /// Register `client` with the authorization engine, installing `initial`
    /// permissions or the conservative defaults when `initial` is `None`.
    /// Called once per client on first successful authentication.
    pub async fn initialize_client(&self, client: ClientId, initial: Option<Vec<Permission>>) {
        self.permissions.lock().await.initialize(client, initial);
    }

    /// The shared audit log this orchestrator appends tool-call outcomes to.
    /// Exposed so the server assembly can append its own events (auth,
    /// permission changes) to the same chain rather than opening a second
    /// writer against the same file.
    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// A snapshot of the aggregate counters recorded so far.
    pub async fn stats(&self) -> ExecutionStats {
        *self.stats.lock().await
    }

    /// Run `tool_name` for `client_id` with `params`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::UnknownTool`] if no such tool is registered,
    /// [`ExecutionError::Validation`] if `params` fails the tool's schema,
    /// [`ExecutionError::Denied`] if `client_id` lacks a required permission,
    /// [`ExecutionError::QuotaExceeded`] if running the tool would exceed
    /// the client's resource quota, or [`ExecutionError::Timeout`] if the
    /// handler did not complete within `tool.timeout`. A handler failure
    /// that *isn't* a timeout is reported inside a successfully returned
    /// [`CallResult`], not as an `Err`.
    pub async fn call(
        &self,
        client_id: &ClientId,
        tool_name: &str,
        params: Value,
    ) -> ExecutionResult<CallResult> {
        let start = Timestamp::now();
        let Some(tool) = self.tools.get(tool_name) else {
            return Err(ExecutionError::UnknownTool(tool_name.to_string()));
        };

        if let Err(errors) = validate_params(&params, &tool.input_schema) {
            self.record(client_id, tool_name, "validation_error", 0).await;
            return Err(ExecutionError::Validation(errors));
        }

        if let Err(e) = self.authorize(client_id, &tool).await {
            self.record(client_id, tool_name, "permission_denied", 0).await;
            return Err(e.into());
        }

        let override_quota = self
            .permissions
            .lock()
            .await
            .has(client_id, &Permission::wildcard(PermissionType::QuotaOverride));

        {
            let mut quotas = self.quotas.lock().await;
            if let Err(e) = quotas.check(client_id, tool.resource_requirement, override_quota) {
                drop(quotas);
                self.audit
                    .append(
                        client_id.clone(),
                        AuditEvent::QuotaViolation {
                            resource: "tool call".to_string(),
                        },
                        AuditOutcome::failure(e.to_string()),
                    )
                    .await
                    .ok();
                self.record(client_id, tool_name, "error", 0).await;
                return Err(e.into());
            }
            quotas.allocate(client_id, tool.resource_requirement);
        }

        let outcome = self.run_handler(client_id, &tool, params, start).await;
        self.quotas
            .lock()
            .await
            .release(client_id, tool.resource_requirement);

        let elapsed = start.elapsed_millis_until(Timestamp::now());
        match outcome {
            Ok(result) => {
                let status = if result.success { "success" } else { "error" };
                self.record(client_id, tool_name, status, elapsed).await;
                Ok(result)
            }
            Err(err @ ExecutionError::Timeout(_)) => {
                self.record(client_id, tool_name, "timeout", elapsed).await;
                Err(err)
            }
            Err(err) => {
                self.record(client_id, tool_name, "error", elapsed).await;
                Err(err)
            }
        }
    }

    async fn authorize(
        &self,
        client_id: &ClientId,
        tool: &Tool,
    ) -> Result<(), warden_permission::PermissionError> {
        let mut permissions = self.permissions.lock().await;
        for required in &tool.permissions {
            permissions.check(client_id, required)?;
        }
        Ok(())
    }

    /// Run `tool`'s handler under its timeout.
    ///
    /// Returns `Ok(CallResult{success:false, ..})` for a handler-raised
    /// error, but `Err(ExecutionError::Timeout)` when the deadline elapses —
    /// the two are distinct failure classes on the wire (§7) and in the
    /// audit log (`"error"` vs `"timeout"`).
    async fn run_handler(
        &self,
        client_id: &ClientId,
        tool: &Tool,
        params: Value,
        start: Timestamp,
    ) -> Result<CallResult, ExecutionError> {
        let ctx = ToolContext {
            client_id: client_id.clone(),
        };
        let timeout = Duration::from_secs(tool.timeout_secs_or(self.default_timeout_secs));

        let handler_future = tool.handler.call(&ctx, params);
        match tokio::time::timeout(timeout, handler_future).await {
            Ok(Ok(result)) => Ok(CallResult {
                success: true,
                result: Some(result),
                error: None,
                execution_time_ms: start.elapsed_millis_until(Timestamp::now()),
            }),
            Ok(Err(e)) => Ok(CallResult {
                success: false,
                result: None,
                error: Some(e.to_string()),
                execution_time_ms: start.elapsed_millis_until(Timestamp::now()),
            }),
            Err(_) => {
                warn!(tool = %tool.name, client = %client_id, "tool call timed out");
                Err(ExecutionError::Timeout(timeout.as_secs()))
            }
        }
    }

    async fn record(&self, client_id: &ClientId, tool_name: &str, status: &str, elapsed_ms: u64) {
        let mut stats = self.stats.lock().await;
        stats.total_calls += 1;
        if status == "success" {
            stats.successful_calls += 1;
        } else {
            stats.failed_calls += 1;
        }
        stats.total_execution_time_ms += elapsed_ms;
        drop(stats);

        let outcome = if status == "success" {
            AuditOutcome::success()
        } else {
            AuditOutcome::failure(status.to_string())
        };
        if let Err(e) = self
            .audit
            .append(
                client_id.clone(),
                AuditEvent::ToolExecuted {
                    tool_name: tool_name.to_string(),
                    status: status.to_string(),
                    execution_time_ms: elapsed_ms,
                },
                outcome,
            )
            .await
        {
            warn!(error = %e, "failed to append audit entry for tool call");
        }
    }

    /// Resolve a jail-relative path for `client_id`, or for `owner_id` when
    /// `client_id` holds a matching cross-client permission. Records a
    /// [`AuditEvent::CrossClientAccess`] entry whenever the latter happens.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::QuotaExceeded`] (carrying a
    /// [`warden_sandbox::SandboxError::PathEscape`]) if the path would
    /// escape the resolved client's jail, or [`ExecutionError::Denied`] if
    /// cross-client access is requested without a matching grant.
    pub async fn resolve_path(
        &self,
        client_id: &ClientId,
        owner_id: &ClientId,
        relative: &str,
        write: bool,
    ) -> ExecutionResult<std::path::PathBuf> {
        if owner_id != client_id {
            let required = Permission::wildcard(if write {
                PermissionType::CrossClientWrite
            } else {
                PermissionType::CrossClientRead
            });
            self.permissions
                .lock()
                .await
                .check(client_id, &required)?;
            self.audit
                .append(
                    client_id.clone(),
                    AuditEvent::CrossClientAccess {
                        owner: owner_id.clone(),
                        path: relative.to_string(),
                    },
                    AuditOutcome::success(),
                )
                .await?;
            info!(accessor = %client_id, owner = %owner_id, path = relative, "cross-client file access");
        }

        let resolved = self.jail.resolve(owner_id, relative).await?;
        Ok(resolved)
    }

    /// The jail directory a given client's tool invocations should run from.
    #[must_use]
    pub fn cwd_for(&self, client_id: &ClientId) -> std::path::PathBuf {
        self.jail.jail_dir(client_id)
    }

    /// Run arbitrary `code` for `client_id` via the subprocess executor,
    /// bypassing the tool registry. Used by built-in code-execution tools
    /// that have already been authorized by their own [`Tool::permissions`].
    pub async fn run_subprocess(
        &self,
        client_id: &ClientId,
        code: &str,
        context: &std::collections::HashMap<String, Value>,
        timeout_secs: u64,
    ) -> SubprocessOutcome {
        let cwd = self.cwd_for(client_id);
        if let Err(e) = tokio::fs::create_dir_all(&cwd).await {
            return SubprocessOutcome::Failure {
                error: format!("failed to prepare sandbox directory: {e}"),
            };
        }
        self.executor
            .run(
                client_id,
                code,
                context,
                Path::new(&cwd),
                Duration::from_secs(timeout_secs),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use warden_core::ClientId;
    use warden_permission::PermissionType;
    use warden_sandbox::ResourceRequirement;

    struct Echo;

    #[async_trait]
    impl crate::tool::ToolHandler for Echo {
        async fn call(
            &self,
            _ctx: &ToolContext,
            params: Value,
        ) -> Result<Value, crate::tool::HandlerError> {
            Ok(params)
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl crate::tool::ToolHandler for AlwaysFails {
        async fn call(
            &self,
            _ctx: &ToolContext,
            _params: Value,
        ) -> Result<Value, crate::tool::HandlerError> {
            Err(crate::tool::HandlerError::Other("boom".to_string()))
        }
    }

    struct Sleeps;

    #[async_trait]
    impl crate::tool::ToolHandler for Sleeps {
        async fn call(
            &self,
            _ctx: &ToolContext,
            _params: Value,
        ) -> Result<Value, crate::tool::HandlerError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Value::Null)
        }
    }

    fn echo_tool() -> Tool {
        Tool {
            name: "echo".to_string(),
            description: "echoes input".to_string(),
            input_schema: crate::schema::ToolSchema::empty(),
            output_schema: crate::schema::ToolSchema::empty(),
            permissions: vec![Permission::wildcard(PermissionType::CodeExecution)],
            timeout_secs: None,
            resource_requirement: ResourceRequirement::default(),
            handler: std::sync::Arc::new(Echo),
        }
    }

    fn failing_tool() -> Tool {
        Tool {
            name: "fails".to_string(),
            description: "always fails".to_string(),
            input_schema: crate::schema::ToolSchema::empty(),
            output_schema: crate::schema::ToolSchema::empty(),
            permissions: vec![],
            timeout_secs: None,
            resource_requirement: ResourceRequirement::default(),
            handler: std::sync::Arc::new(AlwaysFails),
        }
    }

    fn slow_tool() -> Tool {
        Tool {
            name: "slow".to_string(),
            description: "sleeps longer than its timeout".to_string(),
            input_schema: crate::schema::ToolSchema::empty(),
            output_schema: crate::schema::ToolSchema::empty(),
            permissions: vec![],
            timeout_secs: Some(1),
            resource_requirement: ResourceRequirement::default(),
            handler: std::sync::Arc::new(Sleeps),
        }
    }

    async fn orchestrator(dir: &tempfile::TempDir) -> ExecutionOrchestrator {
        let mut tools = ToolRegistry::new();
        tools.register(echo_tool());
        tools.register(failing_tool());
        tools.register(slow_tool());

        let mut permissions = AuthorizationEngine::new();
        permissions.initialize(
            ClientId::new("alice"),
            Some(vec![Permission::wildcard(PermissionType::CodeExecution)]),
        );

        ExecutionOrchestrator::new(
            tools,
            permissions,
            QuotaManager::new(),
            JailManager::new(dir.path().join("jails")),
            AuditLog::new(dir.path().join("audit.json")),
            SubprocessExecutor::new("/bin/true"),
            30,
        )
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(&dir).await;
        let client = ClientId::new("alice");
        let err = orch
            .call(&client, "nope", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn authorized_call_succeeds_and_updates_stats() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(&dir).await;
        let client = ClientId::new("alice");
        let result = orch
            .call(&client, "echo", serde_json::json!({"x": 1}))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.result.unwrap(), serde_json::json!({"x": 1}));

        let stats = orch.stats().await;
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.successful_calls, 1);
    }

    #[tokio::test]
    async fn unauthorized_client_is_denied() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(&dir).await;
        let mallory = ClientId::new("mallory");
        let err = orch
            .call(&mallory, "echo", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Denied(_)));
    }

    #[tokio::test]
    async fn handler_failure_is_reported_as_unsuccessful_call_result() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(&dir).await;
        let client = ClientId::new("alice");
        let result = orch
            .call(&client, "fails", serde_json::json!({}))
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn slow_handler_reports_timeout_error_and_audits_it() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator(&dir).await;
        let client = ClientId::new("alice");

        let err = orch
            .call(&client, "slow", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout(1)));

        let entries = orch.audit().entries_for_client(&client).await.unwrap();
        let last = entries.last().expect("timeout call was audited");
        match &last.event {
            AuditEvent::ToolExecuted { status, .. } => {
                assert_eq!(status, "timeout");
            }
            other => panic!("expected ToolExecuted, got {other:?}"),
        }
    }
}
