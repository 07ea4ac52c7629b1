//! Wires every subsystem together into one running server: credential and
//! token stores, the execution orchestrator and its collaborators, the
//! built-in method table, and the configured transport.

use std::path::PathBuf;
use std::sync::Arc;

use warden_config::{Config, TransportKind};
use warden_execution::{ExecutionOrchestrator, ToolRegistry};
use warden_identity::{CredentialRegistry, TokenMinter, TokenRegistry};
use warden_permission::AuthorizationEngine;
use warden_protocol::MethodTable;
use warden_sandbox::{JailManager, QuotaManager};

use crate::error::ServerError;
use crate::methods;

/// The assembled server: every collaborator the built-in methods need,
/// plus the access/refresh token lifetimes used to compute `expires_in`.
pub struct WardenServer {
    pub(crate) credentials: CredentialRegistry,
    pub(crate) tokens: TokenRegistry,
    pub(crate) minter: TokenMinter,
    pub(crate) orchestrator: ExecutionOrchestrator,
    pub(crate) access_ttl_secs: i64,
}

impl WardenServer {
    /// Prepare the data directory and construct every subsystem from
    /// `config`, registering `tools` with the orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::DataDir`] if the data directory cannot be
    /// created.
    pub fn bootstrap(config: &Config, tools: ToolRegistry) -> Result<Arc<Self>, ServerError> {
        let data_dir = &config.server.data_dir;
        std::fs::create_dir_all(data_dir)?;

        let credentials = CredentialRegistry::new(data_dir.join("clients.json"));
        let tokens = TokenRegistry::new(data_dir.join("tokens.json"));

        let access_ttl_secs = i64::try_from(config.auth.access_token_minutes * 60).unwrap_or(i64::MAX);
        let refresh_ttl_secs =
            i64::try_from(config.auth.refresh_token_days * 24 * 60 * 60).unwrap_or(i64::MAX);
        let minter = TokenMinter::with_ttls(
            config.auth.signing_secret.clone().into_bytes(),
            access_ttl_secs,
            refresh_ttl_secs,
        )
        .map_err(ServerError::Minter)?;

        let permissions = AuthorizationEngine::new();
        let quotas = QuotaManager::new();
        let jail = JailManager::new(data_dir.join("clients"));
        let audit = warden_audit::AuditLog::new(data_dir.join("audit.json"));
        let executor = warden_execution::SubprocessExecutor::new(worker_binary_path());

        let orchestrator = ExecutionOrchestrator::new(
            tools,
            permissions,
            quotas,
            jail,
            audit,
            executor,
            config.execution.default_timeout_secs,
        );

        Ok(Arc::new(Self {
            credentials,
            tokens,
            minter,
            orchestrator,
            access_ttl_secs,
        }))
    }

    /// Build the method table every transport dispatches against,
    /// registering the seven built-in methods.
    #[must_use]
    pub fn method_table(self: &Arc<Self>) -> Arc<MethodTable> {
        let mut table = MethodTable::new();
        table.register("initialize", Arc::new(methods::Initialize::new(Arc::clone(self))));
        table.register("shutdown", Arc::new(methods::Shutdown));
        table.register("tools/list", Arc::new(methods::ToolsList::new(Arc::clone(self))));
        table.register("tools/call", Arc::new(methods::ToolsCall::new(Arc::clone(self))));
        table.register("auth/token", Arc::new(methods::AuthToken::new(Arc::clone(self))));
        table.register("auth/refresh", Arc::new(methods::AuthRefresh::new(Arc::clone(self))));
        table.register("auth/revoke", Arc::new(methods::AuthRevoke::new(Arc::clone(self))));
        Arc::new(table)
    }

    /// Serve the transport configured in `config` until it stops or errors.
    ///
    /// # Errors
    ///
    /// Returns whatever the selected transport's `serve_*` function returns.
    pub async fn run(self: Arc<Self>, config: &Config) -> Result<(), warden_transport::TransportError> {
        let methods = self.method_table();
        match config.server.transport {
            TransportKind::Stdio => warden_transport::serve_stdio(methods).await,
            TransportKind::Tcp => {
                let bind = config.server.bind.as_deref().unwrap_or("127.0.0.1:7420");
                warden_transport::serve_tcp(bind, methods).await
            }
            TransportKind::Websocket => {
                let bind = config.server.bind.as_deref().unwrap_or("127.0.0.1:7421");
                warden_transport::serve_websocket(bind, "/ws", methods).await
            }
        }
    }
}

/// The worker binary's path, resolved relative to the running server
/// binary's own directory rather than hardcoded, so it works the same
/// whether installed or run from a build directory.
fn worker_binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("warden-server"));
    path.set_file_name("warden-execution-worker");
    path
}
