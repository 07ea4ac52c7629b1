//! Built-in method handlers: `initialize`, `shutdown`, `tools/list`,
//! `tools/call`, `auth/token`, `auth/refresh`, `auth/revoke`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use warden_audit::{AuditEvent, AuditOutcome};
use warden_core::{ClientId, TokenId};
use warden_identity::{TokenKind, TokenSlot};
use warden_protocol::{MethodHandler, ProtocolError};

use crate::assembly::WardenServer;
use crate::error::{execution_error_to_protocol, identity_error_to_protocol};

fn params_of<T: for<'de> Deserialize<'de>>(params: Option<Value>) -> Result<T, ProtocolError> {
    let value = params.unwrap_or(Value::Null);
    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidParams(e.to_string()))
}

/// Resolve the calling client from a presented access token: verified by
/// the minter and found, non-revoked, in the token registry.
async fn client_from_access_token(
    server: &WardenServer,
    access_token: &str,
) -> Result<ClientId, ProtocolError> {
    let claims = server
        .minter
        .verify(access_token, TokenKind::Access)
        .map_err(identity_error_to_protocol)?;
    let jti = TokenId(
        uuid::Uuid::parse_str(&claims.jti)
            .map_err(|e| ProtocolError::AuthenticationFailed(format!("malformed jti: {e}")))?,
    );
    server
        .tokens
        .validate(&jti, access_token, TokenSlot::Access)
        .await
        .map_err(identity_error_to_protocol)?;
    Ok(ClientId::new(claims.sub))
}

/// `initialize` — the only method a fresh connection may call.
pub struct Initialize {
    server: Arc<WardenServer>,
}

impl Initialize {
    #[must_use]
    pub fn new(server: Arc<WardenServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl MethodHandler for Initialize {
    async fn handle(&self, _params: Option<Value>) -> Result<Value, ProtocolError> {
        let tool_count = self.server.orchestrator.list_tools().len();
        Ok(json!({
            "protocolVersion": "2024-11",
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": { "name": "warden", "version": env!("CARGO_PKG_VERSION") },
            "toolCount": tool_count,
        }))
    }
}

/// `shutdown` — the state machine moves the connection back to `fresh`
/// around this handler; the handler itself only produces the reply.
pub struct Shutdown;

#[async_trait]
impl MethodHandler for Shutdown {
    async fn handle(&self, _params: Option<Value>) -> Result<Value, ProtocolError> {
        Ok(json!({ "status": "ok" }))
    }
}

/// `tools/list {access_token}`.
pub struct ToolsList {
    server: Arc<WardenServer>,
}

impl ToolsList {
    #[must_use]
    pub fn new(server: Arc<WardenServer>) -> Self {
        Self { server }
    }
}

#[derive(Deserialize)]
struct ToolsListParams {
    access_token: String,
}

#[async_trait]
impl MethodHandler for ToolsList {
    async fn handle(&self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let params: ToolsListParams = params_of(params)?;
        client_from_access_token(&self.server, &params.access_token).await?;

        let tools: Vec<Value> = self
            .server
            .orchestrator
            .list_tools()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema,
                    "outputSchema": tool.output_schema,
                    "permissions": tool.permissions,
                })
            })
            .collect();
        Ok(json!({ "tools": tools }))
    }
}

/// `tools/call {name, arguments, access_token}`.
pub struct ToolsCall {
    server: Arc<WardenServer>,
}

impl ToolsCall {
    #[must_use]
    pub fn new(server: Arc<WardenServer>) -> Self {
        Self { server }
    }
}

#[derive(Deserialize)]
struct ToolsCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
    access_token: String,
}

#[async_trait]
impl MethodHandler for ToolsCall {
    async fn handle(&self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let params: ToolsCallParams = params_of(params)?;
        let client_id = client_from_access_token(&self.server, &params.access_token).await?;

        let result = self
            .server
            .orchestrator
            .call(&client_id, &params.name, params.arguments)
            .await
            .map_err(execution_error_to_protocol)?;

        if result.success {
            let text = result
                .result
                .map(|v| v.to_string())
                .unwrap_or_default();
            Ok(json!({
                "content": [{ "type": "text", "text": text }],
                "isError": false,
            }))
        } else {
            let text = result.error.unwrap_or_default();
            Ok(json!({
                "content": [{ "type": "text", "text": text }],
                "isError": true,
            }))
        }
    }
}

/// `auth/token {username, password}`.
pub struct AuthToken {
    server: Arc<WardenServer>,
}

impl AuthToken {
    #[must_use]
    pub fn new(server: Arc<WardenServer>) -> Self {
        Self { server }
    }
}

#[derive(Deserialize)]
struct AuthTokenParams {
    username: String,
    password: String,
}

#[async_trait]
impl MethodHandler for AuthToken {
    async fn handle(&self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let params: AuthTokenParams = params_of(params)?;

        let record = match self
            .server
            .credentials
            .authenticate(&params.username, &params.password)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                let _ = self
                    .server
                    .orchestrator
                    .audit()
                    .append(
                        ClientId::new(params.username.clone()),
                        AuditEvent::AuthFailed { username: params.username.clone() },
                        AuditOutcome::failure(e.to_string()),
                    )
                    .await;
                return Err(identity_error_to_protocol(e));
            }
        };

        let pair = self
            .server
            .minter
            .mint_pair(&record)
            .map_err(identity_error_to_protocol)?;
        self.server
            .tokens
            .record(&pair, &record.id, &record.username)
            .await
            .map_err(identity_error_to_protocol)?;

        let client_id = ClientId::new(record.id.clone());
        self.server
            .orchestrator
            .initialize_client(client_id.clone(), None)
            .await;
        self.server
            .orchestrator
            .audit()
            .append(
                client_id,
                AuditEvent::AuthSuccess { username: record.username.clone() },
                AuditOutcome::success(),
            )
            .await
            .map_err(|e| ProtocolError::Internal(e.to_string()))?;

        Ok(json!({
            "access_token": pair.access_token,
            "refresh_token": pair.refresh_token,
            "token_type": "Bearer",
            "expires_in": self.server.access_ttl_secs,
        }))
    }
}

/// `auth/refresh {refresh_token}`.
pub struct AuthRefresh {
    server: Arc<WardenServer>,
}

impl AuthRefresh {
    #[must_use]
    pub fn new(server: Arc<WardenServer>) -> Self {
        Self { server }
    }
}

#[derive(Deserialize)]
struct AuthRefreshParams {
    refresh_token: String,
}

#[async_trait]
impl MethodHandler for AuthRefresh {
    async fn handle(&self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let params: AuthRefreshParams = params_of(params)?;

        let claims = self
            .server
            .minter
            .verify(&params.refresh_token, TokenKind::Refresh)
            .map_err(identity_error_to_protocol)?;
        let jti = TokenId(
            uuid::Uuid::parse_str(&claims.jti)
                .map_err(|e| ProtocolError::AuthenticationFailed(format!("malformed jti: {e}")))?,
        );
        self.server
            .tokens
            .validate(&jti, &params.refresh_token, TokenSlot::Refresh)
            .await
            .map_err(identity_error_to_protocol)?;

        let (new_jti, access_token, _new_claims) = self
            .server
            .minter
            .mint_access_only(&claims.sub, &claims.username, claims.roles.clone())
            .map_err(identity_error_to_protocol)?;

        self.server
            .orchestrator
            .audit()
            .append(
                ClientId::new(claims.sub.clone()),
                AuditEvent::AuthTokenRefresh { jti: new_jti.to_string() },
                AuditOutcome::success(),
            )
            .await
            .map_err(|e| ProtocolError::Internal(e.to_string()))?;

        Ok(json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": self.server.access_ttl_secs,
        }))
    }
}

/// `auth/revoke {jti}`.
pub struct AuthRevoke {
    server: Arc<WardenServer>,
}

impl AuthRevoke {
    #[must_use]
    pub fn new(server: Arc<WardenServer>) -> Self {
        Self { server }
    }
}

#[derive(Deserialize)]
struct AuthRevokeParams {
    access_token: String,
    jti: String,
}

#[async_trait]
impl MethodHandler for AuthRevoke {
    async fn handle(&self, params: Option<Value>) -> Result<Value, ProtocolError> {
        let params: AuthRevokeParams = params_of(params)?;
        let caller = client_from_access_token(&self.server, &params.access_token).await?;
        let jti = TokenId(
            uuid::Uuid::parse_str(&params.jti)
                .map_err(|e| ProtocolError::InvalidParams(format!("malformed jti: {e}")))?,
        );

        let record = self
            .server
            .tokens
            .get_by_jti(&jti)
            .await
            .map_err(identity_error_to_protocol)?
            .ok_or_else(|| ProtocolError::ResourceNotFound(format!("no such jti: {}", params.jti)))?;

        if record.owner_id != caller.as_str() {
            return Err(ProtocolError::AuthenticationFailed(
                "jti does not belong to the calling client".to_string(),
            ));
        }

        self.server
            .tokens
            .revoke(&jti)
            .await
            .map_err(identity_error_to_protocol)?;

        self.server
            .orchestrator
            .audit()
            .append(
                ClientId::new(record.owner_id),
                AuditEvent::AuthTokenRevoked { jti: params.jti },
                AuditOutcome::success(),
            )
            .await
            .map_err(|e| ProtocolError::Internal(e.to_string()))?;

        Ok(json!({ "status": "revoked" }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_config::Config;
    use warden_execution::ToolRegistry;

    async fn server(dir: &std::path::Path) -> Arc<WardenServer> {
        let mut config = Config::default();
        config.server.data_dir = dir.to_path_buf();
        config.auth.signing_secret = "a signing secret of at least 32 bytes!!".to_string();
        WardenServer::bootstrap(&config, ToolRegistry::new()).unwrap()
    }

    async fn register_and_login(server: &Arc<WardenServer>, username: &str) -> (String, String) {
        server
            .credentials
            .create(username, "hunter2", None, None, None)
            .await
            .unwrap();
        let reply = AuthToken::new(Arc::clone(server))
            .handle(Some(json!({ "username": username, "password": "hunter2" })))
            .await
            .unwrap();
        (
            reply["access_token"].as_str().unwrap().to_string(),
            reply["refresh_token"].as_str().unwrap().to_string(),
        )
    }

    #[tokio::test]
    async fn revoke_requires_the_caller_to_own_the_jti() {
        let dir = tempfile::tempdir().unwrap();
        let srv = server(dir.path()).await;
        let (alice_access, alice_refresh) = register_and_login(&srv, "alice").await;
        let (bob_access, _bob_refresh) = register_and_login(&srv, "bob").await;

        let alice_claims = srv
            .minter
            .verify(&alice_refresh, TokenKind::Refresh)
            .unwrap();

        let err = AuthRevoke::new(Arc::clone(&srv))
            .handle(Some(json!({
                "access_token": bob_access,
                "jti": alice_claims.jti,
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, ProtocolError::AuthenticationFailed(_)));

        AuthRevoke::new(Arc::clone(&srv))
            .handle(Some(json!({
                "access_token": alice_access,
                "jti": alice_claims.jti,
            })))
            .await
            .unwrap();
    }
}
