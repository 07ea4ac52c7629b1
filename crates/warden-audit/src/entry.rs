//! Audit entries and the closed set of events they can record.

use serde::{Deserialize, Serialize};
use warden_core::{ClientId, Timestamp};
use warden_crypto::ContentHash;

/// The closed set of externally observable facts the server records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// A client authenticated successfully.
    AuthSuccess {
        /// Username that authenticated.
        username: String,
    },
    /// An authentication attempt failed.
    AuthFailed {
        /// Username that was attempted, if known.
        username: String,
    },
    /// An access token was refreshed from a refresh token.
    AuthTokenRefresh {
        /// The jti of the refresh token used.
        jti: String,
    },
    /// A token was revoked.
    AuthTokenRevoked {
        /// The jti that was revoked.
        jti: String,
    },
    /// A permission was granted to a client.
    PermissionGranted {
        /// Description of the permission granted.
        permission: String,
    },
    /// A permission was revoked from a client.
    PermissionRevoked {
        /// Description of the permission revoked.
        permission: String,
    },
    /// A requested permission was not held.
    PermissionDenied {
        /// Description of the permission that was missing.
        permission: String,
    },
    /// A client was granted access to another client's jailed files.
    CrossClientAccess {
        /// The client whose jail was accessed.
        owner: ClientId,
        /// The relative path accessed.
        path: String,
    },
    /// A tool call completed (any outcome); `status` mirrors the orchestrator's
    /// terminal state for the call.
    ToolExecuted {
        /// Name of the tool invoked.
        tool_name: String,
        /// Terminal status: `"success"`, `"validation_error"`, `"permission_denied"`,
        /// `"timeout"`, or `"error"`.
        status: String,
        /// Wall-clock execution time in milliseconds.
        execution_time_ms: u64,
    },
    /// A client's resource quota would have been exceeded.
    QuotaViolation {
        /// What was requested (e.g. `"memory"`, `"processes"`).
        resource: String,
    },
    /// A client's sandbox state was cleared.
    SandboxCleared,
}

impl AuditEvent {
    /// A short human-readable description, used for operator-facing logs.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            AuditEvent::AuthSuccess { username } => format!("{username} authenticated"),
            AuditEvent::AuthFailed { username } => format!("authentication failed for {username}"),
            AuditEvent::AuthTokenRefresh { jti } => format!("token {jti} refreshed"),
            AuditEvent::AuthTokenRevoked { jti } => format!("token {jti} revoked"),
            AuditEvent::PermissionGranted { permission } => format!("granted {permission}"),
            AuditEvent::PermissionRevoked { permission } => format!("revoked {permission}"),
            AuditEvent::PermissionDenied { permission } => format!("denied {permission}"),
            AuditEvent::CrossClientAccess { owner, path } => {
                format!("cross-client access to {owner}:{path}")
            }
            AuditEvent::ToolExecuted {
                tool_name, status, ..
            } => format!("tool {tool_name} finished: {status}"),
            AuditEvent::QuotaViolation { resource } => format!("quota violation: {resource}"),
            AuditEvent::SandboxCleared => "sandbox cleared".to_string(),
        }
    }
}

/// The terminal result of the event being recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The event completed successfully.
    Success {
        /// Optional extra detail.
        details: Option<String>,
    },
    /// The event failed.
    Failure {
        /// The error message, truncated to a reasonable length for storage.
        error: String,
    },
}

impl AuditOutcome {
    /// A bare success outcome with no detail.
    #[must_use]
    pub fn success() -> Self {
        Self::Success { details: None }
    }

    /// A success outcome carrying `details`, truncated to 500 characters.
    #[must_use]
    pub fn success_with(details: impl Into<String>) -> Self {
        Self::Success {
            details: Some(truncate(&details.into(), 500)),
        }
    }

    /// A failure outcome, with `error` truncated to 500 characters.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: truncate(&error.into(), 500),
        }
    }

    /// Whether this outcome represents success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, AuditOutcome::Success { .. })
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// A single, append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique id of this entry.
    pub id: uuid::Uuid,
    /// When the event occurred.
    pub timestamp: Timestamp,
    /// Client the event pertains to.
    pub client_id: ClientId,
    /// What happened.
    pub event: AuditEvent,
    /// How it concluded.
    pub outcome: AuditOutcome,
    /// Content hash of the previous entry in the chain, or the zero hash for
    /// the first entry.
    pub previous_hash: ContentHash,
}

impl AuditEntry {
    /// Build a new entry chained onto `previous_hash`.
    #[must_use]
    pub fn new(
        client_id: ClientId,
        event: AuditEvent,
        outcome: AuditOutcome,
        previous_hash: ContentHash,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            timestamp: Timestamp::now(),
            client_id,
            event,
            outcome,
            previous_hash,
        }
    }

    /// Bytes that determine this entry's content hash: everything except the
    /// hash itself, so the hash cannot be forged by editing the entry.
    fn signing_data(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(self.id.as_bytes());
        buf.extend_from_slice(self.client_id.as_str().as_bytes());
        buf.extend_from_slice(
            &serde_json::to_vec(&self.event).expect("AuditEvent always serializes"),
        );
        buf.extend_from_slice(
            &serde_json::to_vec(&self.outcome).expect("AuditOutcome always serializes"),
        );
        buf.extend_from_slice(self.previous_hash.as_bytes());
        buf
    }

    /// This entry's content hash, used as the `previous_hash` of the next entry.
    #[must_use]
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::hash(&self.signing_data())
    }

    /// Whether `self` correctly follows `previous` in the chain.
    #[must_use]
    pub fn follows(&self, previous: &AuditEntry) -> bool {
        self.previous_hash == previous.content_hash()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_creation_sets_fields() {
        let entry = AuditEntry::new(
            ClientId::new("alice"),
            AuditEvent::AuthSuccess {
                username: "alice".to_string(),
            },
            AuditOutcome::success(),
            ContentHash::zero(),
        );
        assert_eq!(entry.client_id.as_str(), "alice");
        assert!(entry.outcome.is_success());
    }

    #[test]
    fn chain_linking_detects_correct_and_incorrect_sequences() {
        let genesis = AuditEntry::new(
            ClientId::new("alice"),
            AuditEvent::SandboxCleared,
            AuditOutcome::success(),
            ContentHash::zero(),
        );
        let next = AuditEntry::new(
            ClientId::new("alice"),
            AuditEvent::SandboxCleared,
            AuditOutcome::success(),
            genesis.content_hash(),
        );
        assert!(next.follows(&genesis));

        let forged = AuditEntry::new(
            ClientId::new("alice"),
            AuditEvent::SandboxCleared,
            AuditOutcome::success(),
            ContentHash::zero(),
        );
        assert!(!forged.follows(&genesis));
    }

    #[test]
    fn description_mentions_key_details() {
        let event = AuditEvent::PermissionDenied {
            permission: "FILE_WRITE:/etc/*".to_string(),
        };
        assert!(event.description().contains("FILE_WRITE"));
    }
}
