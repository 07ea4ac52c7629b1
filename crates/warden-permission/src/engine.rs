//! Per-client authorization engine.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};
use warden_audit::{AuditEntry, AuditEvent, AuditOutcome};
use warden_core::ClientId;
use warden_crypto::ContentHash;

use crate::defaults::default_permissions;
use crate::error::PermissionError;
use crate::permission::Permission;

/// Maximum number of entries the in-process denial/grant ring retains.
/// Older entries are dropped once the ring is full; the durable audit log
/// (appended by the orchestrator and server assembly) is the record of
/// truth, this ring only covers process-local introspection.
const AUDIT_RING_CAPACITY: usize = 1024;

/// Tracks each client's granted permissions and answers authorization checks.
///
/// Absence of a matching grant is always a denial (deny-by-default); there is
/// no notion of an explicit negative grant.
#[derive(Debug, Default)]
pub struct AuthorizationEngine {
    grants: HashMap<ClientId, Vec<Permission>>,
    audit_ring: VecDeque<AuditEntry>,
}

impl AuthorizationEngine {
    /// Create an engine with no clients registered yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client, installing `initial` permissions or the
    /// conservative default set when `initial` is `None`.
    ///
    /// Calling this again for an already-known client replaces its grants.
    pub fn initialize(&mut self, client: ClientId, initial: Option<Vec<Permission>>) {
        let perms = initial.unwrap_or_else(default_permissions);
        debug!(client = %client, count = perms.len(), "initializing client permissions");
        self.grants.insert(client, perms);
    }

    /// Add a permission grant for `client`, initializing it with defaults
    /// first if unseen, and record a [`AuditEvent::PermissionGranted`] entry
    /// in the audit ring.
    pub fn grant(&mut self, client: &ClientId, permission: Permission) {
        self.grants
            .entry(client.clone())
            .or_insert_with(default_permissions)
            .push(permission.clone());
        self.record(
            client,
            AuditEvent::PermissionGranted {
                permission: format!("{permission:?}"),
            },
            AuditOutcome::success(),
        );
    }

    /// Remove every grant matching `permission` exactly for `client`, and
    /// record a [`AuditEvent::PermissionRevoked`] entry in the audit ring.
    pub fn revoke(&mut self, client: &ClientId, permission: &Permission) {
        if let Some(perms) = self.grants.get_mut(client) {
            perms.retain(|p| p != permission);
        }
        self.record(
            client,
            AuditEvent::PermissionRevoked {
                permission: format!("{permission:?}"),
            },
            AuditOutcome::success(),
        );
    }

    /// Whether `client` holds a grant covering `required`.
    #[must_use]
    pub fn has(&self, client: &ClientId, required: &Permission) -> bool {
        self.grants
            .get(client)
            .is_some_and(|perms| perms.iter().any(|p| p.matches(required)))
    }

    /// `has`, but returning a [`PermissionError::Denied`] instead of `false`,
    /// and recording a [`AuditEvent::PermissionDenied`] entry in the audit
    /// ring on the miss.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::Denied`] when no grant covers `required`.
    pub fn check(
        &mut self,
        client: &ClientId,
        required: &Permission,
    ) -> Result<(), PermissionError> {
        if self.has(client, required) {
            Ok(())
        } else {
            warn!(client = %client, permission = ?required, "permission denied");
            self.record(
                client,
                AuditEvent::PermissionDenied {
                    permission: format!("{required:?}"),
                },
                AuditOutcome::failure("no grant covers the required permission"),
            );
            Err(PermissionError::Denied {
                client: client.clone(),
                permission: required.clone(),
            })
        }
    }

    /// List the permissions currently granted to `client`.
    #[must_use]
    pub fn list(&self, client: &ClientId) -> Vec<Permission> {
        self.grants.get(client).cloned().unwrap_or_default()
    }

    /// The in-process grant/revoke/denial trail, oldest first, capped at
    /// [`AUDIT_RING_CAPACITY`] entries.
    #[must_use]
    pub fn audit_trail(&self) -> &VecDeque<AuditEntry> {
        &self.audit_ring
    }

    fn record(&mut self, client: &ClientId, event: AuditEvent, outcome: AuditOutcome) {
        let previous_hash = self
            .audit_ring
            .back()
            .map(AuditEntry::content_hash)
            .unwrap_or_else(ContentHash::zero);
        self.audit_ring
            .push_back(AuditEntry::new(client.clone(), event, outcome, previous_hash));
        if self.audit_ring.len() > AUDIT_RING_CAPACITY {
            self.audit_ring.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{PermissionType, Resource};

    #[test]
    fn unregistered_client_is_denied_everything() {
        let engine = AuthorizationEngine::new();
        let client = ClientId::new("ghost");
        let required = Permission::wildcard(PermissionType::FileRead);
        assert!(!engine.has(&client, &required));
    }

    #[test]
    fn initialize_with_none_installs_defaults() {
        let mut engine = AuthorizationEngine::new();
        let client = ClientId::new("alice");
        engine.initialize(client.clone(), None);
        let required = Permission::new(PermissionType::FileRead, Resource::path("/app/data/a.txt"));
        assert!(engine.has(&client, &required));
    }

    #[test]
    fn grant_then_revoke_removes_access() {
        let mut engine = AuthorizationEngine::new();
        let client = ClientId::new("alice");
        engine.initialize(client.clone(), Some(vec![]));
        let perm = Permission::new(PermissionType::FileWrite, Resource::path("/app/output/*"));
        engine.grant(&client, perm.clone());
        assert!(engine.has(&client, &perm));

        engine.revoke(&client, &perm);
        assert!(!engine.has(&client, &perm));
    }

    #[test]
    fn check_returns_denied_error_on_miss() {
        let mut engine = AuthorizationEngine::new();
        let client = ClientId::new("alice");
        engine.initialize(client.clone(), Some(vec![]));
        let required = Permission::wildcard(PermissionType::CodeExecutionSudo);
        let err = engine.check(&client, &required).unwrap_err();
        assert!(matches!(err, PermissionError::Denied { .. }));
    }

    #[test]
    fn grant_revoke_and_denial_each_append_to_the_audit_ring() {
        let mut engine = AuthorizationEngine::new();
        let client = ClientId::new("alice");
        engine.initialize(client.clone(), Some(vec![]));
        let perm = Permission::new(PermissionType::FileWrite, Resource::path("/app/output/*"));

        engine.grant(&client, perm.clone());
        engine.revoke(&client, &perm);
        let _ = engine.check(&client, &perm);

        let trail: Vec<_> = engine.audit_trail().iter().collect();
        assert_eq!(trail.len(), 3);
        assert!(matches!(trail[0].event, AuditEvent::PermissionGranted { .. }));
        assert!(matches!(trail[1].event, AuditEvent::PermissionRevoked { .. }));
        assert!(matches!(trail[2].event, AuditEvent::PermissionDenied { .. }));
        assert!(trail[1].follows(trail[0]));
        assert!(trail[2].follows(trail[1]));
    }

    #[test]
    fn audit_ring_drops_oldest_entries_past_capacity() {
        let mut engine = AuthorizationEngine::new();
        let client = ClientId::new("alice");
        engine.initialize(client.clone(), Some(vec![]));
        let perm = Permission::wildcard(PermissionType::FileRead);

        for _ in 0..(AUDIT_RING_CAPACITY + 5) {
            engine.grant(&client, perm.clone());
        }

        assert_eq!(engine.audit_trail().len(), AUDIT_RING_CAPACITY);
    }
}
