//! Per-client resource quota accounting.

use std::collections::HashMap;

use tracing::warn;
use warden_core::ClientId;

use crate::error::SandboxError;

/// A client's configured ceilings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    /// CPU percentage ceiling (0-100, may exceed 100 on multi-core allowances).
    pub cpu_percent: u32,
    /// Memory ceiling in megabytes.
    pub memory_mb: u64,
    /// Disk ceiling in gigabytes.
    pub disk_gb: u64,
    /// Maximum concurrent processes.
    pub max_processes: u32,
}

impl Default for Quota {
    fn default() -> Self {
        Self {
            cpu_percent: 50,
            memory_mb: 512,
            disk_gb: 1,
            max_processes: 5,
        }
    }
}

/// A request to allocate resources, checked against the remaining quota.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceRequirement {
    /// Memory requested, in megabytes.
    pub memory_mb: u64,
    /// Whether this requirement represents spawning one additional process.
    pub processes: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Usage {
    memory_mb: u64,
    processes: u32,
    violations: u64,
}

/// Tracks live resource usage per client and enforces their quota.
#[derive(Default)]
pub struct QuotaManager {
    quotas: HashMap<ClientId, Quota>,
    usage: HashMap<ClientId, Usage>,
}

impl QuotaManager {
    /// Create a manager with no clients registered yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or replace) the quota for `client`.
    pub fn set_quota(&mut self, client: ClientId, quota: Quota) {
        self.quotas.insert(client, quota);
    }

    /// The quota currently in effect for `client` (the default if unset).
    #[must_use]
    pub fn quota_for(&self, client: &ClientId) -> Quota {
        self.quotas.get(client).copied().unwrap_or_default()
    }

    /// Whether `requirement` can be granted to `client` right now.
    ///
    /// `override_flag` (granted via the `QuotaOverride` permission) bypasses
    /// the check unconditionally.
    #[must_use]
    pub fn check(
        &mut self,
        client: &ClientId,
        requirement: ResourceRequirement,
        override_flag: bool,
    ) -> Result<(), SandboxError> {
        if override_flag {
            return Ok(());
        }

        let quota = self.quota_for(client);
        let usage = self.usage.entry(client.clone()).or_default();

        if usage.memory_mb + requirement.memory_mb > quota.memory_mb {
            usage.violations += 1;
            warn!(client = %client, "memory quota would be exceeded");
            return Err(SandboxError::QuotaExceeded {
                client: client.clone(),
                reason: "memory".to_string(),
            });
        }
        if usage.processes + requirement.processes > quota.max_processes {
            usage.violations += 1;
            warn!(client = %client, "process quota would be exceeded");
            return Err(SandboxError::QuotaExceeded {
                client: client.clone(),
                reason: "processes".to_string(),
            });
        }
        Ok(())
    }

    /// Record that `requirement` has actually been granted to `client`.
    ///
    /// Callers must pair every `allocate` with a later `release` of the same
    /// requirement, on every exit path (success, timeout, or error).
    pub fn allocate(&mut self, client: &ClientId, requirement: ResourceRequirement) {
        let usage = self.usage.entry(client.clone()).or_default();
        usage.memory_mb += requirement.memory_mb;
        usage.processes += requirement.processes;
    }

    /// Release a previously allocated requirement, clamped at zero.
    pub fn release(&mut self, client: &ClientId, requirement: ResourceRequirement) {
        if let Some(usage) = self.usage.get_mut(client) {
            usage.memory_mb = usage.memory_mb.saturating_sub(requirement.memory_mb);
            usage.processes = usage.processes.saturating_sub(requirement.processes);
        }
    }

    /// Number of quota violations recorded for `client` since startup.
    #[must_use]
    pub fn violation_count(&self, client: &ClientId) -> u64 {
        self.usage.get(client).map_or(0, |u| u.violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_release_returns_usage_to_zero() {
        let mut mgr = QuotaManager::new();
        let client = ClientId::new("alice");
        let req = ResourceRequirement {
            memory_mb: 100,
            processes: 1,
        };
        mgr.check(&client, req, false).unwrap();
        mgr.allocate(&client, req);
        mgr.release(&client, req);
        assert_eq!(mgr.usage.get(&client).unwrap().memory_mb, 0);
        assert_eq!(mgr.usage.get(&client).unwrap().processes, 0);
    }

    #[test]
    fn over_quota_request_is_denied() {
        let mut mgr = QuotaManager::new();
        let client = ClientId::new("alice");
        mgr.set_quota(
            client.clone(),
            Quota {
                cpu_percent: 50,
                memory_mb: 100,
                disk_gb: 1,
                max_processes: 5,
            },
        );
        let req = ResourceRequirement {
            memory_mb: 200,
            processes: 0,
        };
        let err = mgr.check(&client, req, false).unwrap_err();
        assert!(matches!(err, SandboxError::QuotaExceeded { .. }));
    }

    #[test]
    fn override_flag_bypasses_quota() {
        let mut mgr = QuotaManager::new();
        let client = ClientId::new("alice");
        let req = ResourceRequirement {
            memory_mb: 100_000,
            processes: 0,
        };
        assert!(mgr.check(&client, req, true).is_ok());
    }

    #[test]
    fn release_never_goes_negative() {
        let mut mgr = QuotaManager::new();
        let client = ClientId::new("alice");
        mgr.release(
            &client,
            ResourceRequirement {
                memory_mb: 10,
                processes: 1,
            },
        );
        assert_eq!(mgr.usage.get(&client).unwrap_or(&Usage::default()).memory_mb, 0);
    }
}
