//! The `Permission` value type and its matching semantics.

use globset::Glob;
use serde::{Deserialize, Serialize};

/// The closed set of capabilities a permission can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionType {
    /// Read a file under a jail-relative path or glob.
    FileRead,
    /// Write (create or overwrite) a file.
    FileWrite,
    /// Delete a file.
    FileDelete,
    /// Write outside the caller's own jail (cross-client write).
    FileWriteGlobal,
    /// Run arbitrary code in the subprocess executor.
    CodeExecution,
    /// Run arbitrary code with elevated, unrestricted privileges.
    CodeExecutionSudo,
    /// Run a named whitelisted system command.
    SystemCommand,
    /// Open an outbound network connection.
    NetworkOutbound,
    /// Accept inbound network connections.
    NetworkListen,
    /// Spawn a new process.
    ProcessSpawn,
    /// Terminate another process.
    ProcessKill,
    /// Read another client's jailed files.
    CrossClientRead,
    /// Write another client's jailed files.
    CrossClientWrite,
    /// Exceed the caller's configured resource quota.
    QuotaOverride,
}

/// The resource scope a permission applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resource {
    /// A glob pattern matched against a file path (`FILE_*` permissions).
    Path(String),
    /// A single whitelisted command name (`SYSTEM_COMMAND`).
    Command(String),
    /// A whitelist of command names (`SYSTEM_COMMAND`).
    CommandList(Vec<String>),
    /// An opaque exact-match resource string for permission types with no
    /// glob/whitelist semantics of their own.
    Exact(String),
}

impl Resource {
    /// Build a path/glob resource.
    #[must_use]
    pub fn path(pattern: impl Into<String>) -> Self {
        Self::Path(pattern.into())
    }

    /// Build a single-command resource.
    #[must_use]
    pub fn command(name: impl Into<String>) -> Self {
        Self::Command(name.into())
    }

    /// Build a command whitelist resource.
    #[must_use]
    pub fn commands(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::CommandList(names.into_iter().map(Into::into).collect())
    }
}

/// A single permission: a capability, optionally scoped to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// The capability this permission grants.
    pub permission_type: PermissionType,
    /// The resource it is scoped to. `None` means unrestricted within the type.
    pub resource: Option<Resource>,
    /// Whether use of this permission is restricted (meaning is type-specific;
    /// for `CodeExecution` it gates import restrictions in the handler).
    pub restricted: bool,
}

impl Permission {
    /// Create a permission with default `restricted = true`.
    #[must_use]
    pub fn new(permission_type: PermissionType, resource: Resource) -> Self {
        Self {
            permission_type,
            resource: Some(resource),
            restricted: true,
        }
    }

    /// Create a wildcard permission (matches any resource of this type).
    #[must_use]
    pub fn wildcard(permission_type: PermissionType) -> Self {
        Self {
            permission_type,
            resource: None,
            restricted: true,
        }
    }

    /// Set the `restricted` flag, returning `self` for chaining.
    #[must_use]
    pub fn with_restricted(mut self, restricted: bool) -> Self {
        self.restricted = restricted;
        self
    }

    /// Whether this permission (as a grant) covers `required` (as a request).
    ///
    /// Matching rules: the type must be identical; a grant with no resource
    /// matches any resource of that type; a grant for a `FILE_*` type matches
    /// `required`'s resource as a glob pattern; a grant for `SystemCommand`
    /// matches a single command or a whitelist; every other type requires
    /// resource equality.
    #[must_use]
    pub fn matches(&self, required: &Permission) -> bool {
        if self.permission_type != required.permission_type {
            return false;
        }

        let Some(granted_resource) = &self.resource else {
            return true;
        };
        let Some(required_resource) = &required.resource else {
            return false;
        };

        match self.permission_type {
            PermissionType::FileRead
            | PermissionType::FileWrite
            | PermissionType::FileDelete
            | PermissionType::FileWriteGlobal => {
                match_path(granted_resource, required_resource)
            }
            PermissionType::SystemCommand => match_command(granted_resource, required_resource),
            _ => granted_resource == required_resource,
        }
    }

    /// Whether this permission type is one the executor treats as
    /// "runs something" (used to decide whether quota checks apply).
    #[must_use]
    pub fn can_execute(&self) -> bool {
        matches!(
            self.permission_type,
            PermissionType::CodeExecution
                | PermissionType::CodeExecutionSudo
                | PermissionType::SystemCommand
                | PermissionType::ProcessSpawn
        )
    }

    /// Whether this permission is restricted, with `CodeExecutionSudo` always
    /// forced to restricted regardless of the stored flag.
    #[must_use]
    pub fn is_restricted(&self) -> bool {
        if self.permission_type == PermissionType::CodeExecutionSudo {
            return true;
        }
        self.restricted
    }
}

fn match_path(granted: &Resource, required: &Resource) -> bool {
    let (Resource::Path(pattern) | Resource::Exact(pattern)) = granted else {
        return false;
    };
    let (Resource::Path(path) | Resource::Exact(path)) = required else {
        return false;
    };
    Glob::new(pattern)
        .map(|g| g.compile_matcher().is_match(path))
        .unwrap_or(false)
}

fn match_command(granted: &Resource, required: &Resource) -> bool {
    let required_name = match required {
        Resource::Command(name) | Resource::Exact(name) => name,
        Resource::CommandList(_) | Resource::Path(_) => return false,
    };
    match granted {
        Resource::Command(name) | Resource::Exact(name) => name == required_name,
        Resource::CommandList(names) => names.iter().any(|n| n == required_name),
        Resource::Path(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_any_resource_of_same_type() {
        let grant = Permission::wildcard(PermissionType::FileRead);
        let required = Permission::new(PermissionType::FileRead, Resource::path("/etc/passwd"));
        assert!(grant.matches(&required));
    }

    #[test]
    fn glob_pattern_matches_file_path() {
        let grant = Permission::new(PermissionType::FileRead, Resource::path("/app/data/*"));
        let required = Permission::new(
            PermissionType::FileRead,
            Resource::path("/app/data/report.csv"),
        );
        assert!(grant.matches(&required));

        let outside = Permission::new(PermissionType::FileRead, Resource::path("/etc/passwd"));
        assert!(!grant.matches(&outside));
    }

    #[test]
    fn type_mismatch_never_matches() {
        let grant = Permission::wildcard(PermissionType::FileRead);
        let required = Permission::wildcard(PermissionType::FileWrite);
        assert!(!grant.matches(&required));
    }

    #[test]
    fn command_whitelist_matches_member() {
        let grant = Permission::new(
            PermissionType::SystemCommand,
            Resource::commands(["ls", "grep"]),
        );
        let allowed = Permission::new(PermissionType::SystemCommand, Resource::command("ls"));
        let denied = Permission::new(PermissionType::SystemCommand, Resource::command("rm"));
        assert!(grant.matches(&allowed));
        assert!(!grant.matches(&denied));
    }

    #[test]
    fn code_execution_sudo_is_always_restricted() {
        let perm = Permission::new(PermissionType::CodeExecutionSudo, Resource::Exact(String::new()))
            .with_restricted(false);
        assert!(perm.is_restricted());
    }

    #[test]
    fn required_resource_none_needs_unrestricted_grant() {
        let grant = Permission::new(PermissionType::FileRead, Resource::path("/app/*"));
        let required = Permission::wildcard(PermissionType::FileRead);
        assert!(!grant.matches(&required));
    }
}
