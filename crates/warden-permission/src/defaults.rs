//! Conservative default permission set granted to a client on first use.

use crate::permission::{Permission, PermissionType, Resource};

/// The minimal permission set a newly seen client receives: read access under
/// its own data subtree, plus a pair of harmless whitelisted commands.
#[must_use]
pub fn default_permissions() -> Vec<Permission> {
    vec![
        Permission::new(PermissionType::FileRead, Resource::path("/app/data/*")),
        Permission::new(PermissionType::SystemCommand, Resource::command("ls")),
        Permission::new(PermissionType::SystemCommand, Resource::command("echo")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_grants_read_under_app_data_only() {
        let perms = default_permissions();
        let required = Permission::new(PermissionType::FileRead, Resource::path("/app/data/x.txt"));
        assert!(perms.iter().any(|p| p.matches(&required)));

        let outside = Permission::new(PermissionType::FileRead, Resource::path("/etc/shadow"));
        assert!(!perms.iter().any(|p| p.matches(&outside)));
    }

    #[test]
    fn default_set_does_not_grant_code_execution() {
        let perms = default_permissions();
        let required = Permission::wildcard(PermissionType::CodeExecution);
        assert!(!perms.iter().any(|p| p.matches(&required)));
    }
}
