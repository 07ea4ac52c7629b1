//! Per-client jail directories with path-traversal prevention.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use warden_core::ClientId;

use crate::error::SandboxError;

/// Resolves and enforces per-client jail directories under a common base.
pub struct JailManager {
    base: PathBuf,
}

impl JailManager {
    /// Create a manager rooted at `base`. Per-client jails are created lazily on first use.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// The jail directory for `client` (may not exist yet).
    #[must_use]
    pub fn jail_dir(&self, client: &ClientId) -> PathBuf {
        self.base.join(client.as_str())
    }

    /// Resolve a client-relative path to an absolute path inside that
    /// client's jail, creating the jail directory if needed.
    ///
    /// Rejects absolute paths and any path containing a `..` component,
    /// then verifies the normalized result still lies under the jail.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::PathEscape`] if `relative` would resolve
    /// outside the client's jail, or [`SandboxError::Io`] if the jail
    /// directory cannot be created.
    pub async fn resolve(
        &self,
        client: &ClientId,
        relative: &str,
    ) -> Result<PathBuf, SandboxError> {
        let jail = self.jail_dir(client);
        tokio::fs::create_dir_all(&jail).await?;

        let candidate = Path::new(relative);
        if candidate.is_absolute() || candidate.components().any(|c| c.as_os_str() == "..") {
            warn!(client = %client, path = relative, "rejected path-traversal attempt");
            return Err(SandboxError::PathEscape {
                client: client.clone(),
                path: relative.to_string(),
            });
        }

        let resolved = jail.join(candidate);
        if !resolved.starts_with(&jail) {
            return Err(SandboxError::PathEscape {
                client: client.clone(),
                path: relative.to_string(),
            });
        }

        Ok(resolved)
    }

    /// Whether `path` may be accessed by `accessor`.
    ///
    /// True when `path` lies under `accessor`'s own jail, or when
    /// `cross_client_granted` is set (in which case the caller is
    /// responsible for auditing the access).
    #[must_use]
    pub fn validate_access(
        &self,
        accessor: &ClientId,
        path: &Path,
        cross_client_granted: bool,
    ) -> bool {
        let own_jail = self.jail_dir(accessor);
        if path.starts_with(&own_jail) {
            return true;
        }
        cross_client_granted
    }

    /// List every file under `client`'s jail (relative paths).
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Io`] if the jail cannot be read.
    pub async fn list_files(&self, client: &ClientId) -> Result<Vec<PathBuf>, SandboxError> {
        let jail = self.jail_dir(client);
        let mut out = Vec::new();
        let mut stack = vec![jail.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    stack.push(path);
                } else if let Ok(relative) = path.strip_prefix(&jail) {
                    out.push(relative.to_path_buf());
                }
            }
        }
        Ok(out)
    }

    /// Remove `client`'s entire jail directory.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Io`] if the directory exists and cannot be removed.
    pub async fn clear(&self, client: &ClientId) -> Result<(), SandboxError> {
        let jail = self.jail_dir(client);
        match tokio::fs::remove_dir_all(&jail).await {
            Ok(()) => {
                info!(client = %client, "sandbox jail cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_stays_within_jail() {
        let dir = tempfile::tempdir().unwrap();
        let jail = JailManager::new(dir.path());
        let client = ClientId::new("alice");
        let path = jail.resolve(&client, "notes/todo.txt").await.unwrap();
        assert!(path.starts_with(jail.jail_dir(&client)));
    }

    #[tokio::test]
    async fn resolve_rejects_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let jail = JailManager::new(dir.path());
        let client = ClientId::new("alice");
        let err = jail.resolve(&client, "/etc/passwd").await.unwrap_err();
        assert!(matches!(err, SandboxError::PathEscape { .. }));
    }

    #[tokio::test]
    async fn resolve_rejects_dotdot_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let jail = JailManager::new(dir.path());
        let client = ClientId::new("alice");
        let err = jail
            .resolve(&client, "../bob/secret.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::PathEscape { .. }));
    }

    #[tokio::test]
    async fn cross_client_access_denied_without_grant() {
        let dir = tempfile::tempdir().unwrap();
        let jail = JailManager::new(dir.path());
        let alice = ClientId::new("alice");
        let bob = ClientId::new("bob");
        let bob_path = jail.resolve(&bob, "file.txt").await.unwrap();

        assert!(!jail.validate_access(&alice, &bob_path, false));
        assert!(jail.validate_access(&alice, &bob_path, true));
    }
}
