//! Per-client persistent variable bag, stored as `state.json` inside the client's jail.

use std::collections::HashMap;
use std::path::PathBuf;

use warden_core::ClientId;

use crate::error::SandboxError;
use crate::jail::JailManager;

/// Saves and loads a client's persistent sandbox variables (JSON-compatible values only).
pub struct SandboxStateStore<'a> {
    jail: &'a JailManager,
}

impl<'a> SandboxStateStore<'a> {
    /// Build a state store layered on top of `jail`.
    #[must_use]
    pub fn new(jail: &'a JailManager) -> Self {
        Self { jail }
    }

    fn state_path(&self, client: &ClientId) -> PathBuf {
        self.jail.jail_dir(client).join("state.json")
    }

    /// Persist `variables` for `client`, overwriting any prior state.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Io`] if the jail cannot be created or written.
    pub async fn save(
        &self,
        client: &ClientId,
        variables: &HashMap<String, serde_json::Value>,
    ) -> Result<(), SandboxError> {
        let jail_dir = self.jail.jail_dir(client);
        tokio::fs::create_dir_all(&jail_dir).await?;
        let bytes = serde_json::to_vec_pretty(variables)?;
        tokio::fs::write(self.state_path(client), bytes).await?;
        Ok(())
    }

    /// Load `client`'s variable bag, or an empty map if none has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Format`] if the file exists but is not valid JSON.
    pub async fn load(
        &self,
        client: &ClientId,
    ) -> Result<HashMap<String, serde_json::Value>, SandboxError> {
        match tokio::fs::read(self.state_path(client)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the persisted state file, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SandboxError::Io`] for failures other than "not found".
    pub async fn clear(&self, client: &ClientId) -> Result<(), SandboxError> {
        match tokio::fs::remove_file(self.state_path(client)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let jail = JailManager::new(dir.path());
        let store = SandboxStateStore::new(&jail);
        let client = ClientId::new("alice");

        let mut vars = HashMap::new();
        vars.insert("counter".to_string(), json!(3));
        store.save(&client, &vars).await.unwrap();

        let loaded = store.load(&client).await.unwrap();
        assert_eq!(loaded.get("counter"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn load_missing_state_yields_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let jail = JailManager::new(dir.path());
        let store = SandboxStateStore::new(&jail);
        let client = ClientId::new("alice");

        let loaded = store.load(&client).await.unwrap();
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn clear_removes_state() {
        let dir = tempfile::tempdir().unwrap();
        let jail = JailManager::new(dir.path());
        let store = SandboxStateStore::new(&jail);
        let client = ClientId::new("alice");

        let mut vars = HashMap::new();
        vars.insert("x".to_string(), json!(1));
        store.save(&client, &vars).await.unwrap();
        store.clear(&client).await.unwrap();

        let loaded = store.load(&client).await.unwrap();
        assert!(loaded.is_empty());
    }
}
