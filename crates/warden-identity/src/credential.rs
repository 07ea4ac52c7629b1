//! Credential records and their registry.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use warden_core::Timestamp;
use warden_crypto::{hash_password, verify_password};
use warden_store::JsonStore;

use crate::error::IdentityError;

/// A registered client's stored credentials and profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Stable, opaque record id.
    pub id: String,
    /// Unique login username.
    pub username: String,
    /// PHC-format salted password hash; never the plaintext password.
    pub password_hash: String,
    /// Optional contact email.
    pub email: Option<String>,
    /// Roles held by this account.
    pub roles: Vec<String>,
    /// When the record was created.
    pub created_at: Timestamp,
    /// When the account last authenticated successfully.
    pub last_login: Option<Timestamp>,
    /// Whether the account may currently authenticate.
    pub enabled: bool,
    /// Free-form metadata.
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct CredentialFile {
    records: Vec<CredentialRecord>,
}

/// Durable registry of credential records, keyed by unique username.
pub struct CredentialRegistry {
    store: JsonStore<CredentialFile>,
}

impl CredentialRegistry {
    /// Open (or lazily create) a registry backed by `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            store: JsonStore::new(path.as_ref(), CredentialFile::default()),
        }
    }

    async fn load(&self) -> Result<CredentialFile, IdentityError> {
        Ok(self.store.load().await?)
    }

    async fn save(&self, file: &CredentialFile) -> Result<(), IdentityError> {
        self.store.save(file).await?;
        Ok(())
    }

    /// Register a new client.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UsernameTaken`] if `username` is already registered.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
        roles: Option<Vec<String>>,
        metadata: Option<HashMap<String, serde_json::Value>>,
    ) -> Result<CredentialRecord, IdentityError> {
        let mut file = self.load().await?;
        if file.records.iter().any(|r| r.username == username) {
            return Err(IdentityError::UsernameTaken(username.to_string()));
        }

        let record = CredentialRecord {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            email,
            roles: roles.unwrap_or_default(),
            created_at: Timestamp::now(),
            last_login: None,
            enabled: true,
            metadata: metadata.unwrap_or_default(),
        };

        file.records.push(record.clone());
        self.save(&file).await?;
        info!(username, "credential record created");
        Ok(record)
    }

    /// Verify `username`/`password` and, on success, record the login time.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::UnknownUsername`], [`IdentityError::AccountDisabled`],
    /// or [`IdentityError::InvalidCredentials`] as appropriate. All three share the
    /// caller-visible shape of a rejected login; only logs distinguish the cause.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialRecord, IdentityError> {
        let mut file = self.load().await?;
        let idx = file
            .records
            .iter()
            .position(|r| r.username == username)
            .ok_or_else(|| IdentityError::UnknownUsername(username.to_string()))?;

        if !file.records[idx].enabled {
            return Err(IdentityError::AccountDisabled(username.to_string()));
        }

        verify_password(password, &file.records[idx].password_hash)
            .map_err(|_| IdentityError::InvalidCredentials)?;

        file.records[idx].last_login = Some(Timestamp::now());
        let record = file.records[idx].clone();
        self.save(&file).await?;
        Ok(record)
    }

    /// Fetch a record by its stable id.
    pub async fn get(&self, id: &str) -> Result<Option<CredentialRecord>, IdentityError> {
        let file = self.load().await?;
        Ok(file.records.into_iter().find(|r| r.id == id))
    }

    /// Fetch a record by username.
    pub async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, IdentityError> {
        let file = self.load().await?;
        Ok(file.records.into_iter().find(|r| r.username == username))
    }

    /// List every registered record.
    pub async fn list(&self) -> Result<Vec<CredentialRecord>, IdentityError> {
        Ok(self.load().await?.records)
    }

    /// Enable or disable an account.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), IdentityError> {
        let mut file = self.load().await?;
        let record = file
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| IdentityError::UnknownUsername(id.to_string()))?;
        record.enabled = enabled;
        self.save(&file).await
    }

    /// Grant a role, if not already held.
    pub async fn add_role(&self, id: &str, role: &str) -> Result<(), IdentityError> {
        let mut file = self.load().await?;
        let record = file
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| IdentityError::UnknownUsername(id.to_string()))?;
        if !record.roles.iter().any(|r| r == role) {
            record.roles.push(role.to_string());
        }
        self.save(&file).await
    }

    /// Revoke a role.
    pub async fn remove_role(&self, id: &str, role: &str) -> Result<(), IdentityError> {
        let mut file = self.load().await?;
        let record = file
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| IdentityError::UnknownUsername(id.to_string()))?;
        record.roles.retain(|r| r != role);
        self.save(&file).await
    }

    /// Merge `patch` into a record's metadata, overwriting any keys it shares
    /// with the existing map and leaving the rest untouched.
    pub async fn update_metadata(
        &self,
        id: &str,
        patch: HashMap<String, serde_json::Value>,
    ) -> Result<(), IdentityError> {
        let mut file = self.load().await?;
        let record = file
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| IdentityError::UnknownUsername(id.to_string()))?;
        record.metadata.extend(patch);
        self.save(&file).await
    }

    /// Delete a record permanently.
    pub async fn delete(&self, id: &str) -> Result<(), IdentityError> {
        let mut file = self.load().await?;
        file.records.retain(|r| r.id != id);
        self.save(&file).await
    }
}
