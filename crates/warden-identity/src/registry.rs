//! Durable registry of issued tokens, used for revocation and lookup.
//!
//! A token is accepted only when the minter accepts its signature and expiry
//! *and* the registry finds a non-revoked row for its `jti`. Raw token bytes
//! are never persisted, only their content hash.

use std::path::Path;

use serde::{Deserialize, Serialize};
use warden_core::{TokenId, Timestamp};
use warden_crypto::ContentHash;
use warden_store::JsonStore;

use crate::error::IdentityError;
use crate::minter::TokenPair;

/// A persisted record of one issued token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Shared jti for the access/refresh pair.
    pub jti: TokenId,
    /// Credential record id that owns this token.
    pub owner_id: String,
    /// Username at mint time, for audit convenience.
    pub owner_username: String,
    /// Content hash of the access token bytes.
    pub access_hash: ContentHash,
    /// Content hash of the refresh token bytes.
    pub refresh_hash: ContentHash,
    /// When the pair was minted.
    pub issued_at: Timestamp,
    /// When the access token expires.
    pub access_expiry: Timestamp,
    /// When the refresh token expires.
    pub refresh_expiry: Timestamp,
    /// Whether the pair has been revoked.
    pub revoked: bool,
    /// When it was revoked, if ever.
    pub revoked_at: Option<Timestamp>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct TokenFile {
    records: Vec<TokenRecord>,
}

/// Which token within a pair is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSlot {
    /// The access token.
    Access,
    /// The refresh token.
    Refresh,
}

/// Durable store of issued token records.
pub struct TokenRegistry {
    store: JsonStore<TokenFile>,
}

impl TokenRegistry {
    /// Open (or lazily create) a registry backed by `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            store: JsonStore::new(path.as_ref(), TokenFile::default()),
        }
    }

    async fn load(&self) -> Result<TokenFile, IdentityError> {
        Ok(self.store.load().await?)
    }

    async fn save(&self, file: &TokenFile) -> Result<(), IdentityError> {
        self.store.save(file).await?;
        Ok(())
    }

    /// Persist a newly minted pair.
    pub async fn record(
        &self,
        pair: &TokenPair,
        owner_id: &str,
        owner_username: &str,
    ) -> Result<(), IdentityError> {
        let mut file = self.load().await?;
        file.records.push(TokenRecord {
            jti: pair.jti,
            owner_id: owner_id.to_string(),
            owner_username: owner_username.to_string(),
            access_hash: ContentHash::hash(pair.access_token.as_bytes()),
            refresh_hash: ContentHash::hash(pair.refresh_token.as_bytes()),
            issued_at: Timestamp::now(),
            access_expiry: Timestamp::from(
                chrono::DateTime::from_timestamp(pair.access_claims.exp, 0)
                    .unwrap_or_else(chrono::Utc::now),
            ),
            refresh_expiry: Timestamp::from(
                chrono::DateTime::from_timestamp(pair.refresh_claims.exp, 0)
                    .unwrap_or_else(chrono::Utc::now),
            ),
            revoked: false,
            revoked_at: None,
        });
        self.save(&file).await
    }

    /// Confirm that `jti`'s row exists, is not revoked, and that `token_bytes`
    /// hashes to the stored hash for `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::TokenNotFound`] if no row exists, or
    /// [`IdentityError::TokenRevoked`] if the row is revoked. A hash mismatch
    /// (the presented token does not match what was issued for this jti) is
    /// also reported as [`IdentityError::TokenNotFound`], since from the
    /// caller's perspective it is an unrecognized token.
    pub async fn validate(
        &self,
        jti: &TokenId,
        token_bytes: &str,
        slot: TokenSlot,
    ) -> Result<TokenRecord, IdentityError> {
        let file = self.load().await?;
        let record = file
            .records
            .iter()
            .find(|r| &r.jti == jti)
            .ok_or_else(|| IdentityError::TokenNotFound(jti.to_string()))?;

        if record.revoked {
            return Err(IdentityError::TokenRevoked(jti.to_string()));
        }

        let expected = match slot {
            TokenSlot::Access => record.access_hash,
            TokenSlot::Refresh => record.refresh_hash,
        };
        if expected != ContentHash::hash(token_bytes.as_bytes()) {
            return Err(IdentityError::TokenNotFound(jti.to_string()));
        }

        Ok(record.clone())
    }

    /// Mark a jti as revoked. Idempotent: revoking an already-revoked jti succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::TokenNotFound`] if no row exists for `jti`.
    pub async fn revoke(&self, jti: &TokenId) -> Result<(), IdentityError> {
        let mut file = self.load().await?;
        let record = file
            .records
            .iter_mut()
            .find(|r| &r.jti == jti)
            .ok_or_else(|| IdentityError::TokenNotFound(jti.to_string()))?;
        record.revoked = true;
        record.revoked_at = Some(Timestamp::now());
        self.save(&file).await
    }

    /// Fetch the row for `jti`, if any.
    pub async fn get_by_jti(&self, jti: &TokenId) -> Result<Option<TokenRecord>, IdentityError> {
        let file = self.load().await?;
        Ok(file.records.into_iter().find(|r| &r.jti == jti))
    }

    /// List every row owned by `owner_id`.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<TokenRecord>, IdentityError> {
        let file = self.load().await?;
        Ok(file
            .records
            .into_iter()
            .filter(|r| r.owner_id == owner_id)
            .collect())
    }

    /// Remove every row whose refresh token has fully expired.
    ///
    /// Returns the number of rows removed.
    pub async fn cleanup_expired(&self) -> Result<usize, IdentityError> {
        let mut file = self.load().await?;
        let before = file.records.len();
        file.records
            .retain(|r| !r.refresh_expiry.has_elapsed_with_skew(0));
        let removed = before - file.records.len();
        if removed > 0 {
            self.save(&file).await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::credential::CredentialRecord;
    use crate::minter::TokenMinter;

    fn sample_record() -> CredentialRecord {
        CredentialRecord {
            id: "user-1".to_string(),
            username: "alice".to_string(),
            password_hash: String::new(),
            email: None,
            roles: vec![],
            created_at: Timestamp::now(),
            last_login: None,
            enabled: true,
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn record_then_validate_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TokenRegistry::new(dir.path().join("tokens.json"));
        let minter = TokenMinter::new(b"a signing secret of at least 32 bytes!!".to_vec()).unwrap();
        let record = sample_record();
        let pair = minter.mint_pair(&record).unwrap();
        registry.record(&pair, &record.id, &record.username).await.unwrap();

        let row = registry
            .validate(&pair.jti, &pair.access_token, TokenSlot::Access)
            .await
            .unwrap();
        assert!(!row.revoked);
    }

    #[tokio::test]
    async fn revoked_token_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TokenRegistry::new(dir.path().join("tokens.json"));
        let minter = TokenMinter::new(b"a signing secret of at least 32 bytes!!".to_vec()).unwrap();
        let record = sample_record();
        let pair = minter.mint_pair(&record).unwrap();
        registry.record(&pair, &record.id, &record.username).await.unwrap();

        registry.revoke(&pair.jti).await.unwrap();
        let err = registry
            .validate(&pair.jti, &pair.access_token, TokenSlot::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::TokenRevoked(_)));
    }

    #[tokio::test]
    async fn unknown_jti_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let registry = TokenRegistry::new(dir.path().join("tokens.json"));
        let err = registry
            .validate(&TokenId::generate(), "whatever", TokenSlot::Access)
            .await
            .unwrap_err();
        assert!(matches!(err, IdentityError::TokenNotFound(_)));
    }
}
