//! The durable, append-only audit log.

use std::path::Path;

use serde::{Deserialize, Serialize};
use warden_core::{ClientId, Timestamp};
use warden_crypto::ContentHash;
use warden_store::JsonStore;

use crate::entry::{AuditEntry, AuditEvent, AuditOutcome};
use crate::error::AuditError;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct AuditFile {
    entries: Vec<AuditEntry>,
}

/// Append-only, chain-linked audit log.
///
/// Every append re-reads the current chain head under the hood, so the log
/// only ever grows and never reorders or edits a prior entry.
pub struct AuditLog {
    store: JsonStore<AuditFile>,
}

impl AuditLog {
    /// Open (or lazily create) a log backed by `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            store: JsonStore::new(path.as_ref(), AuditFile::default()),
        }
    }

    /// Append a new entry for `client` recording `event`/`outcome`, chained
    /// onto the current head.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Store`] if the underlying file cannot be read or written.
    pub async fn append(
        &self,
        client: ClientId,
        event: AuditEvent,
        outcome: AuditOutcome,
    ) -> Result<AuditEntry, AuditError> {
        let mut file = self.store.load().await?;
        let previous_hash = file
            .entries
            .last()
            .map(AuditEntry::content_hash)
            .unwrap_or_else(ContentHash::zero);

        let entry = AuditEntry::new(client, event, outcome, previous_hash);
        file.entries.push(entry.clone());
        self.store.save(&file).await?;
        Ok(entry)
    }

    /// Every entry for `client`, in append order.
    pub async fn entries_for_client(
        &self,
        client: &ClientId,
    ) -> Result<Vec<AuditEntry>, AuditError> {
        let file = self.store.load().await?;
        Ok(file
            .entries
            .into_iter()
            .filter(|e| &e.client_id == client)
            .collect())
    }

    /// Every entry with a timestamp in `[from, to]`, in append order.
    pub async fn entries_in_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<AuditEntry>, AuditError> {
        let file = self.store.load().await?;
        Ok(file
            .entries
            .into_iter()
            .filter(|e| e.timestamp >= from && e.timestamp <= to)
            .collect())
    }

    /// Total number of entries recorded.
    pub async fn count(&self) -> Result<usize, AuditError> {
        Ok(self.store.load().await?.entries.len())
    }

    /// Verify that every entry in the log correctly chains onto its predecessor.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::ChainBroken`] at the index of the first entry
    /// whose `previous_hash` does not match the content hash of the entry before it.
    pub async fn verify_chain(&self) -> Result<(), AuditError> {
        let file = self.store.load().await?;
        let mut expected = ContentHash::zero();
        for (index, entry) in file.entries.iter().enumerate() {
            if entry.previous_hash != expected {
                return Err(AuditError::ChainBroken { index });
            }
            expected = entry.content_hash();
        }
        Ok(())
    }
}
