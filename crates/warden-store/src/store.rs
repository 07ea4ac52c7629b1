//! Generic atomic JSON file store.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// A JSON document persisted at a fixed path with atomic, durable writes.
///
/// `T` is the in-memory shape of the document (e.g. a list of credential
/// records). Loading a missing file yields the configured default rather
/// than an error, matching the convention used for first-run state.
pub struct JsonStore<T> {
    path: PathBuf,
    default: T,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    /// Create a store bound to `path`, returning `default` when the file is absent.
    pub fn new(path: impl Into<PathBuf>, default: T) -> Self {
        Self {
            path: path.into(),
            default,
        }
    }

    /// Load the document, or the configured default if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for I/O faults other than "not found", and
    /// [`StoreError::Format`] if the file exists but is not valid JSON for `T`.
    pub async fn load(&self) -> Result<T, StoreError> {
        let path = self.path.clone();
        let default = self.default.clone();
        tokio::task::spawn_blocking(move || load_blocking(&path, default))
            .await
            .expect("load_blocking panicked")
    }

    /// Atomically persist `value`, replacing any prior contents of the file.
    ///
    /// Writes to a sibling temp file, fsyncs it, sets owner-only permissions,
    /// then renames it over the target so a concurrent reader never observes
    /// a partially written document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if any step of the write fails.
    pub async fn save(&self, value: &T) -> Result<(), StoreError> {
        let path = self.path.clone();
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Format {
            path: path.display().to_string(),
            source,
        })?;
        tokio::task::spawn_blocking(move || save_blocking(&path, &bytes))
            .await
            .expect("save_blocking panicked")
    }
}

fn load_blocking<T: DeserializeOwned>(path: &Path, default: T) -> Result<T, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Format {
            path: path.display().to_string(),
            source,
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(default),
        Err(source) => Err(StoreError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn save_blocking(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source: std::io::Error| StoreError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp_path = path.with_extension(format!(
        "tmp-{}-{}",
        std::process::id(),
        tmp_suffix()
    ));

    {
        use std::io::Write;
        let mut file = std::fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
    }

    set_owner_only_permissions(&tmp_path).map_err(io_err)?;
    std::fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// A cheap per-call disambiguator for the temp filename; not a security
/// boundary, just collision avoidance between concurrent saves in tests.
fn tmp_suffix() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Doc {
        count: u32,
    }

    #[tokio::test]
    async fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("doc.json"), Doc { count: 0 });
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, Doc { count: 0 });
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("doc.json"), Doc { count: 0 });
        store.save(&Doc { count: 42 }).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, Doc { count: 42 });
    }

    #[tokio::test]
    async fn save_sets_owner_only_permissions() {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("doc.json");
            let store = JsonStore::new(path.clone(), Doc { count: 0 });
            store.save(&Doc { count: 1 }).await.unwrap();
            let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[tokio::test]
    async fn malformed_json_is_reported_as_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, b"not json").unwrap();
        let store: JsonStore<Doc> = JsonStore::new(path, Doc { count: 0 });
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::Format { .. }));
    }
}
