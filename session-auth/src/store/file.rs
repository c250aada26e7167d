//! JSON file backed key-value store.
//!
//! Plays the role browser local storage plays for a web client: a single flat
//! string map that survives restarts.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::{storage_error, Error, ErrorKind, StorageErrorKind};

/// Owner read/write only; the file holds bearer and refresh tokens.
#[cfg(unix)]
const SESSION_FILE_MODE: u32 = 0o600;

/// Store persisting all entries as one JSON object in a file.
///
/// The file is read on every access, so edits made by another process are
/// picked up. Writes from this process are serialized by an internal lock and
/// land through a temporary file renamed over the target, so readers never see
/// a partially written file.
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, Error> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage_error(StorageErrorKind::Read, e)),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| storage_error(StorageErrorKind::Corrupt, e))
    }

    /// Entries to start a write from, and whether an unreadable file was
    /// discarded. A corrupt file is replaced rather than blocking every later
    /// write, so logging in or out still works.
    async fn load_for_write(&self) -> Result<(BTreeMap<String, String>, bool), Error> {
        match self.load().await {
            Ok(entries) => Ok((entries, false)),
            Err(e) if e.error_kind == ErrorKind::Storage(StorageErrorKind::Corrupt) => {
                warn!("Discarding unreadable session file {}: {}", self.path.display(), e);
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "session".to_string());
        self.path
            .with_file_name(format!("{}.{}.tmp", file_name, std::process::id()))
    }

    async fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), Error> {
        let write_err = |e: std::io::Error| storage_error(StorageErrorKind::Write, e);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let contents = serde_json::to_string_pretty(entries)
            .map_err(|e| storage_error(StorageErrorKind::Write, e))?;

        let tmp_path = self.temp_path();
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(SESSION_FILE_MODE);

        let mut file = options.open(&tmp_path).await.map_err(write_err)?;
        file.write_all(contents.as_bytes()).await.map_err(write_err)?;
        file.sync_all().await.map_err(write_err)?;
        drop(file);

        // `mode` only applies on creation; a leftover temp file keeps its old bits.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(SESSION_FILE_MODE))
                .await
                .map_err(write_err)?;
        }

        if let Err(e) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(write_err(e));
        }
        debug!("Wrote {} session entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;
        let (mut entries, _) = self.load_for_write().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let _guard = self.write_lock.lock().await;
        let (mut entries, discarded) = self.load_for_write().await?;
        if entries.remove(key).is_some() || discarded {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Manager;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get("accessToken").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::new(&path);
        store.set("accessToken", "a1").await.unwrap();
        store.set("refreshToken", "r1").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("accessToken").await.unwrap(), Some("a1".to_string()));
        assert_eq!(reopened.get("refreshToken").await.unwrap(), Some("r1".to_string()));

        reopened.delete("accessToken").await.unwrap();
        assert_eq!(store.get("accessToken").await.unwrap(), None);
        assert_eq!(store.get("refreshToken").await.unwrap(), Some("r1".to_string()));
    }

    #[tokio::test]
    async fn test_writes_recover_from_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, r#"{"accessToken":"A1","refr"#).await.unwrap();

        let manager = Manager::new(
            reqwest::Client::new(),
            "http://api.test/v1",
            Arc::new(FileStore::new(&path)),
        )
        .unwrap();

        manager.clear_tokens().await.unwrap();
        assert_eq!(manager.get_token().await.unwrap(), None);

        tokio::fs::write(&path, r#"{"accessToken":"A1","refr"#).await.unwrap();
        manager.set_token("A2").await.unwrap();
        assert_eq!(manager.get_token().await.unwrap(), Some("A2".to_string()));
        assert_eq!(manager.get_refresh_token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_on_missing_file_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        FileStore::new(&path).delete("accessToken").await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        store.set("accessToken", "a1").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["session.json".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::new(&path);
        store.set("refreshToken", "R1").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        store.set("accessToken", "A1").await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileStore::new(&path);
        let err = store.get("accessToken").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Storage(StorageErrorKind::Corrupt));
    }
}
