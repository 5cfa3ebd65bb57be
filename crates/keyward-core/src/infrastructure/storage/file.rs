//! File-backed storage backend
//!
//! Persists all slots of a namespace as one JSON object in
//! `<dir>/<namespace>.json`. Writes go to a temporary file that is renamed
//! into place, so a crash never leaves a half-written file behind. On Unix the
//! file is created with mode 0600.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::keys::{KeyValueStorage, StorageError};

type Slots = BTreeMap<String, String>;

#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a file storage for `namespace` under `dir`
    pub fn new(dir: impl AsRef<Path>, namespace: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", namespace)),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing JSON file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_slots(&self) -> Result<Slots, StorageError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Slots::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        if contents.trim().is_empty() {
            return Ok(Slots::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            StorageError::Serialization(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn write_slots(&self, slots: &Slots) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let contents = serde_json::to_string_pretty(slots)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = open_private(&tmp).await?;
        file.write_all(contents.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Open `path` for writing, readable only by the owner on Unix
async fn open_private(path: &Path) -> std::io::Result<tokio::fs::File> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let file = options.open(path).await?;

    // A stale temp file keeps its old mode; `mode` only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600)).await?;
    }

    Ok(file)
}

#[async_trait]
impl KeyValueStorage for FileStorage {
    async fn retrieve(&self, name: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        let slots = self.read_slots().await?;
        Ok(slots.get(name).cloned())
    }

    async fn save(&self, name: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut slots = self.read_slots().await?;
        slots.insert(name.to_string(), value.to_string());
        self.write_slots(&slots).await
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut slots = self.read_slots().await?;
        if slots.remove(name).is_none() {
            return Ok(());
        }
        self.write_slots(&slots).await
    }
}
