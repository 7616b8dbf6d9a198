//! File-backed `LocalStore` for hosts without browser storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use social_accounts_core::error::{CoreError, CoreResult};
use social_accounts_core::traits::LocalStore;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go through a temporary file and a rename, so readers never observe a
/// half-written value. Compare-and-set is atomic for every user of the same
/// `JsonFileLocalStore` instance; separate processes sharing a directory are not
/// coordinated.
pub struct JsonFileLocalStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileLocalStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns `CoreError::LocalCache` if the directory cannot be created.
    pub async fn new(dir: &Path) -> CoreResult<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| CoreError::LocalCache(format!("Failed to create directory: {e}")))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the key files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> CoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(CoreError::LocalCache(format!("Invalid store key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    async fn read(path: &Path) -> CoreResult<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::LocalCache(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn write(path: &Path, value: &str) -> CoreResult<()> {
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value)
            .await
            .map_err(|e| CoreError::LocalCache(format!("Failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, path).await.map_err(|e| {
            CoreError::LocalCache(format!("Failed to replace {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl LocalStore for JsonFileLocalStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.path_for(key)?;
        Self::read(&path).await
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;
        Self::write(&path, value).await
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::LocalCache(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        new: &str,
    ) -> CoreResult<bool> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().await;
        let current = Self::read(&path).await?;
        if current.as_deref() != expected {
            log::debug!("Compare-and-set conflict on key {key}");
            return Ok(false);
        }
        Self::write(&path, new).await?;
        Ok(true)
    }
}
