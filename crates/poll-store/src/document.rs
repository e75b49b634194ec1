//! JSON document under an exclusive per-document lock
//!
//! A [`JsonDocument`] pairs one on-disk JSON file with a `tokio::sync::Mutex`
//! (exclusive and FIFO-queued). Callers take the lock for the whole
//! read-modify-write cycle; the guard releases it on every exit path.
//! Readers also lock, so a partial write is never observed.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::StoreError;

/// One JSON-backed document
pub(crate) struct JsonDocument<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Acquire the document lock
    ///
    /// Waiters are served in FIFO order; the returned guard is the only way
    /// to read or write the file.
    pub(crate) async fn lock(&self) -> DocumentGuard<'_, T> {
        DocumentGuard {
            path: &self.path,
            _permit: self.lock.lock().await,
            _marker: PhantomData,
        }
    }

    /// Lock, read, and deserialize in one step
    pub(crate) async fn read(&self) -> Result<Option<T>, StoreError> {
        self.lock().await.load().await
    }

    /// Lock, then run `mutate` over the current value and persist the result
    ///
    /// The document is treated as `T::default()` when the file is absent.
    pub(crate) async fn update<F, R>(&self, mutate: F) -> Result<R, StoreError>
    where
        T: Default,
        F: FnOnce(&mut T) -> R,
    {
        let guard = self.lock().await;
        let mut value = guard.load().await?.unwrap_or_default();
        let result = mutate(&mut value);
        guard.store(&value).await?;
        Ok(result)
    }
}

/// Exclusive access to one document for a read-modify-write cycle
pub(crate) struct DocumentGuard<'a, T> {
    path: &'a Path,
    _permit: MutexGuard<'a, ()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> DocumentGuard<'_, T>
where
    T: Serialize + DeserializeOwned,
{
    /// Read and deserialize the document; `None` when the file is absent
    pub(crate) async fn load(&self) -> Result<Option<T>, StoreError> {
        let bytes = match fs::read(self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Document read failed");
                return Err(StoreError::io(self.path, e));
            }
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Document parse failed");
            StoreError::malformed(self.path, e)
        })
    }

    /// Read the document, defaulting when the file is absent
    pub(crate) async fn load_or_default(&self) -> Result<T, StoreError>
    where
        T: Default,
    {
        Ok(self.load().await?.unwrap_or_default())
    }

    /// Serialize and persist the document
    ///
    /// Writes to a sibling temp file, then renames it over the target; the
    /// rename is the durability boundary.
    pub(crate) async fn store(&self, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::malformed(self.path, e))?;

        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, &bytes).await {
            tracing::error!(path = %tmp.display(), error = %e, "Document write failed");
            return Err(StoreError::io(&tmp, e));
        }

        fs::rename(&tmp, self.path).await.map_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "Document rename failed");
            StoreError::io(self.path, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_doc(dir: &tempfile::TempDir) -> JsonDocument<Vec<String>> {
        JsonDocument::new(dir.path().join("items.json"))
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let doc = temp_doc(&dir);

        assert_eq!(doc.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let doc = temp_doc(&dir);

        doc.update(|items| items.push("a".to_string())).await.unwrap();
        doc.update(|items| items.push("b".to_string())).await.unwrap();

        let items = doc.read().await.unwrap().unwrap();
        assert_eq!(items, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_store_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = temp_doc(&dir);

        let guard = doc.lock().await;
        guard.store(&vec!["x".to_string()]).await.unwrap();
        drop(guard);

        assert!(dir.path().join("items.json").exists());
        assert!(!dir.path().join("items.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_malformed_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("items.json"), b"not json").unwrap();
        let doc = temp_doc(&dir);

        assert!(matches!(
            doc.read().await,
            Err(StoreError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_lock_serializes_writers() {
        let dir = tempfile::tempdir().unwrap();
        let doc = std::sync::Arc::new(temp_doc(&dir));

        let mut handles = Vec::new();
        for i in 0..8 {
            let doc = doc.clone();
            handles.push(tokio::spawn(async move {
                doc.update(|items| items.push(format!("item-{i}"))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let items = doc.read().await.unwrap().unwrap();
        assert_eq!(items.len(), 8, "every concurrent update must be retained");
    }
}
