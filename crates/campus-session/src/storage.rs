//! Durable storage for the persisted session record.
//!
//! One well-known key, string values in and out. The store never assumes a
//! schema version; whatever was written last is what comes back.

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Mutex;

/// A boxed future returned by storage methods.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = io::Result<T>> + Send + 'a>>;

/// Key-value persistence for the session record.
///
/// Dyn-compatible so `SessionStore` works with `Arc<dyn SessionStorage>`;
/// tests substitute in-memory implementations.
pub trait SessionStorage: Send + Sync {
    /// Read the stored value, `None` when nothing has been written.
    fn load(&self) -> StorageFuture<'_, Option<String>>;

    /// Replace the stored value.
    fn store<'a>(&'a self, value: &'a str) -> StorageFuture<'a, ()>;

    /// Delete the stored value. Deleting an absent value is a no-op.
    fn remove(&self) -> StorageFuture<'_, ()>;
}

const SESSION_FILE: &str = "session.json";

/// File-backed storage: a single JSON file under the data directory,
/// written atomically (.tmp → rename) so a failed write leaves the prior
/// value untouched.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(SESSION_FILE),
        }
    }

    async fn read(&self) -> io::Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write(&self, value: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, value).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    async fn delete(&self) -> io::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> StorageFuture<'_, Option<String>> {
        Box::pin(self.read())
    }

    fn store<'a>(&'a self, value: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(self.write(value))
    }

    fn remove(&self) -> StorageFuture<'_, ()> {
        Box::pin(self.delete())
    }
}

/// In-memory storage for tests and previews.
#[derive(Default)]
pub struct MemoryStorage {
    value: Mutex<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Peek at the stored value without going through the trait.
    pub fn snapshot(&self) -> Option<String> {
        self.value.lock().expect("storage lock").clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> StorageFuture<'_, Option<String>> {
        let value = self.snapshot();
        Box::pin(async move { Ok(value) })
    }

    fn store<'a>(&'a self, value: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            *self.value.lock().expect("storage lock") = Some(value.to_string());
            Ok(())
        })
    }

    fn remove(&self) -> StorageFuture<'_, ()> {
        Box::pin(async move {
            *self.value.lock().expect("storage lock") = None;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_storage_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().to_path_buf());

        assert_eq!(storage.load().await.unwrap(), None);
        storage.store(r#"{"id":1}"#).await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some(r#"{"id":1}"#));
    }

    #[tokio::test]
    async fn file_storage_overwrite_keeps_single_file() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().to_path_buf());

        storage.store("first").await.unwrap();
        storage.store("second").await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some("second"));

        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 1, "tmp file must not linger");
    }

    #[tokio::test]
    async fn file_storage_remove_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().to_path_buf());

        storage.store("value").await.unwrap();
        storage.remove().await.unwrap();
        storage.remove().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_storage_creates_data_dir() {
        let tmp = TempDir::new().unwrap();
        let storage = FileStorage::new(tmp.path().join("nested").join("data"));

        storage.store("value").await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some("value"));
    }

    #[tokio::test]
    async fn memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.load().await.unwrap(), None);

        storage.store("value").await.unwrap();
        assert_eq!(storage.load().await.unwrap().as_deref(), Some("value"));

        storage.remove().await.unwrap();
        assert_eq!(storage.load().await.unwrap(), None);
    }
}
