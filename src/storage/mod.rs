//! Object storage for downloaded creative assets
//! Uses Apache Arrow object_store crate

use object_store::{ObjectStore, path::Path as StoragePath};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{MediaConfig, StorageProvider};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage setup failed: {0}")]
    Setup(String),

    #[error("Object store error: {0}")]
    ObjectStoreError(#[from] object_store::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata returned after upload
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    pub key: String,
    pub size: usize,
}

/// Storage client wrapping object_store
#[derive(Clone)]
pub struct StorageClient {
    store: Arc<dyn ObjectStore>,
    /// Human-readable location, used in logs and health output
    pub location: String,
}

impl StorageClient {
    /// Create new storage client with any object_store backend
    pub fn new(store: Arc<dyn ObjectStore>, location: String) -> Self {
        Self { store, location }
    }

    /// Create in-memory storage for testing/development
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(object_store::memory::InMemory::new()),
            location: "memory".to_string(),
        }
    }

    /// Create storage rooted at a local directory, creating it if needed
    pub fn local(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root).map_err(|e| {
            StorageError::Setup(format!("cannot create {}: {}", root.display(), e))
        })?;

        let store = object_store::local::LocalFileSystem::new_with_prefix(root)?;

        Ok(Self {
            store: Arc::new(store),
            location: root.display().to_string(),
        })
    }

    /// Build the backend selected in configuration
    pub fn from_config(config: &MediaConfig) -> Result<Self> {
        match config.storage {
            StorageProvider::Local => Self::local(&config.output_dir),
            StorageProvider::Memory => Ok(Self::in_memory()),
        }
    }

    /// Upload bytes to storage
    pub async fn upload(&self, key: &str, data: Vec<u8>) -> Result<UploadMetadata> {
        let path = StoragePath::from(key);
        let size = data.len();

        self.store.put(&path, data.into()).await?;

        tracing::debug!(key, size, "Uploaded to storage");

        Ok(UploadMetadata {
            key: key.to_string(),
            size,
        })
    }

    /// Download from storage
    pub async fn download(&self, key: &str) -> Result<Vec<u8>> {
        let path = StoragePath::from(key);

        let result = self.store.get(&path).await?;
        let bytes = result.bytes().await?;

        Ok(bytes.to_vec())
    }

    /// Check if key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = StoragePath::from(key);

        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
