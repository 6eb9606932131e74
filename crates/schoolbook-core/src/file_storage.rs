//! Storage for uploaded files (student photos).
//!
//! Business code talks to the [`FileStorage`] trait so the local-disk
//! backend can be swapped out without touching the services.
//!
//! # Example
//!
//! ```ignore
//! use schoolbook_core::file_storage::{FileStorage, LocalFileStorage};
//! use std::path::PathBuf;
//!
//! let storage = LocalFileStorage::new(PathBuf::from("./uploads"), "/uploads".to_string());
//!
//! storage.validate("image/png", bytes.len())?;
//! let key = storage.save("student_photos/STU2024001.png", &bytes).await?;
//! let url = storage.get_url(&key)?; // "/uploads/student_photos/STU2024001.png"
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::fs;

pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

pub const PHOTO_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

pub trait FileStorage: fmt::Debug + Send + Sync {
    /// Checks type and size before anything is written.
    fn validate(&self, mime_type: &str, size_bytes: usize) -> Result<(), StorageError>;

    /// Writes `content` under `key`, replacing any existing file, and returns the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Removes the file; a missing file is not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Public reference path for a stored key.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;
}

#[derive(Debug)]
pub enum StorageError {
    InvalidFileSize {
        max_bytes: usize,
    },
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },
    IoError(std::io::Error),
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File too large. Maximum size is {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received, allowed } => {
                write!(
                    f,
                    "Content type '{}' not allowed. Allowed types: {}",
                    received,
                    allowed.join(", ")
                )
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

/// Stores files under a directory on local disk.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    /// Path prefix the directory is served from, e.g. `/uploads`.
    base_url: String,
    max_file_size: usize,
    allowed_mime_types: Vec<String>,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self::with_max_size(base_dir, base_url, DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
            allowed_mime_types: PHOTO_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') || key.starts_with('\\') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with a separator".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/' | '.'))
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn validate(&self, mime_type: &str, size_bytes: usize) -> Result<(), StorageError> {
        let mime_type = mime_type.to_ascii_lowercase();
        if !self.allowed_mime_types.iter().any(|m| *m == mime_type) {
            return Err(StorageError::InvalidMimeType {
                received: mime_type,
                allowed: self.allowed_mime_types.clone(),
            });
        }

        if size_bytes > self.max_file_size {
            return Err(StorageError::InvalidFileSize {
                max_bytes: self.max_file_size,
            });
        }

        Ok(())
    }

    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }

            fs::write(&file_path, content).await?;
            tracing::debug!(path = %file_path.display(), bytes = content.len(), "file written");

            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }
}
