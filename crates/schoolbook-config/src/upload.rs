use std::env;
use std::path::PathBuf;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadConfig {
    /// Maximum accepted photo size in bytes.
    pub max_file_size: usize,
    pub upload_dir: PathBuf,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: 5 * 1024 * 1024,
            upload_dir: PathBuf::from("./uploads"),
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_file_size: env_or("MAX_FILE_SIZE", defaults.max_file_size),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
        }
    }
}
