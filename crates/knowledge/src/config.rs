//! On-disk layout of a persisted index.

use std::path::{Path, PathBuf};

/// File name of the index database inside the persist directory.
pub const INDEX_FILE_NAME: &str = "index.sqlite";

/// Get the path to the index database.
pub fn get_index_path(persist_dir: &Path) -> PathBuf {
    persist_dir.join(INDEX_FILE_NAME)
}

/// A unique staging path next to the index, renamed over it once complete.
pub fn get_staging_path(persist_dir: &Path) -> PathBuf {
    persist_dir.join(format!("{}.{}.tmp", INDEX_FILE_NAME, uuid::Uuid::new_v4()))
}
