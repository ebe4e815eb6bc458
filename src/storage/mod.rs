//! Output store for generated artifacts
//!
//! A flat directory of `{task_id}.png` files. The filename is the only
//! metadata linking an artifact to its task; identifiers are fresh per task
//! and never reused, so no overwrite handling is needed.

pub mod base64;

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Handler for artifact storage operations
pub struct OutputStore {
    output_dir: PathBuf,
}

impl OutputStore {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Ensure the output directory exists
    pub async fn ensure_dir(&self) -> Result<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir).await?;
            debug!(path = ?self.output_dir, "Created output directory");
        }
        Ok(())
    }

    /// Deterministic filename for a task
    pub fn filename_for(task_id: &Uuid) -> String {
        format!("{}.png", task_id)
    }

    /// Persist artifact bytes under the task's filename
    pub async fn save(&self, task_id: &Uuid, bytes: &[u8]) -> Result<PathBuf> {
        self.ensure_dir().await?;

        let path = self.output_dir.join(Self::filename_for(task_id));
        fs::write(&path, bytes).await?;

        debug!(path = ?path, size = bytes.len(), "Saved artifact");
        Ok(path)
    }

    /// Whether an artifact exists under the given filename
    pub async fn exists(&self, filename: &str) -> bool {
        match self.checked_path(filename) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Read an artifact. A miss is a client-visible NotFound, not a server
    /// error.
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let path = self.checked_path(filename)?;

        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("image '{}' does not exist", filename)))
            }
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Full path for a stored filename
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.output_dir.join(filename)
    }

    // Filenames come straight from the URL path; anything that could escape
    // the output directory is treated as a miss.
    fn checked_path(&self, filename: &str) -> Result<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(AppError::NotFound(format!(
                "image '{}' does not exist",
                filename
            )));
        }
        Ok(self.output_dir.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (OutputStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (OutputStore::new(dir.path()), dir)
    }

    #[test]
    fn test_filename_derived_from_task_id() {
        let task_id = Uuid::new_v4();
        assert_eq!(OutputStore::filename_for(&task_id), format!("{}.png", task_id));
    }

    #[tokio::test]
    async fn test_save_then_read_round_trip() {
        let (store, _dir) = store();
        let task_id = Uuid::new_v4();

        let path = store.save(&task_id, b"png bytes").await.unwrap();
        assert!(path.ends_with(OutputStore::filename_for(&task_id)));

        let filename = OutputStore::filename_for(&task_id);
        assert!(store.exists(&filename).await);
        assert_eq!(store.read(&filename).await.unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let (store, _dir) = store();

        let err = store.read("nope.png").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!store.exists("nope.png").await);
    }

    #[tokio::test]
    async fn test_traversal_filenames_are_misses() {
        let (store, _dir) = store();

        for name in ["../etc/passwd", "a/b.png", "..", "c\\d.png", ""] {
            let err = store.read(name).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound(_)));
        }
    }

    #[tokio::test]
    async fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(dir.path().join("nested"));

        let task_id = Uuid::new_v4();
        store.save(&task_id, b"x").await.unwrap();
        assert!(store.exists(&OutputStore::filename_for(&task_id)).await);
    }
}
