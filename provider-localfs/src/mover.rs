//! Local filesystem file mover.
//!
//! Moves a track's backing file into the configured target folder. Rename is
//! attempted first; when source and target live on different filesystems the
//! move degrades to copy-then-delete. On any `Err` the source file is still
//! present and playable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use bridge_traits::{BridgeError, FileMover, Track};

use crate::error::{LocalFsError, Result};

/// [`FileMover`] over local paths.
#[derive(Debug, Default)]
pub struct LocalFileMover;

impl LocalFileMover {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileMover for LocalFileMover {
    async fn move_track(&self, track: &Track, target_dir: &str) -> bridge_traits::Result<()> {
        let source = PathBuf::from(&track.file_path);
        let target_dir = PathBuf::from(target_dir);
        match tokio::task::spawn_blocking(move || move_file(&source, &target_dir)).await {
            Ok(outcome) => outcome.map_err(Into::into),
            Err(join_error) => Err(BridgeError::OperationFailed(join_error.to_string())),
        }
    }
}

fn move_file(source: &Path, target_dir: &Path) -> Result<()> {
    let name = source
        .file_name()
        .ok_or_else(|| LocalFsError::InvalidPath(source.display().to_string()))?;
    std::fs::create_dir_all(target_dir)?;
    let destination = target_dir.join(name);

    match std::fs::rename(source, &destination) {
        Ok(()) => Ok(()),
        Err(rename_error) => {
            debug!(
                source = %source.display(),
                %rename_error,
                "rename failed, copying across filesystems"
            );
            if let Err(error) = std::fs::copy(source, &destination) {
                // Leave no partial destination behind.
                let _ = std::fs::remove_file(&destination);
                return Err(error.into());
            }
            std::fs::remove_file(source)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn track_at(path: &Path) -> Track {
        Track::new(path.to_string_lossy().to_string(), "a")
    }

    #[tokio::test]
    async fn moves_the_file_into_the_target_folder() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.mp3");
        fs::write(&source, b"payload").unwrap();
        let target = dir.path().join("sorted");

        let mover = LocalFileMover::new();
        mover
            .move_track(&track_at(&source), &target.to_string_lossy())
            .await
            .unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read(target.join("a.mp3")).unwrap(), b"payload");
    }

    #[tokio::test]
    async fn creates_the_target_folder_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.mp3");
        fs::write(&source, b"payload").unwrap();
        let target = dir.path().join("deep/nested/sorted");

        let mover = LocalFileMover::new();
        mover
            .move_track(&track_at(&source), &target.to_string_lossy())
            .await
            .unwrap();

        assert!(target.join("a.mp3").exists());
    }

    #[tokio::test]
    async fn missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("gone.mp3");
        let target = dir.path().join("sorted");

        let mover = LocalFileMover::new();
        let result = mover
            .move_track(&track_at(&source), &target.to_string_lossy())
            .await;

        assert!(result.is_err());
    }
}
