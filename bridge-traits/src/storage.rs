//! Storage mutation contract.
//!
//! Physical file operations live behind this seam so the session core can
//! sequence them against playlist mutations without knowing how a move is
//! carried out (rename, stream copy, SAF document move, ...).

use async_trait::async_trait;

use crate::error::Result;
use crate::track::Track;

/// Contract for the collaborator that relocates track files on storage.
#[async_trait]
pub trait FileMover: Send + Sync {
    /// Move `track`'s backing file into `target_dir`.
    ///
    /// Must be all-or-nothing from the caller's perspective: on `Err` the
    /// source file is still present and playable.
    async fn move_track(&self, track: &Track, target_dir: &str) -> Result<()>;
}
