//! User intents.
//!
//! The session core's entire mutating surface. Intents are submitted through
//! [`SessionHandle`](crate::synchronizer::SessionHandle), queued FIFO, and
//! applied one at a time by the synchronizer's event loop; no two intents
//! ever interleave mid-mutation.

use serde::{Deserialize, Serialize};

/// A UI-originated command for the session synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Replace the scanned folder set and start a fresh scan of it.
    SetFolders(Vec<String>),
    /// Set the target folder for move-current.
    SetMoveTarget(String),
    /// Request a gain for the equalizer band nearest `frequency_hz`.
    SetEqualizerBand {
        /// Requested band center frequency in hertz.
        frequency_hz: u32,
        /// Requested gain in dB; clamped to the engine's range.
        gain_db: i16,
    },
    /// Set playback volume in `0.0..=1.0`.
    SetVolume(f32),
    /// Enable or disable eviction of finished tracks.
    ToggleRemoveOnEnd(bool),
    /// Play when paused, pause when playing.
    TogglePlayback,
    /// Seek to a fraction (`0.0..=1.0`) of the known duration.
    Seek(f32),
    /// Advance to the next queue entry.
    SkipNext,
    /// Return to the previous queue entry.
    SkipPrevious,
    /// Start playing the playlist entry at `index`.
    PlayTrackAt(usize),
    /// Remove the current track from the playlist.
    RemoveCurrent,
    /// Move the current track's file to the move target, then remove it.
    MoveCurrent,
    /// Shuffle the playlist into a uniformly random order.
    Shuffle,
    /// Re-scan the currently selected folders.
    RefreshLibrary,
    /// Stop the session loop.
    Shutdown,
}
