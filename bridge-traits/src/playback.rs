//! Playback engine contract.
//!
//! The session core drives a platform media engine exclusively through
//! [`PlaybackPort`] and observes it exclusively through the [`EngineEvent`]
//! stream plus the pull-style [`PlaybackPort::progress`] read. The engine owns
//! a *derived* queue; the authoritative playlist lives in the core, which
//! keeps the queue in lock-step.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::Result;
use crate::track::{Track, TrackLocator};

/// Asynchronous notifications emitted by a playback engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum EngineEvent {
    /// The engine advanced to another queue entry.
    Transition {
        /// Index of the now-current entry in the engine's queue.
        index: usize,
    },
    /// Playing/paused flipped.
    PlayingChanged {
        /// Whether the engine is now playing.
        playing: bool,
    },
    /// The current item became ready and its duration is known.
    Ready {
        /// Duration of the current item in milliseconds.
        duration_ms: u64,
    },
    /// A queued locator could not be loaded. Reported asynchronously; the
    /// engine does not retry.
    LoadFailed {
        /// Locator of the entry that failed to load.
        locator: TrackLocator,
        /// Human-readable failure description.
        message: String,
    },
}

/// Snapshot of the engine's transport position, pulled on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    /// Current position in milliseconds.
    pub position_ms: u64,
    /// Current item duration in milliseconds; 0 when unknown.
    pub duration_ms: u64,
}

/// One supported equalizer band as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualizerBand {
    /// Engine-assigned band index.
    pub index: u16,
    /// Center frequency of the band in hertz.
    pub center_hz: u32,
}

/// Gain bounds of the engine's equalizer, in millibels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GainRange {
    /// Minimum settable gain in millibels (e.g. -1500).
    pub min_mb: i16,
    /// Maximum settable gain in millibels (e.g. 1500).
    pub max_mb: i16,
}

/// Capability query result describing the engine's equalizer.
///
/// Abstracting the device band table behind this type keeps the band mapper
/// pure and testable without hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualizerCapabilities {
    /// Supported bands in ascending index order.
    pub bands: Vec<EqualizerBand>,
    /// Settable gain range.
    pub gain_range: GainRange,
}

/// Contract for platform playback engines driven by the session core.
///
/// Queue commands keep the engine's derived queue aligned with the
/// authoritative playlist. `load_queue` replaces the queue and resets to
/// index 0 without starting playback; `append_track` grows the queue by one
/// and, when the queue was empty, primes it for playback without starting it.
#[async_trait]
pub trait PlaybackPort: Send + Sync {
    /// Replace the queue with `tracks`, resetting to index 0. Does not
    /// auto-play.
    async fn load_queue(&self, tracks: &[Track]) -> Result<()>;

    /// Append one track to the queue. An empty queue is primed for playback
    /// but playback is not started.
    async fn append_track(&self, track: &Track) -> Result<()>;

    /// Remove every queue entry.
    async fn clear_queue(&self) -> Result<()>;

    /// Begin or resume playback.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping position.
    async fn pause(&self) -> Result<()>;

    /// Seek within the current item to an absolute position.
    async fn seek(&self, position_ms: u64) -> Result<()>;

    /// Advance to the next queue entry.
    async fn skip_next(&self) -> Result<()>;

    /// Return to the previous queue entry.
    async fn skip_previous(&self) -> Result<()>;

    /// Jump to the queue entry at `index` and start playback.
    async fn play_at(&self, index: usize) -> Result<()>;

    /// Set playback volume, normalized to `0.0..=1.0`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Apply a gain (millibels) to the equalizer band at `band`.
    async fn set_equalizer_band(&self, band: u16, gain_mb: i16) -> Result<()>;

    /// Describe the engine's equalizer bands and gain range.
    fn equalizer_capabilities(&self) -> EqualizerCapabilities;

    /// Pull the current transport position. Pure read; carries no ordering
    /// dependency with queue commands.
    async fn progress(&self) -> Result<Progress>;

    /// Subscribe to the engine's event stream. Each call returns an
    /// independent receiver of all future events.
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_defaults_to_zero() {
        let progress = Progress::default();
        assert_eq!(progress.position_ms, 0);
        assert_eq!(progress.duration_ms, 0);
    }

    #[test]
    fn engine_event_serializes_with_tag() {
        let event = EngineEvent::Transition { index: 3 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("Transition"));
        assert!(json.contains('3'));
    }
}
