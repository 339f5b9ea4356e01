//! Published session state types.
//!
//! [`SessionState`] is the merged, versioned view the synchronizer republishes
//! after every processed message. Subscribers receive immutable snapshots; the
//! synchronizer alone mutates the underlying state.

use bridge_traits::{PlayerSettings, Track};
use serde::{Deserialize, Serialize};

use crate::playlist::Playlist;

/// Synchronizer-observed mirror of the playback engine's transport state.
///
/// Owned by the engine; the synchronizer only updates this view from the
/// engine's event stream and the periodic progress poll.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaybackView {
    /// Track currently loaded in the engine, when any.
    pub current: Option<Track>,
    /// Whether the engine is playing.
    pub playing: bool,
    /// Playback position in milliseconds.
    pub position_ms: u64,
    /// Current item duration in milliseconds; 0 when unknown.
    pub duration_ms: u64,
    /// Index of the current entry in the engine queue.
    pub queue_index: usize,
}

/// Scan lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScanPhase {
    /// No scan in flight.
    #[default]
    Idle,
    /// A scan is producing events.
    Scanning,
}

/// Status of the most recent library scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanStatus {
    /// Current phase.
    pub phase: ScanPhase,
    /// Non-fatal error messages accumulated during the scan.
    pub errors: Vec<String>,
    /// Generation identifier of the scan these fields describe.
    pub generation: u64,
}

/// The merged session view published to subscribers.
///
/// Invariant: `playback.current`, when `Some`, matches an entry of `playlist`
/// by locator, except during the single-event window right after a mutation
/// removed the currently loaded track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current player settings.
    pub settings: PlayerSettings,
    /// The authoritative playlist.
    pub playlist: Playlist,
    /// Observed playback state.
    pub playback: PlaybackView,
    /// Scan status.
    pub scan: ScanStatus,
}

impl SessionState {
    pub(crate) fn initial(playlist: Playlist) -> Self {
        Self {
            settings: PlayerSettings::default(),
            playlist,
            playback: PlaybackView::default(),
            scan: ScanStatus::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_idle_and_empty() {
        let state = SessionState::initial(Playlist::new("Library"));
        assert!(state.playlist.is_empty());
        assert_eq!(state.scan.phase, ScanPhase::Idle);
        assert!(state.playback.current.is_none());
    }

    #[test]
    fn state_serializes_for_host_transport() {
        let state = SessionState::initial(Playlist::new("Library"));
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"playlist\""));
        assert!(json.contains("\"scan\""));
    }
}
