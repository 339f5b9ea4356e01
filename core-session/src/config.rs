//! Session synchronizer configuration.

use std::time::Duration;

/// Tunables for the session synchronizer.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the user-intent queue. Intents beyond this apply
    /// backpressure to the submitter, never reordering.
    pub intent_buffer: usize,

    /// Capacity of the internal scan-event fan-in channel.
    pub scan_buffer: usize,

    /// Capacity of the notification event bus.
    pub event_buffer: usize,

    /// Interval of the periodic playback progress poll.
    pub progress_interval: Duration,

    /// Display name given to a freshly scanned playlist.
    pub scan_playlist_name: String,

    /// Display name given to the playlist restored from persistence.
    pub library_playlist_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            intent_buffer: 64,
            scan_buffer: 256,
            event_buffer: 100,
            progress_interval: Duration::from_millis(1000),
            scan_playlist_name: "Quick Mix".to_string(),
            library_playlist_name: "Library".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SessionConfig::default();
        assert!(config.intent_buffer > 0);
        assert!(config.scan_buffer >= config.intent_buffer);
        assert!(config.progress_interval >= Duration::from_millis(100));
    }
}
