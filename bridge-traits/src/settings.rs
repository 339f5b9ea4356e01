//! Settings store contract and the persisted settings record.
//!
//! The store persists two records: the [`PlayerSettings`] key/value record and
//! the last built track list. Both are readable as streams (the settings
//! record via [`SettingsStore::subscribe`]) and written atomically. The
//! session core is the single writer; read-modify-write atomicity is provided
//! by its serialized mutation discipline, so the store only needs
//! whole-record replacement semantics.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::watch;

use crate::error::Result;
use crate::track::Track;

/// Default equalizer bands (Hz → dB) when no record is persisted yet.
const DEFAULT_EQ_BANDS: [u32; 5] = [60, 230, 910, 3600, 14_000];

/// Settings the listener can adjust at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Folder locators selected for scanning, in scan order, duplicates
    /// removed.
    pub folders: Vec<String>,
    /// Target folder locator for the move-current operation.
    pub move_target: String,
    /// Requested equalizer gains, band center frequency (Hz) → gain (dB).
    pub equalizer: BTreeMap<u32, i16>,
    /// Playback volume in `0.0..=1.0`.
    pub volume: f32,
    /// Whether a finished track is evicted from the playlist.
    pub remove_on_end: bool,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            move_target: String::new(),
            equalizer: DEFAULT_EQ_BANDS.iter().map(|&hz| (hz, 0)).collect(),
            volume: 0.5,
            remove_on_end: false,
        }
    }
}

/// Contract for the settings persistence collaborator.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the current settings record.
    async fn load(&self) -> Result<PlayerSettings>;

    /// Atomically replace the settings record.
    async fn save(&self, settings: &PlayerSettings) -> Result<()>;

    /// Observe the settings record as a stream. The receiver holds the
    /// latest record and is updated on every successful save.
    fn subscribe(&self) -> watch::Receiver<PlayerSettings>;

    /// Read the last built track list, in playback order.
    async fn load_playlist(&self) -> Result<Vec<Track>>;

    /// Atomically replace the persisted track list.
    async fn save_playlist(&self, tracks: &[Track]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_carry_the_five_standard_bands() {
        let settings = PlayerSettings::default();
        assert_eq!(settings.volume, 0.5);
        assert!(!settings.remove_on_end);
        let bands: Vec<u32> = settings.equalizer.keys().copied().collect();
        assert_eq!(bands, vec![60, 230, 910, 3600, 14_000]);
        assert!(settings.equalizer.values().all(|&gain| gain == 0));
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let settings: PlayerSettings = serde_json::from_str("{\"volume\":0.8}").unwrap();
        assert_eq!(settings.volume, 0.8);
        assert_eq!(settings.equalizer.len(), 5);
    }
}
