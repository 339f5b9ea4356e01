//! JSON-file settings store.
//!
//! Persists the settings record and the last built track list as two JSON
//! documents in one directory. Writes go through a temp file renamed over the
//! target, so readers never observe a torn record. A missing document reads
//! as the default value; first run is not an error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::trace;

use bridge_traits::{BridgeError, PlayerSettings, SettingsStore, Track};

use crate::error::Result;

const SETTINGS_FILE: &str = "settings.json";
const PLAYLIST_FILE: &str = "playlist.json";

/// [`SettingsStore`] backed by JSON files in a single directory.
pub struct JsonSettingsStore {
    directory: PathBuf,
    watch_tx: watch::Sender<PlayerSettings>,
}

impl JsonSettingsStore {
    /// Create a store rooted at `directory`. The directory is created on the
    /// first write; the watch channel starts at the default record until the
    /// first successful save.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        let (watch_tx, _) = watch::channel(PlayerSettings::default());
        Self {
            directory: directory.into(),
            watch_tx,
        }
    }

    fn settings_path(&self) -> PathBuf {
        self.directory.join(SETTINGS_FILE)
    }

    fn playlist_path(&self) -> PathBuf {
        self.directory.join(PLAYLIST_FILE)
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> bridge_traits::Result<PlayerSettings> {
        let path = self.settings_path();
        run_blocking(move || read_json(&path)).await
    }

    async fn save(&self, settings: &PlayerSettings) -> bridge_traits::Result<()> {
        let path = self.settings_path();
        let record = settings.clone();
        let written = record.clone();
        run_blocking(move || write_json(&path, &record)).await?;
        self.watch_tx.send_replace(written);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<PlayerSettings> {
        self.watch_tx.subscribe()
    }

    async fn load_playlist(&self) -> bridge_traits::Result<Vec<Track>> {
        let path = self.playlist_path();
        run_blocking(move || read_json(&path)).await
    }

    async fn save_playlist(&self, tracks: &[Track]) -> bridge_traits::Result<()> {
        let path = self.playlist_path();
        let record = tracks.to_vec();
        run_blocking(move || write_json(&path, &record)).await
    }
}

async fn run_blocking<T, F>(task: F) -> bridge_traits::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(outcome) => outcome.map_err(Into::into),
        Err(join_error) => Err(BridgeError::OperationFailed(join_error.to_string())),
    }
}

fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        trace!(path = %path.display(), "record missing, using default");
        return Ok(T::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Write, then rename over the target so the record is replaced whole.
fn write_json<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let staging = path.with_extension("json.tmp");
    std::fs::write(&staging, serde_json::to_vec_pretty(record)?)?;
    std::fs::rename(&staging, path)?;
    Ok(())
}
