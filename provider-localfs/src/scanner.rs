//! Local filesystem scanner.
//!
//! Walks the configured folders on a blocking worker, probes each candidate
//! file with `lofty` and streams [`ScanEvent`]s back to the session core.
//! Enumeration order is path order within a directory, depth-first across
//! subdirectories. A folder that cannot be read produces one
//! [`ScanEvent::Error`] naming it; the scan continues with the next folder.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lofty::prelude::*;
use lofty::probe::Probe;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use bridge_traits::{LibraryScanner, ScanEvent, Track};

/// Extensions treated as playable audio, lowercased.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "ogg"];

/// Default capacity of the event channel handed to the core.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// [`LibraryScanner`] over local directories.
pub struct LocalScanner {
    channel_capacity: usize,
}

impl LocalScanner {
    pub fn new() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Default for LocalScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LibraryScanner for LocalScanner {
    async fn scan(&self, folders: &[String]) -> mpsc::Receiver<ScanEvent> {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let folders = folders.to_vec();
        tokio::task::spawn_blocking(move || {
            for folder in &folders {
                if !scan_folder(Path::new(folder), &tx) {
                    // Receiver gone: the scan was abandoned.
                    trace!(folder, "scan abandoned");
                    return;
                }
            }
        });
        rx
    }
}

/// Walk one configured folder depth-first. Returns `false` when the event
/// receiver was dropped.
fn scan_folder(root: &Path, tx: &mpsc::Sender<ScanEvent>) -> bool {
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(error) => {
                if dir == root {
                    let message = format!("cannot read {}: {error}", dir.display());
                    if tx.blocking_send(ScanEvent::Error { message }).is_err() {
                        return false;
                    }
                } else {
                    // Subdirectory failures are skipped; the folder itself
                    // was readable.
                    warn!(dir = %dir.display(), %error, "skipping unreadable subdirectory");
                }
                continue;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .collect();
        paths.sort();

        for path in paths {
            if path.is_dir() {
                pending.push(path);
            } else if is_audio(&path) {
                let track = probe_track(&path);
                if tx.blocking_send(ScanEvent::TrackFound { track }).is_err() {
                    return false;
                }
            }
        }
    }
    true
}

fn is_audio(path: &Path) -> bool {
    path.extension()
        .map(|extension| extension.to_string_lossy().to_lowercase())
        .is_some_and(|extension| AUDIO_EXTENSIONS.contains(&extension.as_str()))
}

/// Build a [`Track`] for `path`, reading tags and audio properties when the
/// file parses and falling back to the file stem otherwise.
fn probe_track(path: &Path) -> Track {
    let locator = path.to_string_lossy().to_string();
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| locator.clone());

    let mut track = Track::new(locator, stem);
    track.format = path
        .extension()
        .map(|extension| extension.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if let Ok(metadata) = std::fs::metadata(path) {
        track.size_bytes = metadata.len();
    }

    match Probe::open(path).and_then(|probe| probe.read()) {
        Ok(tagged) => {
            let properties = tagged.properties();
            track.duration_ms = properties.duration().as_millis() as u64;
            track.bitrate_kbps = properties.audio_bitrate().unwrap_or(0);
            if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                if let Some(title) = tag.title() {
                    if !title.is_empty() {
                        track.title = title.to_string();
                    }
                }
                track.artist = tag.artist().map(|artist| artist.to_string());
                track.album = tag.album().map(|album| album.to_string());
            }
        }
        Err(error) => {
            debug!(path = %track.locator, %error, "tag probe failed, using file name");
        }
    }
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    async fn drain(mut rx: mpsc::Receiver<ScanEvent>) -> Vec<ScanEvent> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn finds_audio_files_recursively_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"not really audio").unwrap();
        fs::write(dir.path().join("a.flac"), b"not really audio").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/c.ogg"), b"not really audio").unwrap();

        let scanner = LocalScanner::new();
        let rx = scanner
            .scan(&[dir.path().to_string_lossy().to_string()])
            .await;
        let events = drain(rx).await;

        let titles: Vec<String> = events
            .iter()
            .map(|event| match event {
                ScanEvent::TrackFound { track } => track.title.clone(),
                ScanEvent::Error { message } => panic!("unexpected error: {message}"),
            })
            .collect();
        // Files of the folder first (path order), then the subdirectory.
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unparsable_files_fall_back_to_the_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("garbage.mp3"), b"\0\0\0\0").unwrap();

        let scanner = LocalScanner::new();
        let rx = scanner
            .scan(&[dir.path().to_string_lossy().to_string()])
            .await;
        let events = drain(rx).await;

        assert_eq!(events.len(), 1);
        match &events[0] {
            ScanEvent::TrackFound { track } => {
                assert_eq!(track.title, "garbage");
                assert_eq!(track.format, "mp3");
                assert_eq!(track.size_bytes, 4);
                assert_eq!(track.duration_ms, 0);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_folder_yields_one_error_and_the_scan_continues() {
        let readable = tempfile::tempdir().unwrap();
        fs::write(readable.path().join("a.mp3"), b"not really audio").unwrap();
        let missing = readable.path().join("does-not-exist");

        let scanner = LocalScanner::new();
        let rx = scanner
            .scan(&[
                missing.to_string_lossy().to_string(),
                readable.path().to_string_lossy().to_string(),
            ])
            .await;
        let events = drain(rx).await;

        assert_eq!(events.len(), 2);
        match &events[0] {
            ScanEvent::Error { message } => {
                assert!(message.contains("does-not-exist"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(&events[1], ScanEvent::TrackFound { .. }));
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(is_audio(Path::new("/music/A.MP3")));
        assert!(is_audio(Path::new("/music/a.flac")));
        assert!(!is_audio(Path::new("/music/cover.jpg")));
        assert!(!is_audio(Path::new("/music/no-extension")));
    }
}
