//! Track identity and metadata types shared across collaborator seams.
//!
//! A [`TrackLocator`] is the opaque, stable key for a track's backing storage
//! object. All track matching in the core happens by locator equality; two
//! `Track` values with the same locator refer to the same storage object even
//! when their metadata differs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier for a track's backing storage object.
///
/// Typically a filesystem path or a tree/document URI, but the core never
/// inspects the contents; it only compares locators for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackLocator(String);

impl TrackLocator {
    /// Wrap a raw locator string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the underlying string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TrackLocator {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for TrackLocator {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Metadata for a track discovered on storage.
///
/// Immutable once created; refreshing metadata produces a new `Track` value,
/// never a mutation of an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Stable identity of the backing storage object.
    pub locator: TrackLocator,
    /// Display title (file stem when no tag is present).
    pub title: String,
    /// Artist tag, when present.
    pub artist: Option<String>,
    /// Album tag, when present.
    pub album: Option<String>,
    /// Duration in milliseconds; 0 when unknown at scan time.
    pub duration_ms: u64,
    /// Filesystem path of the backing file.
    pub file_path: String,
    /// File format tag (lowercased extension, e.g. "mp3").
    #[serde(default)]
    pub format: String,
    /// Average bitrate in kbps; 0 when unknown.
    #[serde(default)]
    pub bitrate_kbps: u32,
    /// File size in bytes; 0 when unknown.
    #[serde(default)]
    pub size_bytes: u64,
}

impl Track {
    /// Create a track with only the fields every source can provide.
    /// Format, bitrate and size default to unknown.
    pub fn new(locator: impl Into<TrackLocator>, title: impl Into<String>) -> Self {
        let locator = locator.into();
        let file_path = locator.as_str().to_string();
        Self {
            locator,
            title: title.into(),
            artist: None,
            album: None,
            duration_ms: 0,
            file_path,
            format: String::new(),
            bitrate_kbps: 0,
            size_bytes: 0,
        }
    }
}
