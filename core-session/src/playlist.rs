//! The authoritative playlist.
//!
//! Exactly one `Playlist` instance is owned by the session synchronizer; the
//! playback engine holds a *derived copy* (its queue) that the synchronizer
//! keeps in lock-step. Order is playback order. Duplicate locators are
//! disallowed by construction: [`Playlist::push`] rejects them, so no caller
//! ever needs to re-check.

use bridge_traits::{Track, TrackLocator};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered, duplicate-free sequence of tracks with a display identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    /// Playlist identity; a fresh scan assigns a fresh one.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    tracks: Vec<Track>,
}

impl Playlist {
    /// Create an empty playlist with a fresh identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tracks: Vec::new(),
        }
    }

    /// Tracks in playback order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the playlist has no tracks.
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`, when in bounds.
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Index of the track with `locator`, when present.
    pub fn position(&self, locator: &TrackLocator) -> Option<usize> {
        self.tracks.iter().position(|t| &t.locator == locator)
    }

    /// Append a track, rejecting duplicate locators.
    ///
    /// Returns whether the track was accepted.
    pub fn push(&mut self, track: Track) -> bool {
        if self.position(&track.locator).is_some() {
            return false;
        }
        self.tracks.push(track);
        true
    }

    /// Remove the track with `locator`, keeping order of the rest.
    ///
    /// Returns whether anything was removed; removing an absent locator is a
    /// no-op, which makes removal idempotent.
    pub fn remove(&mut self, locator: &TrackLocator) -> bool {
        match self.position(locator) {
            Some(index) => {
                self.tracks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replace the contents with a uniformly random permutation of itself.
    pub fn shuffle(&mut self) {
        self.tracks.shuffle(&mut rand::thread_rng());
    }
}
