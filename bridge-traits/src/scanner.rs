//! Library scanner contract.
//!
//! A scanner turns an ordered set of folder locators into a lazy sequence of
//! [`ScanEvent`]s emitted on a background execution context. The sequence is
//! finite (bounded by folder count) and not restartable mid-stream: a fresh
//! `scan` call re-scans from the first folder.
//!
//! Per folder, the scanner emits either a run of [`ScanEvent::TrackFound`]
//! events or, on folder-access failure, a single [`ScanEvent::Error`] for that
//! folder only; the scan continues with the next folder. Within a folder,
//! emission order is enumeration order (scanner-defined); there is no ordering
//! guarantee across folders.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::track::Track;

/// One step of an in-progress library scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ScanEvent {
    /// A playable track was discovered.
    TrackFound {
        /// The discovered track.
        track: Track,
    },
    /// A folder could not be enumerated. Non-fatal; the scan continues.
    Error {
        /// Human-readable description naming the failed folder.
        message: String,
    },
}

/// Contract for folder scanners consumed by the session core.
///
/// Implementations own the enumeration mechanics (filesystem, content
/// provider, remote store); the core only drains the returned channel.
/// Closing the channel marks scan completion: success, partial error and
/// total failure all end the same way.
#[async_trait]
pub trait LibraryScanner: Send + Sync {
    /// Start scanning `folders` in order on a background execution context.
    ///
    /// Events arrive on the returned channel as they are produced. Dropping
    /// the receiver is the caller's way of abandoning the scan; the
    /// implementation must tolerate send failures after that point.
    async fn scan(&self, folders: &[String]) -> mpsc::Receiver<ScanEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_event_round_trips_through_json() {
        let event = ScanEvent::Error {
            message: "cannot read /music/missing".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: ScanEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
