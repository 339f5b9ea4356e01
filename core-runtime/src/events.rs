//! # Notification Event Bus
//!
//! Side-channel notification stream for the player core, built on
//! `tokio::sync::broadcast`. The session synchronizer converts collaborator
//! failures and lifecycle milestones into typed [`CoreEvent`]s here; the
//! rendering layer subscribes and turns them into transient user-facing
//! messages (toasts, status lines).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     emit      ┌───────────┐
//! │ Synchronizer ├──────────────>│           │
//! └──────────────┘               │ EventBus  │     subscribe    ┌────────────┐
//!                                │ (broadcast├─────────────────>│ Subscriber │
//! ┌──────────────┐     emit      │  channel) │                  └────────────┘
//! │ Scan forward ├──────────────>│           │     subscribe    ┌────────────┐
//! └──────────────┘               │           ├─────────────────>│ Subscriber │
//!                                └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, ScanNotice};
//!
//! let bus = EventBus::new(100);
//! let mut subscriber = bus.subscribe();
//!
//! bus.emit(CoreEvent::Scan(ScanNotice::FolderFailed {
//!     message: "cannot read /music/broken: permission denied".to_string(),
//! }))
//! .ok();
//! ```
//!
//! ## Error Handling
//!
//! `tokio::sync::broadcast` produces two receive errors:
//!
//! - `RecvError::Lagged(n)`: the subscriber missed `n` events. Non-fatal;
//!   receiving continues with the next event.
//! - `RecvError::Closed`: all senders dropped; treat as shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that fall behind by more than this receive
/// `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level notification enum published through the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Scan lifecycle and per-folder failures.
    Scan(ScanNotice),
    /// Playlist persistence and mutation outcomes.
    Library(LibraryNotice),
    /// Playback engine failures.
    Playback(PlaybackNotice),
    /// Physical storage operation outcomes.
    Storage(StorageNotice),
}

impl CoreEvent {
    /// Human-readable one-line description, suitable for a transient message.
    pub fn description(&self) -> String {
        match self {
            CoreEvent::Scan(e) => e.description(),
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Storage(e) => e.description(),
        }
    }

    /// Severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Scan(ScanNotice::FolderFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Library(LibraryNotice::PersistFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackNotice::LoadFailed { .. }) => EventSeverity::Error,
            CoreEvent::Storage(StorageNotice::MoveFailed { .. }) => EventSeverity::Error,
            _ => EventSeverity::Info,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Informational events.
    Info,
    /// Recovered, degraded-result events.
    Warning,
    /// Failed operations.
    Error,
}

// ============================================================================
// Scan Notices
// ============================================================================

/// Notifications about the folder scan lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum ScanNotice {
    /// A scan of the given folder set started.
    Started {
        /// Scan generation identifier.
        generation: u64,
        /// Number of folders in the scan.
        folder_count: usize,
    },
    /// One folder could not be enumerated; the scan continued. The message
    /// names the folder.
    FolderFailed {
        /// Failure description, naming the folder.
        message: String,
    },
    /// The scan ran to completion.
    Completed {
        /// Scan generation identifier.
        generation: u64,
        /// Number of tracks in the resulting playlist.
        track_count: usize,
        /// Number of folders that failed during the scan.
        error_count: usize,
    },
}

impl ScanNotice {
    fn description(&self) -> String {
        match self {
            ScanNotice::Started { folder_count, .. } => {
                format!("Scanning {folder_count} folder(s)")
            }
            ScanNotice::FolderFailed { message } => format!("Scan error: {message}"),
            ScanNotice::Completed { track_count, .. } => {
                format!("Library scan finished: {track_count} track(s)")
            }
        }
    }
}

// ============================================================================
// Library Notices
// ============================================================================

/// Notifications about the authoritative playlist and its persistence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum LibraryNotice {
    /// A track was removed from the playlist.
    TrackRemoved {
        /// Title of the removed track.
        title: String,
    },
    /// Reading or writing a persisted record failed; in-memory state remains
    /// authoritative and the next mutation retries the write.
    PersistFailed {
        /// The record involved ("settings" or "playlist").
        record: String,
        /// Failure description.
        message: String,
    },
}

impl LibraryNotice {
    fn description(&self) -> String {
        match self {
            LibraryNotice::TrackRemoved { title } => format!("Removed {title}"),
            LibraryNotice::PersistFailed { record, message } => {
                format!("{record} persistence failed: {message}")
            }
        }
    }
}

// ============================================================================
// Playback Notices
// ============================================================================

/// Notifications about playback engine failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackNotice {
    /// The engine reported that a queued locator failed to load.
    LoadFailed {
        /// Locator that failed.
        locator: String,
        /// Failure description.
        message: String,
    },
}

impl PlaybackNotice {
    fn description(&self) -> String {
        match self {
            PlaybackNotice::LoadFailed { locator, message } => {
                format!("Playback failed for {locator}: {message}")
            }
        }
    }
}

// ============================================================================
// Storage Notices
// ============================================================================

/// Notifications about physical storage operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum StorageNotice {
    /// A track file was moved to the configured target folder.
    TrackMoved {
        /// Title of the moved track.
        title: String,
        /// Target folder locator.
        target: String,
    },
    /// Moving a track file failed; the playlist was left untouched.
    MoveFailed {
        /// Title of the track that could not be moved.
        title: String,
        /// Failure description.
        message: String,
    },
    /// Move-current was requested without a configured target folder.
    MoveTargetUnset,
}

impl StorageNotice {
    fn description(&self) -> String {
        match self {
            StorageNotice::TrackMoved { title, target } => {
                format!("Moved {title} to {target}")
            }
            StorageNotice::MoveFailed { title, message } => {
                format!("Could not move {title}: {message}")
            }
            StorageNotice::MoveTargetUnset => "No move target folder configured".to_string(),
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central notification bus for publishing and subscribing to [`CoreEvent`]s.
///
/// Uses `tokio::sync::broadcast` internally:
/// - multiple producers (clone the `EventBus`)
/// - multiple consumers (each `subscribe()` creates a new receiver)
/// - non-blocking sends; events are cloned per subscriber
/// - lagging detection for slow subscribers
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// when there are none. A bus with no subscribers is not a failure for
    /// the emitter; callers typically `ok()` the result.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Create a new subscriber receiving all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` wrapper with predicate filtering.
///
/// Lets a subscriber consume only a slice of the notification traffic, e.g.
/// errors only:
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream, EventSeverity};
///
/// let bus = EventBus::new(100);
/// let errors =
///     EventStream::new(bus.subscribe()).filter(|e| e.severity() == EventSeverity::Error);
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Create an event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Add a filter; only matching events are returned by `recv`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receive the next event passing the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` when the subscriber fell behind by `n` events;
    /// `RecvError::Closed` when all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            let Some(filter) = &self.filter else {
                return Ok(event);
            };
            if filter(&event) {
                return Ok(event);
            }
        }
    }

    /// Receive without blocking; `None` when no matching event is buffered.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    let Some(filter) = &self.filter else {
                        return Some(Ok(event));
                    };
                    if filter(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_counts_subscribers() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn emit_without_subscribers_errors() {
        let bus = EventBus::new(10);
        let event = CoreEvent::Storage(StorageNotice::MoveTargetUnset);
        assert!(bus.emit(event).is_err());
    }

    #[tokio::test]
    async fn all_subscribers_receive_the_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Scan(ScanNotice::Started {
            generation: 1,
            folder_count: 2,
        });
        bus.emit(event.clone()).ok();

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn stream_filter_skips_non_matching_events() {
        let bus = EventBus::new(10);
        let mut errors = EventStream::new(bus.subscribe())
            .filter(|event| event.severity() == EventSeverity::Error);

        bus.emit(CoreEvent::Scan(ScanNotice::Completed {
            generation: 1,
            track_count: 4,
            error_count: 0,
        }))
        .ok();
        let failure = CoreEvent::Storage(StorageNotice::MoveFailed {
            title: "a".to_string(),
            message: "disk full".to_string(),
        });
        bus.emit(failure.clone()).ok();

        assert_eq!(errors.recv().await.unwrap(), failure);
    }

    #[tokio::test]
    async fn lagged_subscriber_is_reported() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Scan(ScanNotice::Started {
                generation: i,
                folder_count: 1,
            }))
            .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn severity_classification() {
        let error = CoreEvent::Library(LibraryNotice::PersistFailed {
            record: "playlist".to_string(),
            message: "read-only filesystem".to_string(),
        });
        assert_eq!(error.severity(), EventSeverity::Error);

        let warning = CoreEvent::Scan(ScanNotice::FolderFailed {
            message: "cannot read /music/broken: permission denied".to_string(),
        });
        assert_eq!(warning.severity(), EventSeverity::Warning);

        let info = CoreEvent::Library(LibraryNotice::TrackRemoved {
            title: "a".to_string(),
        });
        assert_eq!(info.severity(), EventSeverity::Info);
    }

    #[test]
    fn descriptions_mention_the_subject() {
        let event = CoreEvent::Scan(ScanNotice::FolderFailed {
            message: "cannot read /music/f2: not a directory".to_string(),
        });
        assert!(event.description().contains("/music/f2"));
    }

    #[test]
    fn events_round_trip_through_json() {
        let event = CoreEvent::Storage(StorageNotice::TrackMoved {
            title: "a".to_string(),
            target: "/music/keep".to_string(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[tokio::test]
    async fn try_recv_empty_returns_none() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());
    }
}
