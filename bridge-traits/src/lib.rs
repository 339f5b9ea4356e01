//! # Collaborator Bridge Traits
//!
//! Seam contracts between the Sift session core and its external
//! collaborators, plus the data types that cross those seams.
//!
//! ## Overview
//!
//! The session core in `core-session` never touches a filesystem, a media
//! engine or a preferences file directly. Each of those concerns sits behind
//! a trait defined here and is injected at construction time:
//!
//! - [`LibraryScanner`](scanner::LibraryScanner): folder enumeration
//!   producing a lazy [`ScanEvent`](scanner::ScanEvent) sequence
//! - [`PlaybackPort`](playback::PlaybackPort): queue/transport commands and
//!   the [`EngineEvent`](playback::EngineEvent) stream
//! - [`SettingsStore`](settings::SettingsStore): persisted
//!   [`PlayerSettings`](settings::PlayerSettings) and the last built track
//!   list
//! - [`FileMover`](storage::FileMover): physical relocation of track files
//!
//! Concrete local-filesystem implementations live in `provider-localfs`;
//! hosts with other storage or media stacks supply their own.
//!
//! ## Error Handling
//!
//! All traits report failures through [`BridgeError`](error::BridgeError).
//! Implementations convert platform-specific errors into it and include
//! enough context (paths, locators) to make the resulting notifications
//! actionable.
//!
//! ## Thread Safety
//!
//! Every trait requires `Send + Sync`; implementations are shared across
//! async tasks as `Arc<dyn …>`.

pub mod error;
pub mod playback;
pub mod scanner;
pub mod settings;
pub mod storage;
pub mod track;

pub use error::{BridgeError, Result};

// Re-export commonly used types
pub use playback::{
    EngineEvent, EqualizerBand, EqualizerCapabilities, GainRange, PlaybackPort, Progress,
};
pub use scanner::{LibraryScanner, ScanEvent};
pub use settings::{PlayerSettings, SettingsStore};
pub use storage::FileMover;
pub use track::{Track, TrackLocator};
