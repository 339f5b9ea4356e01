//! # Local Filesystem Provider
//!
//! Implements the `bridge-traits` collaborator seams over a local disk:
//!
//! - [`LocalScanner`]: recursive folder walk with `lofty` tag probing
//! - [`LocalFileMover`]: rename-or-copy file relocation
//! - [`JsonSettingsStore`]: settings and playlist records as JSON documents
//!   with whole-record atomic replacement
//!
//! All blocking filesystem work runs on `spawn_blocking` workers; the async
//! surface never touches the disk directly.

pub mod error;
pub mod mover;
pub mod scanner;
pub mod settings;

pub use error::{LocalFsError, Result};
pub use mover::LocalFileMover;
pub use scanner::LocalScanner;
pub use settings::JsonSettingsStore;
