//! # Core Runtime
//!
//! Ambient runtime services shared by the Sift player crates:
//!
//! - [`events`]: the typed notification [`EventBus`](events::EventBus) the
//!   session core publishes transient user-facing notices on
//! - [`logging`]: `tracing` subscriber setup
//!
//! Nothing here owns player state; `core-session` does.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Result, RuntimeError};
pub use events::{
    CoreEvent, EventBus, EventSeverity, EventStream, LibraryNotice, PlaybackNotice, ScanNotice,
    StorageNotice, DEFAULT_EVENT_BUFFER_SIZE,
};
pub use logging::{init_logging, LogFormat, LoggingConfig};
