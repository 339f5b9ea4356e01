//! # Core Session
//!
//! The state synchronization engine of the Sift player. One actor, the
//! [`Synchronizer`], owns the authoritative playlist, the player settings
//! and the observed playback view, serializes every mutation source through
//! a single event loop, and republishes a merged [`SessionState`] snapshot
//! after each change.
//!
//! Hosts interact through a [`SessionHandle`]: submit [`Intent`]s, watch
//! state snapshots, subscribe to transient notices. All platform concerns
//! (scanning, playback, persistence, file moves) stay behind the
//! `bridge-traits` seams, so this crate contains no I/O of its own.
//!
//! ```no_run
//! use std::sync::Arc;
//! use core_session::{Intent, SessionConfig, Synchronizer};
//! # use bridge_traits::{FileMover, LibraryScanner, PlaybackPort, SettingsStore};
//! # async fn demo(
//! #     scanner: Arc<dyn LibraryScanner>,
//! #     engine: Arc<dyn PlaybackPort>,
//! #     store: Arc<dyn SettingsStore>,
//! #     mover: Arc<dyn FileMover>,
//! # ) -> core_session::Result<()> {
//! let handle = Synchronizer::start(scanner, engine, store, mover, SessionConfig::default());
//! handle.submit(Intent::SetFolders(vec!["/music".into()])).await?;
//! let state = handle.state().borrow().clone();
//! println!("{} track(s)", state.playlist.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod equalizer;
pub mod error;
pub mod intent;
pub mod playlist;
pub mod state;
pub mod synchronizer;

pub use config::SessionConfig;
pub use equalizer::{clamp_gain_mb, map_band, select_band, BandSetting};
pub use error::{Result, SessionError};
pub use intent::Intent;
pub use playlist::Playlist;
pub use state::{PlaybackView, ScanPhase, ScanStatus, SessionState};
pub use synchronizer::{SessionHandle, Synchronizer};
