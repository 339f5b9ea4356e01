//! The session synchronizer.
//!
//! A single-consumer actor that owns every piece of mutable session state and
//! serializes all mutation sources through one `select!` loop:
//!
//! ```text
//!   intents (mpsc) ────────┐
//!   scan events (mpsc) ────┤
//!   engine events (bcast) ─┼──▶ [ event loop ] ──▶ watch<SessionState>
//!   settings (watch) ──────┤        │
//!   progress tick ─────────┘        └─────────────▶ EventBus (notices)
//! ```
//!
//! Because exactly one task applies mutations, read-modify-write sequences on
//! the playlist and settings need no locks: FIFO intent order is mutation
//! order. Collaborators are reached only through the `bridge-traits` seams,
//! so the loop runs identically against a real engine or a scripted fake.
//!
//! Scans are generation-tagged. Starting a scan bumps the generation and
//! cancels the forwarder of the previous one; events still in flight from a
//! superseded scan carry a stale tag and are dropped, never merged.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace, warn};

use bridge_traits::{
    EngineEvent, FileMover, LibraryScanner, PlaybackPort, PlayerSettings, ScanEvent,
    SettingsStore, Track,
};
use core_runtime::{
    CoreEvent, EventBus, LibraryNotice, PlaybackNotice, ScanNotice, StorageNotice,
};

use crate::config::SessionConfig;
use crate::equalizer;
use crate::error::{Result, SessionError};
use crate::intent::Intent;
use crate::playlist::Playlist;
use crate::state::{ScanPhase, ScanStatus, SessionState};

// ============================================================================
// Handle
// ============================================================================

/// Client-side handle to a running session loop.
///
/// Cheap to clone; all clones feed the same loop. Dropping every handle closes
/// the intent queue, which stops the loop.
#[derive(Clone)]
pub struct SessionHandle {
    intents: mpsc::Sender<Intent>,
    state: watch::Receiver<SessionState>,
    bus: EventBus,
}

impl SessionHandle {
    /// Queue an intent for the session loop. Applies backpressure when the
    /// queue is full; never reorders.
    pub async fn submit(&self, intent: Intent) -> Result<()> {
        self.intents
            .send(intent)
            .await
            .map_err(|_| SessionError::Terminated)
    }

    /// Subscribe to published state snapshots. The receiver always holds the
    /// latest snapshot.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// The latest published snapshot.
    pub fn current_state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Subscribe to transient user-facing notices.
    pub fn notifications(&self) -> broadcast::Receiver<CoreEvent> {
        self.bus.subscribe()
    }
}

// ============================================================================
// Scan fan-in
// ============================================================================

/// Internal envelope carrying scanner output into the loop, tagged with the
/// generation of the scan that produced it.
enum ScanMessage {
    Event { generation: u64, event: ScanEvent },
    Finished { generation: u64 },
}

impl ScanMessage {
    fn generation(&self) -> u64 {
        match self {
            ScanMessage::Event { generation, .. } | ScanMessage::Finished { generation } => {
                *generation
            }
        }
    }
}

// ============================================================================
// Synchronizer
// ============================================================================

/// The session actor. Constructed and spawned via [`Synchronizer::start`];
/// lives on its own task until a [`Intent::Shutdown`] arrives or every
/// [`SessionHandle`] is dropped.
pub struct Synchronizer {
    scanner: Arc<dyn LibraryScanner>,
    engine: Arc<dyn PlaybackPort>,
    store: Arc<dyn SettingsStore>,
    mover: Arc<dyn FileMover>,

    bus: EventBus,
    config: SessionConfig,

    state: SessionState,
    /// Single-slot memory of the track that was current before the latest
    /// `Transition`; drives remove-on-end eviction.
    previous_track: Option<Track>,
    /// The last record successfully written to the store; publications
    /// matching it are echoes of this session's own saves.
    last_saved: PlayerSettings,
    /// Cancels the in-flight scan forwarder, when one exists.
    scan_cancel: Option<CancellationToken>,

    scan_tx: mpsc::Sender<ScanMessage>,
    state_tx: watch::Sender<SessionState>,
}

impl Synchronizer {
    /// Spawn the session loop and return a handle to it.
    pub fn start(
        scanner: Arc<dyn LibraryScanner>,
        engine: Arc<dyn PlaybackPort>,
        store: Arc<dyn SettingsStore>,
        mover: Arc<dyn FileMover>,
        config: SessionConfig,
    ) -> SessionHandle {
        let (intent_tx, intent_rx) = mpsc::channel(config.intent_buffer);
        let (scan_tx, scan_rx) = mpsc::channel(config.scan_buffer);
        let (state_tx, state_rx) = watch::channel(SessionState::initial(Playlist::new(
            config.library_playlist_name.clone(),
        )));
        let bus = EventBus::new(config.event_buffer);

        let state = state_tx.borrow().clone();
        let synchronizer = Synchronizer {
            scanner,
            engine,
            store,
            mover,
            bus: bus.clone(),
            config,
            state,
            previous_track: None,
            last_saved: PlayerSettings::default(),
            scan_cancel: None,
            scan_tx,
            state_tx,
        };
        tokio::spawn(synchronizer.run(intent_rx, scan_rx));

        SessionHandle {
            intents: intent_tx,
            state: state_rx,
            bus,
        }
    }

    async fn run(
        mut self,
        mut intents: mpsc::Receiver<Intent>,
        mut scan_rx: mpsc::Receiver<ScanMessage>,
    ) {
        let mut engine_events = self.engine.subscribe();
        let mut settings_rx = self.store.subscribe();
        let mut progress = tokio::time::interval(self.config.progress_interval);
        progress.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.startup().await;
        self.publish();

        let mut engine_open = true;
        let mut settings_open = true;
        loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(Intent::Shutdown) | None => break,
                    Some(intent) => self.handle_intent(intent).await,
                },
                Some(message) = scan_rx.recv() => {
                    self.handle_scan_message(message).await;
                }
                event = engine_events.recv(), if engine_open => match event {
                    Ok(event) => self.handle_engine_event(event).await,
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "engine event stream lagged");
                    }
                    Err(RecvError::Closed) => engine_open = false,
                },
                changed = settings_rx.changed(), if settings_open => match changed {
                    Ok(()) => {
                        let settings = settings_rx.borrow_and_update().clone();
                        self.merge_external_settings(settings).await;
                    }
                    Err(_) => settings_open = false,
                },
                _ = progress.tick() => self.poll_progress().await,
            }
            self.publish();
        }
        debug!("session loop stopped");
    }

    /// Cold start: restore settings, push them into the engine, then restore
    /// the persisted playlist as the queue.
    #[instrument(skip(self))]
    async fn startup(&mut self) {
        match self.store.load().await {
            Ok(settings) => {
                self.last_saved = settings.clone();
                self.state.settings = settings;
            }
            Err(error) => {
                warn!(%error, "settings restore failed, using defaults");
                self.notify(CoreEvent::Library(LibraryNotice::PersistFailed {
                    record: "settings".to_string(),
                    message: error.to_string(),
                }));
            }
        }

        let caps = self.engine.equalizer_capabilities();
        for (&center_hz, &gain_db) in &self.state.settings.equalizer.clone() {
            match equalizer::map_band(center_hz, gain_db, &caps) {
                Ok(setting) => {
                    if let Err(error) = self
                        .engine
                        .set_equalizer_band(setting.band, setting.gain_mb)
                        .await
                    {
                        warn!(%error, band = setting.band, "equalizer restore failed");
                    }
                }
                Err(error) => {
                    warn!(%error, "equalizer restore skipped");
                    break;
                }
            }
        }
        if let Err(error) = self.engine.set_volume(self.state.settings.volume).await {
            warn!(%error, "volume restore failed");
        }

        match self.store.load_playlist().await {
            Ok(tracks) => {
                let mut playlist = Playlist::new(self.config.library_playlist_name.clone());
                for track in tracks {
                    playlist.push(track);
                }
                if let Err(error) = self.engine.load_queue(playlist.tracks()).await {
                    warn!(%error, "queue restore failed");
                }
                let head = playlist.get(0).cloned();
                self.state.playlist = playlist;
                self.set_current(head, 0);
            }
            Err(error) => {
                warn!(%error, "playlist restore failed, starting empty");
                self.notify(CoreEvent::Library(LibraryNotice::PersistFailed {
                    record: "playlist".to_string(),
                    message: error.to_string(),
                }));
            }
        }
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    async fn handle_intent(&mut self, intent: Intent) {
        trace!(?intent, "applying intent");
        match intent {
            Intent::SetFolders(folders) => {
                let mut seen = HashSet::new();
                let folders: Vec<String> = folders
                    .into_iter()
                    .filter(|folder| seen.insert(folder.clone()))
                    .collect();
                self.state.settings.folders = folders;
                self.save_settings().await;
                self.start_scan().await;
            }
            Intent::SetMoveTarget(target) => {
                self.state.settings.move_target = target;
                self.save_settings().await;
            }
            Intent::SetEqualizerBand {
                frequency_hz,
                gain_db,
            } => {
                let caps = self.engine.equalizer_capabilities();
                match equalizer::map_band(frequency_hz, gain_db, &caps) {
                    Ok(setting) => {
                        if let Err(error) = self
                            .engine
                            .set_equalizer_band(setting.band, setting.gain_mb)
                            .await
                        {
                            warn!(%error, band = setting.band, "equalizer update failed");
                        }
                        let center_hz = caps
                            .bands
                            .iter()
                            .find(|band| band.index == setting.band)
                            .map(|band| band.center_hz)
                            .unwrap_or(frequency_hz);
                        // Record the gain the engine applies, not the raw
                        // request.
                        self.state
                            .settings
                            .equalizer
                            .insert(center_hz, setting.gain_mb / 100);
                        self.save_settings().await;
                    }
                    Err(error) => warn!(%error, "equalizer request ignored"),
                }
            }
            Intent::SetVolume(volume) => {
                let volume = volume.clamp(0.0, 1.0);
                if let Err(error) = self.engine.set_volume(volume).await {
                    warn!(%error, "volume update failed");
                }
                self.state.settings.volume = volume;
                self.save_settings().await;
            }
            Intent::ToggleRemoveOnEnd(enabled) => {
                self.state.settings.remove_on_end = enabled;
                self.save_settings().await;
            }
            Intent::TogglePlayback => {
                let result = if self.state.playback.playing {
                    self.engine.pause().await
                } else {
                    self.engine.play().await
                };
                if let Err(error) = result {
                    warn!(%error, "transport toggle failed");
                }
            }
            Intent::Seek(fraction) => {
                let duration_ms = self.state.playback.duration_ms;
                if duration_ms > 0 {
                    let fraction = f64::from(fraction.clamp(0.0, 1.0));
                    let position_ms = (fraction * duration_ms as f64) as u64;
                    match self.engine.seek(position_ms).await {
                        Ok(()) => self.state.playback.position_ms = position_ms,
                        Err(error) => warn!(%error, "seek failed"),
                    }
                }
            }
            Intent::SkipNext => {
                if let Err(error) = self.engine.skip_next().await {
                    warn!(%error, "skip-next failed");
                }
            }
            Intent::SkipPrevious => {
                if let Err(error) = self.engine.skip_previous().await {
                    warn!(%error, "skip-previous failed");
                }
            }
            Intent::PlayTrackAt(index) => {
                if let Some(track) = self.state.playlist.get(index).cloned() {
                    match self.engine.play_at(index).await {
                        Ok(()) => {
                            self.set_current(Some(track), index);
                            self.state.playback.position_ms = 0;
                            self.state.playback.duration_ms = 0;
                        }
                        Err(error) => warn!(%error, index, "play-at failed"),
                    }
                }
            }
            Intent::RemoveCurrent => {
                if let Some(current) = self.state.playback.current.clone() {
                    self.remove_track(&current).await;
                }
            }
            Intent::MoveCurrent => self.move_current().await,
            Intent::Shuffle => {
                self.state.playlist.shuffle();
                if let Err(error) = self.engine.load_queue(self.state.playlist.tracks()).await {
                    warn!(%error, "queue reload after shuffle failed");
                }
                let head = self.state.playlist.get(0).cloned();
                self.set_current(head, 0);
                self.state.playback.position_ms = 0;
                self.state.playback.duration_ms = 0;
                self.persist_playlist().await;
            }
            Intent::RefreshLibrary => self.start_scan().await,
            // Handled by the loop before dispatch.
            Intent::Shutdown => {}
        }
    }

    async fn move_current(&mut self) {
        let target = self.state.settings.move_target.trim().to_string();
        if target.is_empty() {
            self.notify(CoreEvent::Storage(StorageNotice::MoveTargetUnset));
            return;
        }
        let Some(current) = self.state.playback.current.clone() else {
            return;
        };
        match self.mover.move_track(&current, &target).await {
            Ok(()) => {
                self.notify(CoreEvent::Storage(StorageNotice::TrackMoved {
                    title: current.title.clone(),
                    target,
                }));
                self.remove_track(&current).await;
            }
            // Playlist untouched: the file is still where it was.
            Err(error) => self.notify(CoreEvent::Storage(StorageNotice::MoveFailed {
                title: current.title.clone(),
                message: error.to_string(),
            })),
        }
    }

    /// Remove `track` from the playlist and re-derive the engine queue and the
    /// current slot from what remains. Idempotent by locator. Playback
    /// continuity across the queue reload is not guaranteed.
    async fn remove_track(&mut self, track: &Track) {
        if !self.state.playlist.remove(&track.locator) {
            return;
        }
        self.notify(CoreEvent::Library(LibraryNotice::TrackRemoved {
            title: track.title.clone(),
        }));
        if let Err(error) = self.engine.load_queue(self.state.playlist.tracks()).await {
            warn!(%error, "queue reload after removal failed");
        }

        let current_locator = self
            .state
            .playback
            .current
            .as_ref()
            .map(|current| current.locator.clone());
        match current_locator {
            // The loaded track itself was removed: fall back to the queue head.
            Some(locator) if locator == track.locator => {
                let head = self.state.playlist.get(0).cloned();
                self.set_current(head, 0);
                self.state.playback.position_ms = 0;
                self.state.playback.duration_ms = 0;
            }
            // Another entry was removed: the current track shifted index.
            Some(locator) => {
                if let Some(index) = self.state.playlist.position(&locator) {
                    self.state.playback.queue_index = index;
                }
            }
            None => {}
        }
        self.persist_playlist().await;
    }

    // ------------------------------------------------------------------
    // Scanning
    // ------------------------------------------------------------------

    /// Begin a fresh scan of the configured folders, superseding any scan
    /// still in flight.
    #[instrument(skip(self))]
    async fn start_scan(&mut self) {
        if let Some(token) = self.scan_cancel.take() {
            token.cancel();
        }
        let generation = self.state.scan.generation + 1;
        self.state.scan = ScanStatus {
            phase: ScanPhase::Scanning,
            errors: Vec::new(),
            generation,
        };
        self.state.playlist = Playlist::new(self.config.scan_playlist_name.clone());
        self.set_current(None, 0);
        self.state.playback.position_ms = 0;
        self.state.playback.duration_ms = 0;
        if let Err(error) = self.engine.clear_queue().await {
            warn!(%error, "queue clear failed");
        }

        let folders = self.state.settings.folders.clone();
        debug!(generation, folders = folders.len(), "scan started");
        self.notify(CoreEvent::Scan(ScanNotice::Started {
            generation,
            folder_count: folders.len(),
        }));

        let token = CancellationToken::new();
        self.scan_cancel = Some(token.clone());
        let mut events = self.scanner.scan(&folders).await;
        let forward = self.scan_tx.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    event = events.recv() => {
                        let message = match event {
                            Some(event) => ScanMessage::Event { generation, event },
                            None => {
                                let _ = forward
                                    .send(ScanMessage::Finished { generation })
                                    .await;
                                return;
                            }
                        };
                        if forward.send(message).await.is_err() {
                            return;
                        }
                    }
                }
            }
        });
    }

    async fn handle_scan_message(&mut self, message: ScanMessage) {
        let generation = message.generation();
        if generation != self.state.scan.generation {
            trace!(
                generation,
                current = self.state.scan.generation,
                "dropping stale scan message"
            );
            return;
        }
        match message {
            ScanMessage::Event {
                event: ScanEvent::TrackFound { track },
                ..
            } => {
                if !self.state.playlist.push(track.clone()) {
                    trace!(locator = %track.locator, "duplicate locator skipped");
                    return;
                }
                if let Err(error) = self.engine.append_track(&track).await {
                    warn!(%error, locator = %track.locator, "queue append failed");
                }
                if self.state.playback.current.is_none() {
                    let index = self.state.playlist.len() - 1;
                    self.set_current(Some(track), index);
                }
            }
            ScanMessage::Event {
                event: ScanEvent::Error { message },
                ..
            } => {
                self.state.scan.errors.push(message.clone());
                self.notify(CoreEvent::Scan(ScanNotice::FolderFailed { message }));
            }
            ScanMessage::Finished { .. } => {
                self.state.scan.phase = ScanPhase::Idle;
                self.scan_cancel = None;
                self.persist_playlist().await;
                debug!(
                    generation,
                    tracks = self.state.playlist.len(),
                    errors = self.state.scan.errors.len(),
                    "scan finished"
                );
                self.notify(CoreEvent::Scan(ScanNotice::Completed {
                    generation,
                    track_count: self.state.playlist.len(),
                    error_count: self.state.scan.errors.len(),
                }));
            }
        }
    }

    // ------------------------------------------------------------------
    // Engine events
    // ------------------------------------------------------------------

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Transition { index } => {
                let previous = self.previous_track.clone();
                let current = self.state.playlist.get(index).cloned();
                self.set_current(current.clone(), index);
                self.state.playback.position_ms = 0;
                self.state.playback.duration_ms = 0;

                if self.state.settings.remove_on_end {
                    if let (Some(previous), Some(current)) = (previous, current) {
                        // A repeated locator is the same item looping, not a
                        // finished track.
                        if previous.locator != current.locator {
                            self.remove_track(&previous).await;
                        }
                    }
                }
            }
            EngineEvent::PlayingChanged { playing } => {
                self.state.playback.playing = playing;
            }
            EngineEvent::Ready { duration_ms } => {
                self.state.playback.duration_ms = duration_ms;
            }
            EngineEvent::LoadFailed { locator, message } => {
                self.notify(CoreEvent::Playback(PlaybackNotice::LoadFailed {
                    locator: locator.to_string(),
                    message,
                }));
                let names_current = self
                    .state
                    .playback
                    .current
                    .as_ref()
                    .is_some_and(|current| current.locator == locator);
                if names_current {
                    self.state.playback.current = None;
                    self.previous_track = None;
                }
            }
        }
    }

    async fn poll_progress(&mut self) {
        if !self.state.playback.playing {
            return;
        }
        match self.engine.progress().await {
            Ok(progress) => {
                self.state.playback.position_ms = progress.position_ms;
                if progress.duration_ms > 0 {
                    self.state.playback.duration_ms = progress.duration_ms;
                }
            }
            Err(error) => trace!(%error, "progress poll failed"),
        }
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    /// Adopt a settings record published by the store, e.g. written by
    /// another component of the host. Volume is the one knob the engine has
    /// to hear about; everything else takes effect on its next use.
    ///
    /// Echoes of this session's own saves are dropped: an echo can arrive
    /// after a newer mutation whose save failed, and the in-memory record
    /// stays authoritative over anything it already wrote.
    async fn merge_external_settings(&mut self, settings: PlayerSettings) {
        if settings == self.last_saved {
            return;
        }
        let volume_changed = settings.volume != self.state.settings.volume;
        self.last_saved = settings.clone();
        self.state.settings = settings;
        if volume_changed {
            if let Err(error) = self.engine.set_volume(self.state.settings.volume).await {
                warn!(%error, "volume update failed");
            }
        }
    }

    fn set_current(&mut self, track: Option<Track>, index: usize) {
        self.previous_track = track.clone();
        self.state.playback.current = track;
        self.state.playback.queue_index = index;
    }

    async fn save_settings(&mut self) {
        match self.store.save(&self.state.settings).await {
            Ok(()) => self.last_saved = self.state.settings.clone(),
            Err(error) => {
                warn!(%error, "settings save failed");
                self.notify(CoreEvent::Library(LibraryNotice::PersistFailed {
                    record: "settings".to_string(),
                    message: error.to_string(),
                }));
            }
        }
    }

    async fn persist_playlist(&mut self) {
        if let Err(error) = self.store.save_playlist(self.state.playlist.tracks()).await {
            warn!(%error, "playlist save failed");
            self.notify(CoreEvent::Library(LibraryNotice::PersistFailed {
                record: "playlist".to_string(),
                message: error.to_string(),
            }));
        }
    }

    fn notify(&self, event: CoreEvent) {
        debug!(severity = ?event.severity(), "{}", event.description());
        // No subscribers is fine; notices are transient.
        let _ = self.bus.emit(event);
    }

    /// Publish the current state, skipping the send when nothing changed so
    /// subscribers never wake for identical snapshots.
    fn publish(&self) {
        let state = self.state.clone();
        self.state_tx.send_if_modified(move |published| {
            if *published == state {
                false
            } else {
                *published = state;
                true
            }
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
