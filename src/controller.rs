use crate::error::{PracticeError, Result, StoreError};
use crate::runtime::PracticeEvent;
use crate::session::{PracticeSession, RecordOutcome, SessionType};
use crate::store::SessionStore;
use crate::throws::ThrowInput;
use crate::watch::{serialize, WatchInputConfig, WatchSync, WatchThrowEvent, WatchTransport};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Coordinates one active session with its store and the watch mirror.
///
/// Collaborators are handed in at construction. Every change to the session, local or
/// remote, goes through this type: mutate, persist the whole snapshot, then push a
/// freshly serialized state to the watch. A failed save is reported to the caller but
/// the in-memory session is kept as is.
#[derive(Debug)]
pub struct PracticeController<S: SessionStore, T: WatchTransport> {
    store: S,
    sync: WatchSync<T>,
    session: Option<PracticeSession>,
    watch_enabled: bool,
    /// Timestamp of the newest watch throw consumed for the active session
    last_watch_throw: Option<DateTime<Utc>>,
}

impl<S: SessionStore, T: WatchTransport> PracticeController<S, T> {
    pub fn new(store: S, transport: T) -> Self {
        Self {
            store,
            sync: WatchSync::new(transport),
            session: None,
            watch_enabled: true,
            last_watch_throw: None,
        }
    }

    pub fn with_watch_sync(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    pub fn session(&self) -> Option<&PracticeSession> {
        self.session.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sync(&self) -> &WatchSync<T> {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut WatchSync<T> {
        &mut self.sync
    }

    /// Loads the unfinished session from the store, if there is one.
    pub fn resume(&mut self) -> Result<Option<&PracticeSession>> {
        let loaded = self.store.get_active_session()?;
        if let Some(session) = loaded {
            info!(id = %session.id, total_batons = session.total_batons, "session resumed");
            self.last_watch_throw = session
                .rounds
                .iter()
                .flat_map(|r| r.throws.iter())
                .map(|t| t.timestamp)
                .max();
            self.start_remote(&session);
            self.session = Some(session);
        }
        Ok(self.session.as_ref())
    }

    pub fn start_session(
        &mut self,
        session_type: SessionType,
        target: u32,
        target_score: Option<u32>,
    ) -> Result<&PracticeSession> {
        if let Some(active) = self.session.as_ref().filter(|s| !s.is_complete) {
            return Err(PracticeError::ActiveSessionExists(active.id.clone()));
        }
        if let Some(stored) = self.store.get_active_session()? {
            return Err(PracticeError::ActiveSessionExists(stored.id));
        }

        let session = PracticeSession::new(session_type, target, target_score);
        self.store.create_session(&session)?;
        self.last_watch_throw = None;
        self.start_remote(&session);
        Ok(&*self.session.insert(session))
    }

    /// Local throw entry point
    pub fn record_throw(&mut self, input: ThrowInput) -> Result<Option<RecordOutcome>> {
        let session = self.session.as_mut().ok_or(PracticeError::NoActiveSession)?;
        let Some(outcome) = session.record_throw(input) else {
            return Ok(None);
        };
        self.commit()?;
        Ok(Some(outcome))
    }

    /// Raw JSON from the watch. Malformed or foreign events are dropped without error.
    pub fn handle_watch_message(&mut self, json: &str) -> Result<Option<RecordOutcome>> {
        match WatchThrowEvent::parse(json) {
            Ok(event) => self.handle_watch_event(event),
            Err(e) => {
                warn!(error = %e, "malformed watch event dropped");
                Ok(None)
            }
        }
    }

    /// Routes a watch throw through the engine.
    ///
    /// Events are consumed at most once: a redelivered or older event (timestamp not
    /// newer than the last consumed one) is dropped. Any matching event that records
    /// nothing is answered with a fresh state push so the watch re-converges.
    pub fn handle_watch_event(&mut self, event: WatchThrowEvent) -> Result<Option<RecordOutcome>> {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.id == event.session_id)
        else {
            debug!(session_id = %event.session_id, "stale watch event dropped");
            return Ok(None);
        };

        if self.last_watch_throw.is_some_and(|last| event.timestamp <= last) {
            debug!(
                session_id = %event.session_id,
                timestamp = %event.timestamp,
                "duplicate watch event dropped"
            );
            self.push();
            return Ok(None);
        }

        let Some(outcome) = session.record_throw(event.to_input()) else {
            self.push();
            return Ok(None);
        };
        self.last_watch_throw = Some(event.timestamp);
        self.commit()?;
        Ok(Some(outcome))
    }

    pub fn start_next_round(&mut self) -> Result<bool> {
        self.mutate(PracticeSession::start_next_round)
    }

    pub fn reset_current_round(&mut self) -> Result<bool> {
        self.mutate(PracticeSession::reset_current_round)
    }

    pub fn pause_session(&mut self) -> Result<bool> {
        self.mutate(PracticeSession::pause_session)
    }

    pub fn resume_session(&mut self) -> Result<bool> {
        self.mutate(PracticeSession::resume_session)
    }

    /// Finishes the session once its target is reached and releases the watch.
    pub fn complete_session(&mut self) -> Result<bool> {
        let completed = self.mutate(PracticeSession::complete_session)?;
        if completed && self.watch_enabled {
            self.sync.end_remote_session();
        }
        Ok(completed)
    }

    /// Discards the session and deletes it from the store.
    pub fn abandon_session(&mut self) -> Result<()> {
        let session = self.session.take().ok_or(PracticeError::NoActiveSession)?;
        self.last_watch_throw = None;
        if self.watch_enabled {
            self.sync.end_remote_session();
        }
        match self.store.delete_session(&session.id) {
            Ok(()) | Err(StoreError::NotFound(_)) => {
                info!(id = %session.id, "session abandoned");
                Ok(())
            }
            Err(e) => {
                self.session = Some(session);
                Err(e.into())
            }
        }
    }

    /// Link state from the transport. A reconnect pushes the full current state.
    pub fn on_connection_change(&mut self, connected: bool) {
        if !self.watch_enabled {
            return;
        }
        if self.sync.set_connected(connected) {
            if let Some(session) = self.session.as_ref() {
                self.sync.resync(serialize(session));
            }
        }
    }

    /// Periodic sync tick: regenerate and push the whole state.
    pub fn tick(&mut self) {
        self.push();
    }

    /// Routes any runtime event; local and remote throws meet at the same entry point.
    pub fn handle_event(&mut self, event: PracticeEvent) -> Result<Option<RecordOutcome>> {
        match event {
            PracticeEvent::LocalThrow(input) => self.record_throw(input),
            PracticeEvent::WatchMessage(json) => self.handle_watch_message(&json),
            PracticeEvent::ConnectionChanged(connected) => {
                self.on_connection_change(connected);
                Ok(None)
            }
            PracticeEvent::Tick => {
                self.tick();
                Ok(None)
            }
        }
    }

    fn mutate(&mut self, f: impl FnOnce(&mut PracticeSession) -> bool) -> Result<bool> {
        let session = self.session.as_mut().ok_or(PracticeError::NoActiveSession)?;
        if !f(session) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    fn commit(&mut self) -> Result<()> {
        let saved = match self.session.as_ref() {
            Some(session) => self.store.update_session(session),
            None => Ok(()),
        };
        self.push();
        if let Err(e) = &saved {
            warn!(error = %e, "session save failed, keeping in-memory state");
        }
        saved.map_err(PracticeError::from)
    }

    fn push(&mut self) {
        if !self.watch_enabled {
            return;
        }
        if let Some(session) = self.session.as_ref() {
            self.sync.update_remote_session(serialize(session));
        }
    }

    fn start_remote(&mut self, session: &PracticeSession) {
        if self.watch_enabled && !session.is_complete {
            self.sync
                .start_remote_session(serialize(session), WatchInputConfig::for_session(session));
        }
    }
}
