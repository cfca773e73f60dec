use super::protocol::{WatchInputConfig, WatchSessionState, WatchThrowEvent};
use crate::error::TransportError;
use serde::Serialize;
use tracing::{debug, warn};

/// Message channel to the companion watch
pub trait WatchTransport {
    fn is_connected(&self) -> bool;
    fn send_session_state(&mut self, json: &str) -> Result<(), TransportError>;
    fn send_input_config(&mut self, json: &str) -> Result<(), TransportError>;
}

/// Transport for runs without a paired watch
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransport;

impl WatchTransport for NoopTransport {
    fn is_connected(&self) -> bool {
        false
    }

    fn send_session_state(&mut self, _json: &str) -> Result<(), TransportError> {
        Err(TransportError::Disconnected)
    }

    fn send_input_config(&mut self, _json: &str) -> Result<(), TransportError> {
        Err(TransportError::Disconnected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    SessionState(String),
    InputConfig(String),
}

/// In-memory transport that keeps every message it was asked to send
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    pub connected: bool,
    pub sent: Vec<OutboundMessage>,
}

impl MemoryTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            sent: Vec::new(),
        }
    }

    /// Decoded session states in send order
    pub fn states(&self) -> Vec<WatchSessionState> {
        self.sent
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::SessionState(json) => serde_json::from_str(json).ok(),
                OutboundMessage::InputConfig(_) => None,
            })
            .collect()
    }

    pub fn last_state(&self) -> Option<WatchSessionState> {
        self.states().pop()
    }
}

impl WatchTransport for MemoryTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send_session_state(&mut self, json: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        self.sent.push(OutboundMessage::SessionState(json.to_string()));
        Ok(())
    }

    fn send_input_config(&mut self, json: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        self.sent.push(OutboundMessage::InputConfig(json.to_string()));
        Ok(())
    }
}

/// Best-effort mirror of one session on the watch.
///
/// Every push is a full "set current state", never a delta, so lost or reordered
/// messages heal on the next push. At most one remote session is live at a time.
#[derive(Debug)]
pub struct WatchSync<T: WatchTransport> {
    transport: T,
    connected: bool,
    active_session: Option<String>,
    last_state: Option<WatchSessionState>,
    last_config: Option<WatchInputConfig>,
}

impl<T: WatchTransport> WatchSync<T> {
    pub fn new(transport: T) -> Self {
        let connected = transport.is_connected();
        Self {
            transport,
            connected,
            active_session: None,
            last_state: None,
            last_config: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn active_session_id(&self) -> Option<&str> {
        self.active_session.as_deref()
    }

    pub fn start_remote_session(&mut self, state: WatchSessionState, config: WatchInputConfig) {
        if self.active_session.is_some() {
            self.end_remote_session();
        }
        debug!(session_id = %state.session_id, "remote session started");
        self.active_session = Some(state.session_id.clone());
        self.last_config = Some(config);
        self.push_config();
        self.last_state = Some(state);
        self.push_state();
    }

    /// Pushes a fresh state for the live remote session. States for any other session are ignored.
    pub fn update_remote_session(&mut self, state: WatchSessionState) -> bool {
        if self.active_session.as_deref() != Some(state.session_id.as_str()) {
            debug!(session_id = %state.session_id, "update for inactive remote session ignored");
            return false;
        }
        self.last_state = Some(state);
        self.push_state()
    }

    /// Sends a final inactive state and forgets the remote session.
    pub fn end_remote_session(&mut self) {
        if let Some(mut state) = self.last_state.take() {
            state.is_active = false;
            self.last_state = Some(state);
            self.push_state();
        }
        if let Some(id) = self.active_session.take() {
            debug!(session_id = %id, "remote session ended");
        }
        self.last_state = None;
        self.last_config = None;
    }

    /// Records a link change. Returns true when the link just came back and needs a full resync.
    pub fn set_connected(&mut self, connected: bool) -> bool {
        let came_back = connected && !self.connected;
        self.connected = connected;
        debug!(connected, "watch connection changed");
        came_back && self.active_session.is_some()
    }

    /// Full resync after reconnect: input config, then the freshly serialized state.
    pub fn resync(&mut self, state: WatchSessionState) -> bool {
        if self.active_session.as_deref() != Some(state.session_id.as_str()) {
            return false;
        }
        self.push_config();
        self.last_state = Some(state);
        self.push_state()
    }

    /// Whether an inbound event belongs to the live remote session
    pub fn accepts(&self, event: &WatchThrowEvent) -> bool {
        self.active_session.as_deref() == Some(event.session_id.as_str())
    }

    fn push_state(&mut self) -> bool {
        let Some(state) = self.last_state.as_ref() else {
            return false;
        };
        let Some(json) = encode(state) else {
            return false;
        };
        if !self.connected {
            return false;
        }
        let result = self.transport.send_session_state(&json);
        self.handle_send(result)
    }

    fn push_config(&mut self) -> bool {
        let Some(config) = self.last_config.as_ref() else {
            return false;
        };
        let Some(json) = encode(config) else {
            return false;
        };
        if !self.connected {
            return false;
        }
        let result = self.transport.send_input_config(&json);
        self.handle_send(result)
    }

    fn handle_send(&mut self, result: Result<(), TransportError>) -> bool {
        match result {
            Ok(()) => true,
            Err(TransportError::Disconnected) => {
                warn!("watch unreachable, waiting for reconnect");
                self.connected = false;
                false
            }
            Err(e) => {
                warn!(error = %e, "watch push failed");
                false
            }
        }
    }
}

fn encode<V: Serialize>(value: &V) -> Option<String> {
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(error = %e, "failed to encode watch payload");
            None
        }
    }
}
