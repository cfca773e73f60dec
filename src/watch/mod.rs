pub mod protocol;
pub mod sync;

pub use protocol::{
    serialize, ContextItem, ContextItemKind, InputMode, WatchInputConfig, WatchSessionState,
    WatchThrowEvent,
};
pub use sync::{MemoryTransport, NoopTransport, OutboundMessage, WatchSync, WatchTransport};
