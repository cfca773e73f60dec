// Library surface shared by the CLI and the integration tests.
pub mod app_dirs;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod modes;
pub mod round;
pub mod runtime;
pub mod session;
pub mod store;
pub mod throws;
pub mod util;
pub mod warning;
pub mod watch;

pub use controller::PracticeController;
pub use error::{PracticeError, StoreError, TransportError};
pub use round::Round;
pub use session::{PracticeSession, RecordOutcome, SessionType};
pub use throws::{ThrowInput, ThrowRecord, ThrowType};
