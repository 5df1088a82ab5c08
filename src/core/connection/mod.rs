// Connection module - Lifecycle, reply correlation and the projector facade
pub mod connection;
pub mod correlator;
pub mod projector;
pub mod state;

pub use connection::{Connection, DEFAULT_COMMAND_TIMEOUT};
pub use correlator::{Correlator, PendingRequest};
pub use projector::{Projector, SharedProjector};
pub use state::{ConnectionState, ExchangeStatistics};
