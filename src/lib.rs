//! ProjCom Library
//!
//! One command surface for ESC/VP21 projectors reachable over a serial
//! line, an ESC/VP.net TCP session or the embedded web interface.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::domain::error::{ProjComError, ProjComResult};
pub use crate::domain::command::{Command, CommandName, Mode};
pub use crate::domain::config::{ConnectionConfig, ProjComConfig};
pub use crate::core::communication::{Codec, PageMap, Transport, TransportType};
pub use crate::core::connection::{Connection, ConnectionState, Projector, SharedProjector};
pub use crate::infrastructure::{connect, create_transport};
