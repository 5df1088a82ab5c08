// TCP module - ESC/VP.net communication implementation
pub mod client;

pub use client::{TcpSettings, TcpTransport, HANDSHAKE};
