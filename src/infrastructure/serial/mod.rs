// Serial module - Projector attached to a local serial port
pub mod client;

pub use client::{SerialSettings, SerialTransport};
