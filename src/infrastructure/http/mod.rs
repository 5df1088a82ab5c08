// HTTP module - Projector web interface implementation
pub mod client;

pub use client::{HttpSettings, HttpTransport};
