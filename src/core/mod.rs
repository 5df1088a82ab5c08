// Core module - Protocol layer shared by every transport
pub mod communication;
pub mod connection;
