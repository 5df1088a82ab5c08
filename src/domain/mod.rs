// Domain module - Commands, configuration and errors
pub mod command;
pub mod config;
pub mod error;
