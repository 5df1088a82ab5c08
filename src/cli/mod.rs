// CLI module - Command line interface
pub mod args;
pub mod commands;
pub mod output;

pub use args::{Args, Command, OutputFormat, ProjectorCommand};
pub use commands::execute_command;
pub use output::{CommandReport, ConsoleWriter, OutputWriter};
