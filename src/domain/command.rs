use crate::domain::error::{ProjComError, ProjComResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Projector command names as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandName {
    #[serde(rename = "PWR")]
    Power,
    #[serde(rename = "SOURCE")]
    Source,
    #[serde(rename = "LUMINANCE")]
    Luminance,
    #[serde(rename = "MUTE")]
    Mute,
    #[serde(rename = "FREEZE")]
    Freeze,
    #[serde(rename = "HREVERSE")]
    HReverse,
    #[serde(rename = "VREVERSE")]
    VReverse,
    #[serde(rename = "LAMP")]
    Lamp,
    #[serde(rename = "ERR")]
    Error,
}

impl CommandName {
    pub const ALL: [CommandName; 9] = [
        CommandName::Power,
        CommandName::Source,
        CommandName::Luminance,
        CommandName::Mute,
        CommandName::Freeze,
        CommandName::HReverse,
        CommandName::VReverse,
        CommandName::Lamp,
        CommandName::Error,
    ];

    /// Uppercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Power => "PWR",
            CommandName::Source => "SOURCE",
            CommandName::Luminance => "LUMINANCE",
            CommandName::Mute => "MUTE",
            CommandName::Freeze => "FREEZE",
            CommandName::HReverse => "HREVERSE",
            CommandName::VReverse => "VREVERSE",
            CommandName::Lamp => "LAMP",
            CommandName::Error => "ERR",
        }
    }

    /// Lamp hours and the last error code can only be read.
    pub fn is_get_only(&self) -> bool {
        matches!(self, CommandName::Lamp | CommandName::Error)
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandName {
    type Err = ProjComError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProjComError::InvalidInput(format!("Unknown command: {}", s)))
    }
}

/// Whether a command reads the current value or writes a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Get,
    Set(String),
}

impl Mode {
    pub fn is_get(&self) -> bool {
        matches!(self, Mode::Get)
    }
}

impl From<Option<String>> for Mode {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(value) => Mode::Set(value),
            None => Mode::Get,
        }
    }
}

impl From<&str> for Mode {
    fn from(value: &str) -> Self {
        Mode::Set(value.to_string())
    }
}

/// A single projector command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: CommandName,
    pub mode: Mode,
}

impl Command {
    pub fn new(name: CommandName, mode: Mode) -> Self {
        Self { name, mode }
    }

    pub fn get(name: CommandName) -> Self {
        Self::new(name, Mode::Get)
    }

    pub fn set(name: CommandName, value: impl Into<String>) -> Self {
        Self::new(name, Mode::Set(value.into()))
    }

    /// Reject set-mode on read-only commands before anything is sent.
    pub fn validate(&self) -> ProjComResult<()> {
        if self.name.is_get_only() && !self.mode.is_get() {
            return Err(ProjComError::UnsupportedOperation(format!(
                "{} is read-only",
                self.name
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            Mode::Get => write!(f, "{}?", self.name),
            Mode::Set(value) => write!(f, "{} {}", self.name, value),
        }
    }
}
