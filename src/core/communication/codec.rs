use crate::core::communication::html::checked_radio_value;
use crate::core::communication::message::{RawReply, WireRequest};
use crate::domain::command::{Command, CommandName, Mode};
use crate::domain::error::{ProjComError, ProjComResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// CGI endpoint of the projector web server
pub const CGI_BASE: &str = "/cgi-bin/";
pub const WEBCONF: &str = "webconf.dll";

/// Which configuration page renders the current value of a command.
///
/// Only commands listed here can be read over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMap {
    pages: HashMap<CommandName, String>,
}

impl PageMap {
    pub fn new(pages: HashMap<CommandName, String>) -> Self {
        Self { pages }
    }

    /// Build from a config table keyed by wire command name.
    pub fn from_config(table: &BTreeMap<String, String>) -> ProjComResult<Self> {
        let mut pages = HashMap::with_capacity(table.len());
        for (name, page) in table {
            let command = name.parse::<CommandName>().map_err(|_| ProjComError::Config {
                message: format!("Unknown command '{}' in HTTP page table", name),
            })?;
            pages.insert(command, page.clone());
        }
        Ok(Self { pages })
    }

    pub fn page(&self, name: CommandName) -> Option<&str> {
        self.pages.get(&name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

impl Default for PageMap {
    fn default() -> Self {
        let mut pages = HashMap::new();
        pages.insert(CommandName::Luminance, format!("{}?page=3", WEBCONF));
        pages.insert(CommandName::HReverse, format!("{}?page=4", WEBCONF));
        pages.insert(CommandName::VReverse, format!("{}?page=4", WEBCONF));
        Self { pages }
    }
}

/// Encoding and decoding rules of one transport family
#[derive(Debug, Clone)]
pub enum Codec {
    /// ESC/VP21 text lines, shared by serial and ESC/VP.net
    Line,
    /// CGI requests against the embedded web server
    Http(Arc<PageMap>),
}

impl Codec {
    /// Map a command to its wire request. Pure; performs no I/O.
    pub fn encode(&self, command: &Command) -> ProjComResult<WireRequest> {
        command.validate()?;

        match (self, &command.mode) {
            (Codec::Line, Mode::Set(value)) => {
                Ok(WireRequest::Line(format!("{} {}\r", command.name, value)))
            }
            (Codec::Line, Mode::Get) => Ok(WireRequest::Line(format!("{}?\r", command.name))),
            (Codec::Http(_), Mode::Set(value)) => Ok(WireRequest::Http {
                target: format!("{}{}?{}={}", CGI_BASE, WEBCONF, command.name, value),
            }),
            (Codec::Http(pages), Mode::Get) => {
                let page = pages.page(command.name).ok_or_else(|| {
                    ProjComError::UnsupportedOperation(format!(
                        "{} cannot be read over HTTP",
                        command.name
                    ))
                })?;
                Ok(WireRequest::Http {
                    target: format!("{}{}", CGI_BASE, page),
                })
            }
        }
    }

    /// Interpret the reply to `command`. Set-mode success is the empty string.
    pub fn decode(&self, command: &Command, reply: &RawReply) -> ProjComResult<String> {
        match reply {
            RawReply::Line(data) => decode_line(&command.mode, data),
            RawReply::Http { status, body } => decode_http(command, *status, body),
        }
    }
}

fn decode_line(mode: &Mode, data: &[u8]) -> ProjComResult<String> {
    let text = String::from_utf8_lossy(data);

    match mode {
        Mode::Set(_) => {
            if text.starts_with(':') {
                Ok(String::new())
            } else {
                Err(ProjComError::protocol(text))
            }
        }
        Mode::Get => {
            // Anything after the first CR is the prompt or line-buffering residue
            let line = text.split('\r').next().unwrap_or_default();
            match line.split_once('=') {
                Some((_, value)) => Ok(value.to_string()),
                None => Err(ProjComError::protocol(text)),
            }
        }
    }
}

fn decode_http(command: &Command, status: u16, body: &str) -> ProjComResult<String> {
    if status != 200 {
        return Err(ProjComError::protocol(body));
    }

    match command.mode {
        Mode::Set(_) => Ok(String::new()),
        Mode::Get => Ok(checked_radio_value(body, command.name.as_str()).unwrap_or_default()),
    }
}
