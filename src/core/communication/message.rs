use std::fmt;

/// A request in the wire representation of one transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireRequest {
    /// `\r`-terminated text line for serial and ESC/VP.net
    Line(String),
    /// Request target (path and query) on the projector web server
    Http { target: String },
}

impl WireRequest {
    /// Payload bytes for stream transports.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            WireRequest::Line(line) => line.as_bytes(),
            WireRequest::Http { target } => target.as_bytes(),
        }
    }
}

impl fmt::Display for WireRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireRequest::Line(line) => write!(f, "{:?}", line),
            WireRequest::Http { target } => write!(f, "GET {}", target),
        }
    }
}

/// What came back after a request was sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawReply {
    /// Bytes of the next inbound data event on a stream transport
    Line(Vec<u8>),
    /// Status and body of an HTTP response
    Http { status: u16, body: String },
}

impl RawReply {
    /// Lossy text view used for decoding and diagnostics.
    pub fn text(&self) -> String {
        match self {
            RawReply::Line(data) => String::from_utf8_lossy(data).into_owned(),
            RawReply::Http { body, .. } => body.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RawReply::Line(data) => data.len(),
            RawReply::Http { body, .. } => body.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
