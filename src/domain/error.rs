use thiserror::Error;

/// ProjCom unified error type
#[derive(Error, Debug)]
pub enum ProjComError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The transport went away underneath an exchange.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A reply arrived but does not follow the framing rules of its transport.
    #[error("Protocol error: unexpected reply {raw:?}")]
    Protocol { raw: String },

    #[error("Connection is not ready")]
    NotReady,

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Communication timeout")]
    Timeout,

    #[error("Invalid connection state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl ProjComError {
    /// Shorthand for a transport failure with a message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Shorthand for a malformed reply.
    pub fn protocol(raw: impl Into<String>) -> Self {
        Self::Protocol { raw: raw.into() }
    }

    /// Whether the error means the underlying link is gone.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::Serial(_) | Self::Network(_) | Self::Http(_) | Self::Transport { .. }
        )
    }
}

pub type ProjComResult<T> = Result<T, ProjComError>;
