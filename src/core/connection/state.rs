use crate::domain::error::{ProjComError, ProjComResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConnectionState {
    /// No usable link
    Closed,
    /// Link is being established
    Opening,
    /// Link is up and commands may be sent
    Ready,
}

impl ConnectionState {
    /// Whether `self -> to` is a legal transition.
    ///
    /// `Closed` is reachable from anywhere; an abrupt disconnect may happen
    /// at any point.
    pub fn can_transition_to(&self, to: ConnectionState) -> bool {
        matches!(
            (self, to),
            (ConnectionState::Closed, ConnectionState::Opening)
                | (ConnectionState::Opening, ConnectionState::Ready)
                | (_, ConnectionState::Closed)
        )
    }

    /// Move to `to`, rejecting illegal transitions.
    pub fn transition(&mut self, to: ConnectionState) -> ProjComResult<()> {
        if !self.can_transition_to(to) {
            return Err(ProjComError::InvalidTransition {
                from: self.to_string(),
                to: to.to_string(),
            });
        }
        *self = to;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Closed => write!(f, "Closed"),
            ConnectionState::Opening => write!(f, "Opening"),
            ConnectionState::Ready => write!(f, "Ready"),
        }
    }
}

/// Per-connection exchange statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExchangeStatistics {
    /// Commands handed to the transport
    pub commands_sent: u64,
    /// Exchanges that decoded to a value
    pub successes: u64,
    /// Replies rejected by the decoder
    pub protocol_errors: u64,
    /// Exchanges that failed at the transport
    pub transport_errors: u64,
    /// Exchanges abandoned after the command timeout
    pub timeouts: u64,
    /// Average response time in milliseconds
    pub avg_response_time_ms: f64,
    /// Last response time in milliseconds
    pub last_response_time_ms: Option<u64>,
    #[serde(default, skip_serializing)]
    replies_timed: u64,
}

impl ExchangeStatistics {
    /// Record the round-trip time of a reply that arrived.
    pub fn record_response_time(&mut self, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        self.last_response_time_ms = Some(elapsed_ms);
        self.replies_timed += 1;

        let n = self.replies_timed as f64;
        self.avg_response_time_ms =
            (self.avg_response_time_ms * (n - 1.0) + elapsed_ms as f64) / n;
    }

    pub fn record_error(&mut self, error: &ProjComError) {
        match error {
            ProjComError::Protocol { .. } => self.protocol_errors += 1,
            ProjComError::Timeout => self.timeouts += 1,
            e if e.is_transport_failure() => self.transport_errors += 1,
            _ => {}
        }
    }
}
