use crate::core::communication::{Codec, RawReply, Transport, TransportType, WireRequest};
use crate::core::connection::correlator::Correlator;
use crate::core::connection::state::{ConnectionState, ExchangeStatistics};
use crate::domain::command::Command;
use crate::domain::error::{ProjComError, ProjComResult};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default time a device gets to answer one command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// A link to one projector.
///
/// Owns its transport and drives one request/reply exchange at a time.
/// Every exchange takes `&mut self`, so a second command cannot be issued
/// on the same connection before the first one has resolved.
pub struct Connection {
    id: String,
    transport: Box<dyn Transport>,
    codec: Codec,
    state: ConnectionState,
    correlator: Correlator,
    command_timeout: Duration,
    statistics: ExchangeStatistics,
}

impl Connection {
    /// Wrap a transport. Stateless transports start out `Ready`.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        let id = format!(
            "{}_{}",
            transport.transport_type(),
            uuid::Uuid::new_v4().simple()
        );
        let state = if transport.is_persistent() {
            ConnectionState::Closed
        } else {
            ConnectionState::Ready
        };

        Self {
            id,
            codec: transport.codec(),
            transport,
            state,
            correlator: Correlator::new(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            statistics: ExchangeStatistics::default(),
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn transport_type(&self) -> TransportType {
        self.transport.transport_type()
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    pub fn set_command_timeout(&mut self, timeout: Duration) {
        self.command_timeout = timeout;
    }

    pub fn statistics(&self) -> &ExchangeStatistics {
        &self.statistics
    }

    /// Open the transport: `Closed -> Opening -> Ready`, or back to
    /// `Closed` if the transport fails to come up.
    pub async fn open(&mut self) -> ProjComResult<()> {
        if !self.transport.is_persistent() {
            return Ok(());
        }

        if self.state == ConnectionState::Opening {
            // A previous open was abandoned halfway
            warn!("Connection '{}' restarting an interrupted open", self.id);
            self.state.transition(ConnectionState::Closed)?;
        }

        self.state.transition(ConnectionState::Opening)?;
        match self.transport.open().await {
            Ok(()) => {
                self.state.transition(ConnectionState::Ready)?;
                info!("Connection '{}' ready", self.id);
                Ok(())
            }
            Err(e) => {
                self.state.transition(ConnectionState::Closed)?;
                warn!("Connection '{}' failed to open: {}", self.id, e);
                Err(e)
            }
        }
    }

    /// Close the transport. Valid from any state.
    pub async fn close(&mut self) -> ProjComResult<()> {
        if !self.transport.is_persistent() {
            return Ok(());
        }

        self.correlator.reset();
        self.state.transition(ConnectionState::Closed)?;
        self.transport.close().await?;
        info!("Connection '{}' closed", self.id);
        Ok(())
    }

    /// Send one command and wait for its decoded reply.
    pub async fn execute(&mut self, command: Command) -> ProjComResult<String> {
        if !self.state.is_ready() {
            return Err(ProjComError::NotReady);
        }

        let request = self.codec.encode(&command)?;

        if let Some(abandoned) = self.correlator.reset() {
            warn!(
                "Connection '{}' dropping abandoned request '{}'",
                self.id, abandoned.command
            );
        }
        let stale = self.transport.discard_buffered();
        if stale > 0 {
            warn!(
                "Connection '{}' discarded {} unsolicited payload(s)",
                self.id, stale
            );
        }

        self.correlator.arm(&command);
        debug!("Connection '{}' -> {}", self.id, request);

        let result = self.exchange(&request).await;
        let pending = self.correlator.resolve();

        let outcome = match result {
            Ok(reply) => {
                if let Some(pending) = &pending {
                    self.statistics.record_response_time(pending.elapsed());
                }
                debug!(
                    "Connection '{}' <- {} bytes ({})",
                    self.id,
                    reply.len(),
                    hex::encode(reply.text().as_bytes())
                );
                self.codec.decode(&command, &reply)
            }
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(_) => self.statistics.successes += 1,
            Err(e) => {
                self.statistics.record_error(e);
                if e.is_transport_failure() && self.transport.is_persistent() {
                    warn!("Connection '{}' lost: {}", self.id, e);
                    self.state.transition(ConnectionState::Closed)?;
                }
            }
        }

        outcome
    }

    /// Send and await the reply under one deadline. Some transports do
    /// all their I/O inside `send`, so the deadline has to cover both.
    async fn exchange(&mut self, request: &WireRequest) -> ProjComResult<RawReply> {
        let transport = &mut self.transport;
        let statistics = &mut self.statistics;
        let round_trip = async move {
            transport.send(request).await?;
            statistics.commands_sent += 1;
            transport.next_reply().await
        };

        match tokio::time::timeout(self.command_timeout, round_trip).await {
            Ok(reply) => reply,
            Err(_) => {
                warn!(
                    "Connection '{}' got no reply within {:?}",
                    self.id, self.command_timeout
                );
                Err(ProjComError::Timeout)
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("transport", &self.transport.transport_type())
            .field("state", &self.state)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}
