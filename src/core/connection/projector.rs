// Projector - named command surface over a connection
use crate::core::connection::connection::Connection;
use crate::core::connection::state::{ConnectionState, ExchangeStatistics};
use crate::domain::command::{Command, CommandName, Mode};
use crate::domain::error::ProjComResult;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Projector controlled through one connection.
///
/// Setters resolve to an empty string; getters to the device's value,
/// e.g. `"01"` for power or a two-hex-digit source code.
#[derive(Debug)]
pub struct Projector {
    connection: Connection,
}

impl Projector {
    pub fn new(connection: Connection) -> Self {
        Self { connection }
    }

    pub async fn open(&mut self) -> ProjComResult<()> {
        self.connection.open().await
    }

    pub async fn close(&mut self) -> ProjComResult<()> {
        self.connection.close().await
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn statistics(&self) -> &ExchangeStatistics {
        self.connection.statistics()
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.connection
    }

    pub fn into_connection(self) -> Connection {
        self.connection
    }

    pub async fn execute(&mut self, command: Command) -> ProjComResult<String> {
        self.connection.execute(command).await
    }

    /// Power state; `Set("ON")` / `Set("OFF")`
    pub async fn power(&mut self, mode: Mode) -> ProjComResult<String> {
        self.execute(Command::new(CommandName::Power, mode)).await
    }

    /// Input source; values `"00"`..`"FF"`
    pub async fn source(&mut self, mode: Mode) -> ProjComResult<String> {
        self.execute(Command::new(CommandName::Source, mode)).await
    }

    /// Lamp mode; `"00"` normal, `"01"` eco
    pub async fn luminance(&mut self, mode: Mode) -> ProjComResult<String> {
        self.execute(Command::new(CommandName::Luminance, mode)).await
    }

    pub async fn mute(&mut self, mode: Mode) -> ProjComResult<String> {
        self.execute(Command::new(CommandName::Mute, mode)).await
    }

    pub async fn freeze(&mut self, mode: Mode) -> ProjComResult<String> {
        self.execute(Command::new(CommandName::Freeze, mode)).await
    }

    pub async fn hreverse(&mut self, mode: Mode) -> ProjComResult<String> {
        self.execute(Command::new(CommandName::HReverse, mode)).await
    }

    pub async fn vreverse(&mut self, mode: Mode) -> ProjComResult<String> {
        self.execute(Command::new(CommandName::VReverse, mode)).await
    }

    /// Lamp hours. Serial and TCP only.
    pub async fn lamp(&mut self) -> ProjComResult<String> {
        self.execute(Command::get(CommandName::Lamp)).await
    }

    /// Last error code. Serial and TCP only.
    pub async fn error(&mut self) -> ProjComResult<String> {
        self.execute(Command::get(CommandName::Error)).await
    }
}

/// Cloneable handle for driving one projector from several tasks.
///
/// Commands queue on a fair async mutex and run strictly in arrival order,
/// one exchange at a time.
#[derive(Debug, Clone)]
pub struct SharedProjector {
    inner: Arc<Mutex<Projector>>,
}

impl SharedProjector {
    pub fn new(projector: Projector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(projector)),
        }
    }

    pub async fn execute(&self, command: Command) -> ProjComResult<String> {
        self.inner.lock().await.execute(command).await
    }

    pub async fn open(&self) -> ProjComResult<()> {
        self.inner.lock().await.open().await
    }

    pub async fn close(&self) -> ProjComResult<()> {
        self.inner.lock().await.close().await
    }

    pub async fn state(&self) -> ConnectionState {
        self.inner.lock().await.state()
    }

    pub async fn statistics(&self) -> ExchangeStatistics {
        self.inner.lock().await.statistics().clone()
    }
}

impl From<Projector> for SharedProjector {
    fn from(projector: Projector) -> Self {
        Self::new(projector)
    }
}
