use crate::core::communication::{Codec, RawReply, Transport, TransportType, WireRequest};
use crate::domain::config::ConnectionConfig;
use crate::domain::error::{ProjComError, ProjComResult};
use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpSocket, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// ESC/VP.net session header sent once right after connecting
pub const HANDSHAKE: [u8; 16] = [
    0x45, 0x53, 0x43, 0x2F, 0x56, 0x50, 0x2E, 0x6E, 0x65, 0x74, 0x10, 0x03, 0x00, 0x00, 0x00, 0x00,
];

/// Every ESC/VP.net header starts with the protocol identifier
const HEADER_MAGIC: &[u8] = b"ESC/VP.net";
const HEADER_STATUS_OFFSET: usize = 14;
const STATUS_OK: u8 = 0x20;

/// ESC/VP.net connection settings
#[derive(Debug, Clone)]
pub struct TcpSettings {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub keep_alive: bool,
    pub nodelay: bool,
    pub handshake_wait: Duration,
}

impl TcpSettings {
    pub fn from_config(config: &ConnectionConfig) -> ProjComResult<Self> {
        match config {
            ConnectionConfig::Tcp {
                host,
                port,
                timeout_ms,
                keep_alive,
                nodelay,
                handshake_wait_ms,
            } => Ok(Self {
                host: host.clone(),
                port: *port,
                connect_timeout: Duration::from_millis(*timeout_ms),
                keep_alive: *keep_alive,
                nodelay: *nodelay,
                handshake_wait: Duration::from_millis(*handshake_wait_ms),
            }),
            _ => Err(ProjComError::Config {
                message: "Invalid connection type for TCP transport".to_string(),
            }),
        }
    }
}

/// Projector reached over ESC/VP.net
pub struct TcpTransport {
    settings: TcpSettings,
    writer: Option<OwnedWriteHalf>,
    inbound: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
    rx_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TcpTransport {
    pub fn new(settings: TcpSettings) -> Self {
        Self {
            settings,
            writer: None,
            inbound: None,
            rx_handle: None,
        }
    }

    pub fn from_config(config: &ConnectionConfig) -> ProjComResult<Self> {
        Ok(Self::new(TcpSettings::from_config(config)?))
    }

    pub fn settings(&self) -> &TcpSettings {
        &self.settings
    }

    fn shutdown_reader(&mut self) {
        if let Some(handle) = self.rx_handle.take() {
            handle.abort();
        }
        self.inbound = None;
    }

    async fn connect(settings: &TcpSettings) -> ProjComResult<TcpStream> {
        let host = settings.host.as_str();
        let port = settings.port;

        let stream = tokio::time::timeout(settings.connect_timeout, open_stream(settings))
            .await
            .map_err(|_| ProjComError::transport(format!("Connection timeout to {}:{}", host, port)))?
            .map_err(|e| {
                ProjComError::transport(format!("Failed to connect to {}:{}: {}", host, port, e))
            })?;

        if settings.nodelay {
            if let Err(e) = stream.set_nodelay(true) {
                warn!("Failed to set TCP_NODELAY: {}", e);
            }
        }

        Ok(stream)
    }

    /// Consume the device's answer to the handshake, if it sends one.
    async fn await_handshake_reply(&mut self) -> ProjComResult<()> {
        let wait = self.settings.handshake_wait;
        let inbound = self
            .inbound
            .as_mut()
            .ok_or_else(|| ProjComError::transport("TCP connection is not open"))?;

        match tokio::time::timeout(wait, inbound.recv()).await {
            Ok(Some(data)) if data.starts_with(HEADER_MAGIC) => {
                match data.get(HEADER_STATUS_OFFSET) {
                    Some(&STATUS_OK) | None => {
                        debug!("Handshake accepted: {}", hex::encode(&data));
                        Ok(())
                    }
                    Some(status) => {
                        warn!("Handshake rejected with status {:#04x}", status);
                        Err(ProjComError::protocol(hex::encode(&data)))
                    }
                }
            }
            Ok(Some(data)) => {
                warn!(
                    "Discarding {} bytes received before the handshake reply",
                    data.len()
                );
                Ok(())
            }
            Ok(None) => Err(ProjComError::transport(
                "connection closed during handshake",
            )),
            Err(_) => {
                debug!("No handshake reply within {:?}", wait);
                Ok(())
            }
        }
    }
}

/// Unconnected socket for `addr` with the session options applied.
fn session_socket(addr: SocketAddr, settings: &TcpSettings) -> io::Result<TcpSocket> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_keepalive(settings.keep_alive)?;
    Ok(socket)
}

/// Try every resolved address in turn.
async fn open_stream(settings: &TcpSettings) -> io::Result<TcpStream> {
    let mut last_error = None;

    for addr in tokio::net::lookup_host((settings.host.as_str(), settings.port)).await? {
        match session_socket(addr, settings)?.connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("Connect to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "host resolved to no addresses")
    }))
}

#[async_trait]
impl Transport for TcpTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Tcp
    }

    fn codec(&self) -> Codec {
        Codec::Line
    }

    async fn open(&mut self) -> ProjComResult<()> {
        // Reopening after a lost link
        self.shutdown_reader();
        self.writer = None;

        let stream = Self::connect(&self.settings).await?;
        info!(
            "TCP connection established to {}:{}",
            self.settings.host, self.settings.port
        );

        let (mut reader, writer) = stream.into_split();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();

        // RX task - each read is one inbound payload
        let rx_handle = tokio::spawn(async move {
            let mut buffer = vec![0u8; 4096];

            loop {
                match reader.read(&mut buffer).await {
                    Ok(0) => {
                        info!("TCP connection closed by peer");
                        break;
                    }
                    Ok(n) => {
                        debug!("Received {} bytes over TCP", n);
                        if inbound_tx.send(buffer[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Failed to read from TCP stream: {}", e);
                        break;
                    }
                }
            }
        });

        self.writer = Some(writer);
        self.inbound = Some(inbound_rx);
        self.rx_handle = Some(rx_handle);

        let handshake = async {
            self.send_raw(&HANDSHAKE).await?;
            self.await_handshake_reply().await
        };
        if let Err(e) = handshake.await {
            self.shutdown_reader();
            self.writer = None;
            return Err(e);
        }

        Ok(())
    }

    async fn close(&mut self) -> ProjComResult<()> {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.shutdown().await {
                warn!("Failed to shutdown TCP stream: {}", e);
            }
            info!(
                "TCP connection to {}:{} closed",
                self.settings.host, self.settings.port
            );
        }
        self.shutdown_reader();
        Ok(())
    }

    async fn send(&mut self, request: &WireRequest) -> ProjComResult<()> {
        self.send_raw(request.as_bytes()).await
    }

    async fn next_reply(&mut self) -> ProjComResult<RawReply> {
        let inbound = self
            .inbound
            .as_mut()
            .ok_or_else(|| ProjComError::transport("TCP connection is not open"))?;

        match inbound.recv().await {
            Some(data) => Ok(RawReply::Line(data)),
            None => Err(ProjComError::transport("TCP connection closed")),
        }
    }

    fn discard_buffered(&mut self) -> usize {
        let mut discarded = 0;
        if let Some(inbound) = self.inbound.as_mut() {
            while inbound.try_recv().is_ok() {
                discarded += 1;
            }
        }
        discarded
    }
}

impl TcpTransport {
    async fn send_raw(&mut self, data: &[u8]) -> ProjComResult<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| ProjComError::transport("TCP connection is not open"))?;

        writer.write_all(data).await?;
        writer.flush().await?;
        debug!("Sent {} bytes over TCP: {}", data.len(), hex::encode(data));
        Ok(())
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.shutdown_reader();
    }
}
