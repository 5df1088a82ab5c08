use crate::core::communication::{Codec, RawReply, Transport, TransportType, WireRequest};
use crate::domain::config::{ConnectionConfig, FlowControlConfig, ParityConfig};
use crate::domain::error::{ProjComError, ProjComResult};
use async_trait::async_trait;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

type SharedPort = Arc<Mutex<Box<dyn SerialPort>>>;

/// Serial line settings
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: serialport::DataBits,
    pub stop_bits: serialport::StopBits,
    pub parity: serialport::Parity,
    pub flow_control: serialport::FlowControl,
}

impl SerialSettings {
    pub fn from_config(config: &ConnectionConfig) -> ProjComResult<Self> {
        match config {
            ConnectionConfig::Serial {
                port,
                baud_rate,
                data_bits,
                stop_bits,
                parity,
                flow_control,
            } => Ok(Self {
                port: port.clone(),
                baud_rate: *baud_rate,
                data_bits: match data_bits {
                    5 => serialport::DataBits::Five,
                    6 => serialport::DataBits::Six,
                    7 => serialport::DataBits::Seven,
                    8 => serialport::DataBits::Eight,
                    _ => {
                        return Err(ProjComError::Config {
                            message: format!("Invalid data bits: {}", data_bits),
                        })
                    }
                },
                stop_bits: match stop_bits {
                    1 => serialport::StopBits::One,
                    2 => serialport::StopBits::Two,
                    _ => {
                        return Err(ProjComError::Config {
                            message: format!("Invalid stop bits: {}", stop_bits),
                        })
                    }
                },
                parity: match parity {
                    ParityConfig::None => serialport::Parity::None,
                    ParityConfig::Even => serialport::Parity::Even,
                    ParityConfig::Odd => serialport::Parity::Odd,
                },
                flow_control: match flow_control {
                    FlowControlConfig::None => serialport::FlowControl::None,
                    FlowControlConfig::Software => serialport::FlowControl::Software,
                    FlowControlConfig::Hardware => serialport::FlowControl::Hardware,
                },
            }),
            _ => Err(ProjComError::Config {
                message: "Invalid connection type for serial transport".to_string(),
            }),
        }
    }
}

/// Projector attached to a local serial port
pub struct SerialTransport {
    settings: SerialSettings,
    port: Option<SharedPort>,
    inbound: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
    rx_handle: Option<tokio::task::JoinHandle<()>>,
}

impl SerialTransport {
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            settings,
            port: None,
            inbound: None,
            rx_handle: None,
        }
    }

    pub fn from_config(config: &ConnectionConfig) -> ProjComResult<Self> {
        Ok(Self::new(SerialSettings::from_config(config)?))
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    fn shutdown_reader(&mut self) {
        if let Some(handle) = self.rx_handle.take() {
            handle.abort();
        }
        self.inbound = None;
    }
}

#[async_trait]
impl Transport for SerialTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Serial
    }

    fn codec(&self) -> Codec {
        Codec::Line
    }

    async fn open(&mut self) -> ProjComResult<()> {
        self.shutdown_reader();
        self.port = None;

        let port = serialport::new(&self.settings.port, self.settings.baud_rate)
            .data_bits(self.settings.data_bits)
            .stop_bits(self.settings.stop_bits)
            .parity(self.settings.parity)
            .flow_control(self.settings.flow_control)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|e| {
                ProjComError::transport(format!(
                    "Failed to open serial port {}: {}",
                    self.settings.port, e
                ))
            })?;

        info!(
            "Serial port {} opened at {} baud",
            self.settings.port, self.settings.baud_rate
        );

        let port: SharedPort = Arc::new(Mutex::new(port));
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let port_rx = Arc::clone(&port);

        // RX task - every read that returns data is one inbound payload
        let rx_handle = tokio::spawn(async move {
            let mut buffer = vec![0u8; 1024];

            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;

                let mut port = port_rx.lock().await;
                match port.read(&mut buffer) {
                    Ok(0) => continue,
                    Ok(n) => {
                        debug!("Received {} bytes over serial", n);
                        if inbound_tx.send(buffer[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                    Err(e) => {
                        error!("Failed to read from serial port: {}", e);
                        break;
                    }
                }
            }
        });

        self.port = Some(port);
        self.inbound = Some(inbound_rx);
        self.rx_handle = Some(rx_handle);
        Ok(())
    }

    async fn close(&mut self) -> ProjComResult<()> {
        self.shutdown_reader();
        if self.port.take().is_some() {
            info!("Serial port {} closed", self.settings.port);
        }
        Ok(())
    }

    async fn send(&mut self, request: &WireRequest) -> ProjComResult<()> {
        let port = self
            .port
            .as_ref()
            .ok_or_else(|| ProjComError::transport("serial port is not open"))?;

        let data = request.as_bytes();
        let mut port = port.lock().await;
        port.write_all(data)?;
        port.flush()?;
        debug!("Sent {} bytes over serial: {}", data.len(), hex::encode(data));
        Ok(())
    }

    async fn next_reply(&mut self) -> ProjComResult<RawReply> {
        let inbound = self
            .inbound
            .as_mut()
            .ok_or_else(|| ProjComError::transport("serial port is not open"))?;

        match inbound.recv().await {
            Some(data) => Ok(RawReply::Line(data)),
            None => {
                warn!("Serial reader for {} stopped", self.settings.port);
                Err(ProjComError::transport("serial port closed"))
            }
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

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.shutdown_reader();
    }
}
