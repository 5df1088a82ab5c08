use crate::cli::args::OutputFormat;
use crate::core::communication::TransportType;
use crate::core::connection::ExchangeStatistics;
use crate::domain::command::{Command, Mode};
use crate::domain::config::{ConnectionConfig, DeviceConfig, ProjComConfig};
use serde::Serialize;
use std::io;
use tabled::{Table, Tabled};

/// Outcome of one projector command, as shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub target: String,
    pub transport: String,
    pub command: String,
    pub value: Option<String>,
    pub statistics: ExchangeStatistics,
}

impl CommandReport {
    pub fn new(
        target: impl Into<String>,
        transport: TransportType,
        command: &Command,
        value: String,
        statistics: ExchangeStatistics,
    ) -> Self {
        Self {
            target: target.into(),
            transport: transport.to_string(),
            command: command.to_string(),
            // Setters have nothing to show
            value: match command.mode {
                Mode::Get => Some(value),
                Mode::Set(_) => None,
            },
            statistics,
        }
    }
}

/// Serial port found on this machine
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct PortInfo {
    pub name: String,
    pub kind: String,
}

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_report(&self, report: &CommandReport) -> Result<(), OutputError>;
    fn write_config(&self, config: &ProjComConfig) -> Result<(), OutputError>;
    fn write_devices(&self, devices: &[DeviceConfig]) -> Result<(), OutputError>;
    fn write_ports(&self, ports: &[PortInfo]) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::ProjComError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_report(&self, report: &CommandReport) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => match &report.value {
                Some(value) => println!("{}", value),
                None => println!("OK"),
            },
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(report)?;
                println!("{}", output);
            }
            OutputFormat::Table => {
                let table = Table::new(vec![ReportTableRow::from(report)]);
                println!("{}", table);
            }
        }
        Ok(())
    }

    fn write_config(&self, config: &ProjComConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                println!("ProjCom Configuration:");
                println!("  Log level: {}", config.global.log_level);
                println!("  Timeout: {}ms", config.global.timeout_ms);

                if !config.devices.is_empty() {
                    println!("  Devices:");
                    for device in &config.devices {
                        let desc = if device.description.is_empty() { "No description" } else { &device.description };
                        println!("    {}: {}", device.name, desc);
                    }
                }
            }
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(config)?;
                println!("{}", output);
            }
            OutputFormat::Table => {
                if !config.devices.is_empty() {
                    let table_data: Vec<DeviceTableRow> = config.devices.iter().map(DeviceTableRow::from).collect();
                    let table = Table::new(table_data);
                    println!("{}", table);
                }
            }
        }
        Ok(())
    }

    fn write_devices(&self, devices: &[DeviceConfig]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                for device in devices {
                    println!("Device: {}", device.name);
                    let desc = if device.description.is_empty() { "No description" } else { &device.description };
                    println!("  Description: {}", desc);
                    println!("  Transport: {}", get_transport_type(&device.connection));
                    println!("  Address: {}", get_address(&device.connection));
                    println!();
                }
            }
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(devices)?;
                println!("{}", output);
            }
            OutputFormat::Table => {
                if !devices.is_empty() {
                    let table_data: Vec<DeviceTableRow> = devices.iter().map(DeviceTableRow::from).collect();
                    let table = Table::new(table_data);
                    println!("{}", table);
                }
            }
        }
        Ok(())
    }

    fn write_ports(&self, ports: &[PortInfo]) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                if ports.is_empty() {
                    println!("No serial ports found");
                }
                for port in ports {
                    println!("{} ({})", port.name, port.kind);
                }
            }
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(ports)?;
                println!("{}", output);
            }
            OutputFormat::Table => {
                if !ports.is_empty() {
                    println!("{}", Table::new(ports.to_vec()));
                }
            }
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "message": message,
                    "level": "info"
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                println!("{}", message);
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "error": error,
                    "level": "error"
                });
                eprintln!("{}", serde_json::to_string_pretty(&output)?);
            }
            _ => {
                eprintln!("Error: {}", error);
            }
        }
        Ok(())
    }
}

/// Table row for a command outcome
#[derive(Tabled)]
struct ReportTableRow {
    target: String,
    transport: String,
    command: String,
    value: String,
    response_ms: String,
}

impl From<&CommandReport> for ReportTableRow {
    fn from(report: &CommandReport) -> Self {
        Self {
            target: report.target.clone(),
            transport: report.transport.clone(),
            command: report.command.clone(),
            value: report.value.clone().unwrap_or_else(|| "OK".to_string()),
            response_ms: report
                .statistics
                .last_response_time_ms
                .map(|ms| ms.to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Table row for device configuration
#[derive(Tabled)]
struct DeviceTableRow {
    name: String,
    description: String,
    transport: String,
    address: String,
}

impl From<&DeviceConfig> for DeviceTableRow {
    fn from(device: &DeviceConfig) -> Self {
        Self {
            name: device.name.clone(),
            description: device.description.clone(),
            transport: get_transport_type(&device.connection).to_string(),
            address: get_address(&device.connection),
        }
    }
}

/// Helper function to get transport type from connection config
pub fn get_transport_type(connection: &ConnectionConfig) -> TransportType {
    match connection {
        ConnectionConfig::Serial { .. } => TransportType::Serial,
        ConnectionConfig::Tcp { .. } => TransportType::Tcp,
        ConnectionConfig::Http { .. } => TransportType::Http,
    }
}

fn get_address(connection: &ConnectionConfig) -> String {
    match connection {
        ConnectionConfig::Serial { port, baud_rate, .. } => format!("{}@{}", port, baud_rate),
        ConnectionConfig::Tcp { host, port, .. } => format!("{}:{}", host, port),
        ConnectionConfig::Http { host, .. } => format!("http://{}", host),
    }
}
