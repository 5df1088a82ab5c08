use crate::cli::args::{Args, Command, ConfigCommand, HttpArgs, ProjectorCommand, SerialArgs, TcpArgs};
use crate::cli::output::{CommandReport, ConsoleWriter, OutputWriter, PortInfo};
use crate::domain::config::{ConnectionConfig, ProjComConfig};
use crate::domain::error::{ProjComError, ProjComResult};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::logging::init_logging;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Execute CLI command
pub async fn execute_command(args: Args) -> ProjComResult<()> {
    let writer = ConsoleWriter::new(args.output.clone());

    // Load configuration using ConfigManager
    let config_manager = ConfigManager::new()?;
    let config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(Path::new(config_path))?
    } else {
        config_manager.load_config()?
    };

    if !args.quiet {
        init_logging(&config.global.log_level, args.verbose).map_err(|e| ProjComError::Config {
            message: format!("Failed to initialize logging: {}", e),
        })?;
    }

    let timeout = Duration::from_millis(args.timeout.unwrap_or(config.global.timeout_ms));

    match args.command {
        Command::Serial(serial_args) => {
            let target = serial_args.port.clone();
            let command = serial_args.command.clone();
            run_projector_command(&writer, target, serial_connection(serial_args), &command, timeout).await
        }
        Command::Tcp(tcp_args) => {
            let target = format!("{}:{}", tcp_args.host, tcp_args.port);
            let command = tcp_args.command.clone();
            run_projector_command(&writer, target, tcp_connection(tcp_args), &command, timeout).await
        }
        Command::Http(http_args) => {
            let target = http_args.host.clone();
            let command = http_args.command.clone();
            run_projector_command(&writer, target, http_connection(http_args), &command, timeout).await
        }
        Command::Device(device_args) => {
            let device = config.find_device(&device_args.name)?;
            run_projector_command(
                &writer,
                device.name.clone(),
                device.connection.clone(),
                &device_args.command,
                timeout,
            )
            .await
        }
        Command::Ports => {
            writer.write_ports(&list_ports()?)?;
            Ok(())
        }
        Command::Config(config_args) => {
            execute_config_command(config_args.command, &writer, &config, &config_manager)
        }
        Command::Version => {
            writer.write_message(&format!("projcom {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

/// Open the link, run one command, close the link.
async fn run_projector_command(
    writer: &ConsoleWriter,
    target: String,
    connection: ConnectionConfig,
    command: &ProjectorCommand,
    timeout: Duration,
) -> ProjComResult<()> {
    let request = command.to_command();
    debug!("Running {} against {}", request, target);

    let mut projector = crate::infrastructure::connect(&connection, timeout).await?;
    let result = projector.execute(request.clone()).await;
    let transport = projector.connection().transport_type();
    let statistics = projector.statistics().clone();

    if let Err(e) = projector.close().await {
        warn!("Failed to close connection to {}: {}", target, e);
    }

    let value = result?;
    writer.write_report(&CommandReport::new(target, transport, &request, value, statistics))?;
    Ok(())
}

fn serial_connection(args: SerialArgs) -> ConnectionConfig {
    ConnectionConfig::Serial {
        port: args.port,
        baud_rate: args.baud,
        data_bits: args.data_bits,
        stop_bits: args.stop_bits,
        parity: args.parity.into(),
        flow_control: args.flow_control.into(),
    }
}

fn tcp_connection(args: TcpArgs) -> ConnectionConfig {
    match ConnectionConfig::tcp(args.host) {
        ConnectionConfig::Tcp { host, keep_alive, nodelay, .. } => ConnectionConfig::Tcp {
            host,
            port: args.port,
            timeout_ms: args.connect_timeout,
            keep_alive,
            nodelay,
            handshake_wait_ms: args.handshake_wait,
        },
        other => other,
    }
}

fn http_connection(args: HttpArgs) -> ConnectionConfig {
    match ConnectionConfig::http(args.host) {
        ConnectionConfig::Http { host, timeout_ms, .. } => ConnectionConfig::Http {
            host,
            timeout_ms,
            pages: if args.pages.is_empty() {
                None
            } else {
                Some(args.pages.into_iter().collect::<BTreeMap<_, _>>())
            },
        },
        other => other,
    }
}

fn list_ports() -> ProjComResult<Vec<PortInfo>> {
    let ports = serialport::available_ports()?;
    Ok(ports
        .into_iter()
        .map(|port| PortInfo {
            name: port.port_name,
            kind: match port.port_type {
                serialport::SerialPortType::UsbPort(_) => "usb",
                serialport::SerialPortType::PciPort => "pci",
                serialport::SerialPortType::BluetoothPort => "bluetooth",
                serialport::SerialPortType::Unknown => "unknown",
            }
            .to_string(),
        })
        .collect())
}

fn execute_config_command(
    command: ConfigCommand,
    writer: &ConsoleWriter,
    config: &ProjComConfig,
    config_manager: &ConfigManager,
) -> ProjComResult<()> {
    match command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Validate { file } => {
            let loaded = match &file {
                Some(config_path) => config_manager.load_config_from_path(Path::new(config_path)),
                None => config_manager.load_config(),
            };
            let label = file.as_deref().unwrap_or("Current configuration");

            match loaded {
                Ok(candidate) => {
                    let problems = candidate.validate();
                    if problems.is_empty() {
                        writer.write_message(&format!("{} is valid", label))?;
                        Ok(())
                    } else {
                        for problem in &problems {
                            writer.write_error(problem)?;
                        }
                        Err(ProjComError::Config {
                            message: format!("{} has {} problem(s)", label, problems.len()),
                        })
                    }
                }
                Err(e) => {
                    writer.write_error(&format!("Configuration validation failed: {}", e))?;
                    Err(e)
                }
            }
        }
        ConfigCommand::Init { dir, global } => {
            if global {
                let global_path = config_manager.get_global_config_path_ref();
                config_manager.save_config_to_path(global_path, &ProjComConfig::default())?;
                writer.write_message(&format!("Global configuration initialized at '{}'", global_path.display()))?;
            } else {
                let dir = match dir {
                    Some(dir) => dir.into(),
                    None => std::env::current_dir().map_err(|e| ProjComError::Config {
                        message: format!("Failed to get current directory: {}", e),
                    })?,
                };
                let path = config_manager.init_project_config(&dir)?;
                writer.write_message(&format!("Project configuration initialized at '{}'", path.display()))?;
            }
            Ok(())
        }
        ConfigCommand::Devices => {
            writer.write_devices(&config.devices)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{FlowControlArg, ParityArg};

    #[test]
    fn test_tcp_connection_from_args() {
        let config = tcp_connection(TcpArgs {
            host: "10.0.0.7".to_string(),
            port: 4000,
            connect_timeout: 700,
            handshake_wait: 0,
            command: ProjectorCommand::Lamp,
        });
        assert!(matches!(
            config,
            ConnectionConfig::Tcp { port: 4000, timeout_ms: 700, handshake_wait_ms: 0, keep_alive: true, .. }
        ));
    }

    #[test]
    fn test_http_connection_pages() {
        let config = http_connection(HttpArgs {
            host: "10.0.0.7".to_string(),
            pages: Vec::new(),
            command: ProjectorCommand::Lamp,
        });
        assert!(matches!(config, ConnectionConfig::Http { pages: None, .. }));

        let config = http_connection(HttpArgs {
            host: "10.0.0.7".to_string(),
            pages: vec![("MUTE".to_string(), "webconf.dll?page=5".to_string())],
            command: ProjectorCommand::Lamp,
        });
        match config {
            ConnectionConfig::Http { pages: Some(pages), .. } => {
                assert_eq!(pages.get("MUTE").map(String::as_str), Some("webconf.dll?page=5"));
            }
            other => panic!("unexpected config {:?}", other),
        }
    }

    #[test]
    fn test_serial_connection_from_args() {
        let config = serial_connection(SerialArgs {
            port: "COM4".to_string(),
            baud: 19200,
            data_bits: 8,
            stop_bits: 1,
            parity: ParityArg::Even,
            flow_control: FlowControlArg::None,
            command: ProjectorCommand::Error,
        });
        assert!(matches!(config, ConnectionConfig::Serial { baud_rate: 19200, .. }));
    }
}
