use crate::domain::command::{Command as ProjectorRequest, CommandName, Mode};
use crate::domain::config::{FlowControlConfig, ParityConfig};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Command line arguments for ProjCom
#[derive(Parser, Debug)]
#[command(
    name = "projcom",
    version = env!("CARGO_PKG_VERSION"),
    about = "Projector control over serial, ESC/VP.net and HTTP",
    long_about = "Send ESC/VP21 commands to a projector through its RS-232C port, its ESC/VP.net TCP service or its embedded web interface, with one command surface for all three."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Time the projector gets to answer, in milliseconds
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Control a projector on a serial port
    Serial(SerialArgs),
    /// Control a projector over ESC/VP.net
    Tcp(TcpArgs),
    /// Control a projector through its web interface
    Http(HttpArgs),
    /// Control a projector defined in the configuration
    Device(DeviceArgs),
    /// List available serial ports
    Ports,
    /// Configuration management commands
    Config(ConfigArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// Table output
    Table,
}

/// Serial connection arguments
#[derive(ClapArgs, Debug)]
pub struct SerialArgs {
    /// Serial port path
    #[arg(short, long)]
    pub port: String,

    /// Baud rate
    #[arg(short, long, default_value = "9600")]
    pub baud: u32,

    /// Data bits
    #[arg(long, default_value = "8")]
    pub data_bits: u8,

    /// Stop bits
    #[arg(long, default_value = "1")]
    pub stop_bits: u8,

    /// Parity (none, even, odd)
    #[arg(long, value_enum, default_value = "none")]
    pub parity: ParityArg,

    /// Flow control (none, software, hardware)
    #[arg(long, value_enum, default_value = "none")]
    pub flow_control: FlowControlArg,

    /// Projector command
    #[command(subcommand)]
    pub command: ProjectorCommand,
}

/// ESC/VP.net connection arguments
#[derive(ClapArgs, Debug)]
pub struct TcpArgs {
    /// Projector address
    pub host: String,

    /// ESC/VP.net port
    #[arg(short, long, default_value = "3629")]
    pub port: u16,

    /// Connect timeout in milliseconds
    #[arg(long, default_value = "3000")]
    pub connect_timeout: u64,

    /// How long to wait for the handshake reply, in milliseconds
    #[arg(long, default_value = "1000")]
    pub handshake_wait: u64,

    /// Projector command
    #[command(subcommand)]
    pub command: ProjectorCommand,
}

/// Web interface arguments
#[derive(ClapArgs, Debug)]
pub struct HttpArgs {
    /// Projector address, optionally with a port
    pub host: String,

    /// Page that shows a command's value, as NAME=PAGE (repeatable)
    #[arg(long = "page", value_parser = parse_page)]
    pub pages: Vec<(String, String)>,

    /// Projector command
    #[command(subcommand)]
    pub command: ProjectorCommand,
}

/// Configured device arguments
#[derive(ClapArgs, Debug)]
pub struct DeviceArgs {
    /// Device name from the configuration
    pub name: String,

    /// Projector command
    #[command(subcommand)]
    pub command: ProjectorCommand,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Projector commands. Give a value to set, omit it to read.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ProjectorCommand {
    /// Power state (ON, OFF)
    Power { value: Option<String> },
    /// Input source code
    Source { value: Option<String> },
    /// Lamp brightness mode
    Luminance { value: Option<String> },
    /// A/V mute (ON, OFF)
    Mute { value: Option<String> },
    /// Freeze the picture (ON, OFF)
    Freeze { value: Option<String> },
    /// Horizontal image flip (ON, OFF)
    Hreverse { value: Option<String> },
    /// Vertical image flip (ON, OFF)
    Vreverse { value: Option<String> },
    /// Read lamp hours
    Lamp,
    /// Read the last error code
    Error,
}

impl ProjectorCommand {
    pub fn to_command(&self) -> ProjectorRequest {
        let (name, value) = match self {
            Self::Power { value } => (CommandName::Power, value),
            Self::Source { value } => (CommandName::Source, value),
            Self::Luminance { value } => (CommandName::Luminance, value),
            Self::Mute { value } => (CommandName::Mute, value),
            Self::Freeze { value } => (CommandName::Freeze, value),
            Self::Hreverse { value } => (CommandName::HReverse, value),
            Self::Vreverse { value } => (CommandName::VReverse, value),
            Self::Lamp => return ProjectorRequest::get(CommandName::Lamp),
            Self::Error => return ProjectorRequest::get(CommandName::Error),
        };
        ProjectorRequest::new(name, Mode::from(value.clone()))
    }
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Validate configuration
    Validate {
        /// Configuration file path
        file: Option<String>,
    },
    /// Create default configuration
    Init {
        /// Directory to create `.projcom/config.toml` in
        #[arg(short, long)]
        dir: Option<String>,
        /// Global configuration
        #[arg(short, long)]
        global: bool,
    },
    /// List device configurations
    Devices,
}

/// Parity configuration argument
#[derive(ValueEnum, Debug, Clone)]
pub enum ParityArg {
    None,
    Even,
    Odd,
}

/// Flow control configuration argument
#[derive(ValueEnum, Debug, Clone)]
pub enum FlowControlArg {
    None,
    Software,
    Hardware,
}

fn parse_page(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, page)) if !name.is_empty() && !page.is_empty() => {
            Ok((name.to_ascii_uppercase(), page.to_string()))
        }
        _ => Err(format!("expected NAME=PAGE, got '{}'", raw)),
    }
}

impl From<ParityArg> for ParityConfig {
    fn from(parity: ParityArg) -> Self {
        match parity {
            ParityArg::None => Self::None,
            ParityArg::Even => Self::Even,
            ParityArg::Odd => Self::Odd,
        }
    }
}

impl From<FlowControlArg> for FlowControlConfig {
    fn from(flow_control: FlowControlArg) -> Self {
        match flow_control {
            FlowControlArg::None => Self::None,
            FlowControlArg::Software => Self::Software,
            FlowControlArg::Hardware => Self::Hardware,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tcp_get_parses() {
        let args = Args::parse_from(["projcom", "tcp", "10.0.0.7", "power"]);
        match args.command {
            Command::Tcp(tcp) => {
                assert_eq!(tcp.host, "10.0.0.7");
                assert_eq!(tcp.port, 3629);
                assert_eq!(tcp.command.to_command(), ProjectorRequest::get(CommandName::Power));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_set_value_and_global_flags() {
        let args = Args::parse_from([
            "projcom", "serial", "--port", "/dev/ttyUSB0", "source", "30", "--output", "json",
            "--timeout", "800",
        ]);
        assert!(matches!(args.output, OutputFormat::Json));
        assert_eq!(args.timeout, Some(800));
        match args.command {
            Command::Serial(serial) => {
                assert_eq!(
                    serial.command.to_command(),
                    ProjectorRequest::set(CommandName::Source, "30")
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_http_page_overrides() {
        let args = Args::parse_from([
            "projcom", "http", "10.0.0.7", "--page", "mute=webconf.dll?page=5", "mute",
        ]);
        match args.command {
            Command::Http(http) => {
                assert_eq!(
                    http.pages,
                    vec![("MUTE".to_string(), "webconf.dll?page=5".to_string())]
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(parse_page("nopage").is_err());
    }

    #[test]
    fn test_lamp_takes_no_value() {
        assert!(Args::try_parse_from(["projcom", "device", "hall", "lamp", "5"]).is_err());
        let args = Args::parse_from(["projcom", "device", "hall", "lamp"]);
        assert!(matches!(
            args.command,
            Command::Device(DeviceArgs { command: ProjectorCommand::Lamp, .. })
        ));
    }
}
