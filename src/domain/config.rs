use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// ProjCom configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjComConfig {
    /// Global configuration
    #[serde(default)]
    pub global: GlobalConfig,
    /// Device configurations
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Time allowed for a device to answer one command, in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device name
    pub name: String,
    /// Device description
    #[serde(default)]
    pub description: String,
    /// Connection type
    pub connection: ConnectionConfig,
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ConnectionConfig {
    #[serde(rename = "serial")]
    Serial {
        port: String,
        #[serde(default = "default_baud_rate")]
        baud_rate: u32,
        #[serde(default = "default_data_bits")]
        data_bits: u8,
        #[serde(default = "default_stop_bits")]
        stop_bits: u8,
        #[serde(default = "default_parity")]
        parity: ParityConfig,
        #[serde(default = "default_flow_control")]
        flow_control: FlowControlConfig,
    },
    #[serde(rename = "tcp")]
    Tcp {
        host: String,
        #[serde(default = "default_tcp_port")]
        port: u16,
        #[serde(default = "default_tcp_timeout")]
        timeout_ms: u64,
        /// SO_KEEPALIVE on the long-lived session socket
        #[serde(default = "default_keep_alive")]
        keep_alive: bool,
        /// TCP_NODELAY, so each short command line goes out immediately
        #[serde(default = "default_nodelay")]
        nodelay: bool,
        /// How long to wait for the device to answer the ESC/VP.net handshake
        #[serde(default = "default_handshake_wait")]
        handshake_wait_ms: u64,
    },
    #[serde(rename = "http")]
    Http {
        host: String,
        #[serde(default = "default_http_timeout")]
        timeout_ms: u64,
        /// Configuration page per readable command, e.g. `LUMINANCE = "webconf.dll?page=3"`.
        /// The built-in table is used when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pages: Option<BTreeMap<String, String>>,
    },
}

/// Parity configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParityConfig {
    None,
    Odd,
    Even,
}

/// Flow control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlConfig {
    None,
    Hardware,
    Software,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    5000
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_data_bits() -> u8 {
    8
}

fn default_stop_bits() -> u8 {
    1
}

fn default_parity() -> ParityConfig {
    ParityConfig::None
}

fn default_flow_control() -> FlowControlConfig {
    FlowControlConfig::None
}

/// ESC/VP.net listens on 3629
pub fn default_tcp_port() -> u16 {
    3629
}

fn default_tcp_timeout() -> u64 {
    3000
}

fn default_keep_alive() -> bool {
    true
}

fn default_nodelay() -> bool {
    true
}

fn default_handshake_wait() -> u64 {
    1000
}

fn default_http_timeout() -> u64 {
    5000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for ParityConfig {
    fn default() -> Self {
        default_parity()
    }
}

impl Default for FlowControlConfig {
    fn default() -> Self {
        default_flow_control()
    }
}

impl ConnectionConfig {
    /// Serial line with the projector's default 9600 8N1 settings.
    pub fn serial(port: impl Into<String>) -> Self {
        ConnectionConfig::Serial {
            port: port.into(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            stop_bits: default_stop_bits(),
            parity: default_parity(),
            flow_control: default_flow_control(),
        }
    }

    /// ESC/VP.net socket with default port and timeouts.
    pub fn tcp(host: impl Into<String>) -> Self {
        ConnectionConfig::Tcp {
            host: host.into(),
            port: default_tcp_port(),
            timeout_ms: default_tcp_timeout(),
            keep_alive: default_keep_alive(),
            nodelay: default_nodelay(),
            handshake_wait_ms: default_handshake_wait(),
        }
    }

    /// Web interface with the built-in page table.
    pub fn http(host: impl Into<String>) -> Self {
        ConnectionConfig::Http {
            host: host.into(),
            timeout_ms: default_http_timeout(),
            pages: None,
        }
    }
}
