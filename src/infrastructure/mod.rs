// Infrastructure module - Transports, configuration and logging
pub mod config;
pub mod http;
pub mod logging;
pub mod serial;
pub mod tcp;

use crate::core::communication::Transport;
use crate::core::connection::{Connection, Projector};
use crate::domain::config::ConnectionConfig;
use crate::domain::error::ProjComResult;
use std::time::Duration;

/// Build the transport a connection config describes.
pub fn create_transport(config: &ConnectionConfig) -> ProjComResult<Box<dyn Transport>> {
    Ok(match config {
        ConnectionConfig::Serial { .. } => Box::new(serial::SerialTransport::from_config(config)?),
        ConnectionConfig::Tcp { .. } => Box::new(tcp::TcpTransport::from_config(config)?),
        ConnectionConfig::Http { .. } => Box::new(http::HttpTransport::from_config(config)?),
    })
}

/// Build an opened projector for a connection config.
pub async fn connect(config: &ConnectionConfig, command_timeout: Duration) -> ProjComResult<Projector> {
    let connection = Connection::new(create_transport(config)?).with_command_timeout(command_timeout);
    let mut projector = Projector::new(connection);
    projector.open().await?;
    Ok(projector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::communication::TransportType;
    use crate::core::connection::ConnectionState;

    #[test]
    fn test_transport_matches_config() {
        let serial = create_transport(&ConnectionConfig::serial("/dev/ttyUSB0")).unwrap();
        assert_eq!(serial.transport_type(), TransportType::Serial);
        assert!(serial.is_persistent());

        let tcp = create_transport(&ConnectionConfig::tcp("192.168.1.20")).unwrap();
        assert_eq!(tcp.transport_type(), TransportType::Tcp);

        let http = create_transport(&ConnectionConfig::http("192.168.1.20")).unwrap();
        assert_eq!(http.transport_type(), TransportType::Http);
        assert!(!http.is_persistent());
    }

    #[tokio::test]
    async fn test_connect_http_is_ready_without_network() {
        let projector = connect(&ConnectionConfig::http("127.0.0.1:9"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(projector.state(), ConnectionState::Ready);
    }
}
