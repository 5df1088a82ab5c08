use crate::core::communication::{Codec, PageMap, RawReply, Transport, TransportType, WireRequest};
use crate::domain::config::ConnectionConfig;
use crate::domain::error::{ProjComError, ProjComResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Web interface settings
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub host: String,
    pub timeout: Duration,
    pub pages: Arc<PageMap>,
}

impl HttpSettings {
    pub fn from_config(config: &ConnectionConfig) -> ProjComResult<Self> {
        match config {
            ConnectionConfig::Http {
                host,
                timeout_ms,
                pages,
            } => Ok(Self {
                host: host.clone(),
                timeout: Duration::from_millis(*timeout_ms),
                pages: Arc::new(match pages {
                    Some(table) => PageMap::from_config(table)?,
                    None => PageMap::default(),
                }),
            }),
            _ => Err(ProjComError::Config {
                message: "Invalid connection type for HTTP transport".to_string(),
            }),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.host)
    }
}

/// Projector reached through its embedded web server.
///
/// Stateless: every command is one independent GET, so open and close
/// have nothing to do.
pub struct HttpTransport {
    settings: HttpSettings,
    client: reqwest::Client,
    reply: Option<RawReply>,
}

impl HttpTransport {
    pub fn new(settings: HttpSettings) -> ProjComResult<Self> {
        // The web server only answers requests that appear to come from its own pages
        let referer = format!("{}/", settings.base_url());
        let mut headers = HeaderMap::new();
        headers.insert(
            REFERER,
            HeaderValue::from_str(&referer).map_err(|_| ProjComError::Config {
                message: format!("Invalid HTTP host '{}'", settings.host),
            })?,
        );

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            settings,
            client,
            reply: None,
        })
    }

    pub fn from_config(config: &ConnectionConfig) -> ProjComResult<Self> {
        Self::new(HttpSettings::from_config(config)?)
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }
}

/// A request that ran out of time is a timeout, not a lost transport.
fn request_error(error: reqwest::Error) -> ProjComError {
    if error.is_timeout() {
        ProjComError::Timeout
    } else {
        ProjComError::Http(error)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Http
    }

    fn codec(&self) -> Codec {
        Codec::Http(Arc::clone(&self.settings.pages))
    }

    fn is_persistent(&self) -> bool {
        false
    }

    async fn open(&mut self) -> ProjComResult<()> {
        Ok(())
    }

    async fn close(&mut self) -> ProjComResult<()> {
        self.reply = None;
        Ok(())
    }

    async fn send(&mut self, request: &WireRequest) -> ProjComResult<()> {
        let target = match request {
            WireRequest::Http { target } => target,
            WireRequest::Line(_) => {
                return Err(ProjComError::transport(
                    "HTTP transport cannot carry line requests",
                ))
            }
        };

        let url = format!("{}{}", self.settings.base_url(), target);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(request_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(request_error)?;
        info!("GET {} -> {} ({} bytes)", target, status, body.len());

        self.reply = Some(RawReply::Http { status, body });
        Ok(())
    }

    async fn next_reply(&mut self) -> ProjComResult<RawReply> {
        self.reply
            .take()
            .ok_or_else(|| ProjComError::transport("no HTTP response pending"))
    }

    fn discard_buffered(&mut self) -> usize {
        usize::from(self.reply.take().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connection::{Connection, ConnectionState};
    use crate::domain::command::{Command, CommandName};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn connection_for(server: &MockServer) -> Connection {
        let transport = HttpTransport::from_config(&ConnectionConfig::http(
            server.address().to_string(),
        ))
        .unwrap();
        Connection::new(Box::new(transport))
    }

    #[tokio::test]
    async fn test_set_sends_cgi_query_with_referer() {
        let server = MockServer::start().await;
        let referer = format!("http://{}/", server.address());
        Mock::given(method("GET"))
            .and(path("/cgi-bin/webconf.dll"))
            .and(query_param("PWR", "ON"))
            .and(header("referer", referer.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .expect(1)
            .mount(&server)
            .await;

        let mut connection = connection_for(&server);
        let value = connection
            .execute(Command::set(CommandName::Power, "ON"))
            .await
            .unwrap();
        assert_eq!(value, "");
    }

    #[tokio::test]
    async fn test_non_200_is_a_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("busy"))
            .mount(&server)
            .await;

        let mut connection = connection_for(&server);
        let result = connection.execute(Command::set(CommandName::Freeze, "ON")).await;
        assert!(matches!(result, Err(ProjComError::Protocol { ref raw }) if raw == "busy"));
    }

    #[tokio::test]
    async fn test_get_reads_checked_radio_from_page() {
        let server = MockServer::start().await;
        let page = r#"<html><body><form>
            <input type="radio" name="LUMINANCE" value="00">Normal
            <input type="radio" name="LUMINANCE" value="01" checked>ECO
        </form></body></html>"#;
        Mock::given(method("GET"))
            .and(path("/cgi-bin/webconf.dll"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let mut connection = connection_for(&server);
        let value = connection
            .execute(Command::get(CommandName::Luminance))
            .await
            .unwrap();
        assert_eq!(value, "01");
    }

    #[tokio::test]
    async fn test_unmapped_get_never_reaches_the_server() {
        let server = MockServer::start().await;
        let mut connection = connection_for(&server);

        let result = connection.execute(Command::get(CommandName::Mute)).await;
        assert!(matches!(result, Err(ProjComError::UnsupportedOperation(_))));
        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn test_slow_server_hits_the_command_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let mut connection =
            connection_for(&server).with_command_timeout(Duration::from_millis(100));
        let started = std::time::Instant::now();
        let result = connection.execute(Command::set(CommandName::Power, "ON")).await;

        assert!(matches!(result, Err(ProjComError::Timeout)));
        assert!(started.elapsed() < Duration::from_millis(1000));
        assert_eq!(connection.statistics().timeouts, 1);
        assert_eq!(connection.state(), ConnectionState::Ready);
    }

    #[tokio::test]
    async fn test_request_timeout_is_reported_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .set_delay(Duration::from_millis(1500)),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::from_config(&ConnectionConfig::Http {
            host: server.address().to_string(),
            timeout_ms: 100,
            pages: None,
        })
        .unwrap();
        let mut connection =
            Connection::new(Box::new(transport)).with_command_timeout(Duration::from_secs(10));

        let result = connection.execute(Command::get(CommandName::Luminance)).await;
        assert!(matches!(result, Err(ProjComError::Timeout)));
        assert_eq!(connection.statistics().timeouts, 1);
        assert_eq!(connection.statistics().transport_errors, 0);
    }

    #[test]
    fn test_custom_page_table() {
        let mut pages = std::collections::BTreeMap::new();
        pages.insert("MUTE".to_string(), "webconf.dll?page=7".to_string());
        let settings = HttpSettings::from_config(&ConnectionConfig::Http {
            host: "10.0.0.5".to_string(),
            timeout_ms: 1000,
            pages: Some(pages),
        })
        .unwrap();
        assert_eq!(settings.pages.page(CommandName::Mute), Some("webconf.dll?page=7"));
        assert_eq!(settings.pages.page(CommandName::Luminance), None);
        assert_eq!(settings.base_url(), "http://10.0.0.5");
    }

    #[test]
    fn test_unknown_command_in_page_table() {
        let mut pages = std::collections::BTreeMap::new();
        pages.insert("ZOOM".to_string(), "webconf.dll?page=9".to_string());
        let result = HttpSettings::from_config(&ConnectionConfig::Http {
            host: "10.0.0.5".to_string(),
            timeout_ms: 1000,
            pages: Some(pages),
        });
        assert!(matches!(result, Err(ProjComError::Config { .. })));
    }
}
