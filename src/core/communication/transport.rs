use crate::core::communication::codec::Codec;
use crate::core::communication::message::{RawReply, WireRequest};
use crate::domain::error::ProjComResult;
use async_trait::async_trait;

/// Transport type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportType {
    Serial,
    Tcp,
    Http,
}

impl std::fmt::Display for TransportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportType::Serial => write!(f, "serial"),
            TransportType::Tcp => write!(f, "tcp"),
            TransportType::Http => write!(f, "http"),
        }
    }
}

/// Unified transport trait every link to a projector implements
#[async_trait]
pub trait Transport: Send {
    /// Get the transport type
    fn transport_type(&self) -> TransportType;

    /// Wire rules this transport speaks
    fn codec(&self) -> Codec;

    /// Whether the transport keeps a link open between requests.
    ///
    /// Stateless transports are usable as soon as they are constructed.
    fn is_persistent(&self) -> bool {
        true
    }

    /// Establish the link, including any device handshake
    async fn open(&mut self) -> ProjComResult<()>;

    /// Tear the link down
    async fn close(&mut self) -> ProjComResult<()>;

    /// Send one request
    async fn send(&mut self, request: &WireRequest) -> ProjComResult<()>;

    /// Wait for the next inbound payload
    async fn next_reply(&mut self) -> ProjComResult<RawReply>;

    /// Drop inbound payloads that were already received but never consumed.
    ///
    /// Returns how many were discarded.
    fn discard_buffered(&mut self) -> usize {
        0
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory projector for exercising the protocol layer.
    use super::*;
    use crate::domain::error::ProjComError;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::mpsc;

    type Inbound = ProjComResult<RawReply>;
    type Responder = Arc<dyn Fn(&WireRequest) -> Option<Inbound> + Send + Sync>;

    /// Replies to each request with the next scripted answer.
    pub struct ScriptedTransport {
        pub kind: TransportType,
        pub codec: Codec,
        pub persistent: bool,
        pub fail_open: bool,
        pub sent: Arc<Mutex<Vec<WireRequest>>>,
        script: Arc<Mutex<VecDeque<Option<Inbound>>>>,
        responder: Option<Responder>,
        reply_delay: Duration,
        inbound_tx: mpsc::UnboundedSender<Inbound>,
        inbound_rx: mpsc::UnboundedReceiver<Inbound>,
    }

    /// Handle used by tests to decide how the fake device answers.
    #[derive(Clone)]
    pub struct Script {
        queue: Arc<Mutex<VecDeque<Option<Inbound>>>>,
        inbound: mpsc::UnboundedSender<Inbound>,
    }

    impl Script {
        pub fn reply(&self, text: &str) {
            self.push(Some(Ok(RawReply::Line(text.as_bytes().to_vec()))));
        }

        pub fn reply_http(&self, status: u16, body: &str) {
            self.push(Some(Ok(RawReply::Http {
                status,
                body: body.to_string(),
            })));
        }

        /// The device ignores the next request.
        pub fn silence(&self) {
            self.push(None);
        }

        pub fn fail(&self, error: ProjComError) {
            self.push(Some(Err(error)));
        }

        /// Payload that arrives without being asked for.
        pub fn unsolicited(&self, text: &str) {
            let _ = self
                .inbound
                .send(Ok(RawReply::Line(text.as_bytes().to_vec())));
        }

        fn push(&self, answer: Option<Inbound>) {
            self.queue.lock().unwrap().push_back(answer);
        }
    }

    impl ScriptedTransport {
        pub fn line() -> (Self, Script) {
            let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
            let queue = Arc::new(Mutex::new(VecDeque::new()));
            let script = Script {
                queue: queue.clone(),
                inbound: inbound_tx.clone(),
            };
            let transport = Self {
                kind: TransportType::Tcp,
                codec: Codec::Line,
                persistent: true,
                fail_open: false,
                sent: Arc::new(Mutex::new(Vec::new())),
                script: queue,
                responder: None,
                reply_delay: Duration::ZERO,
                inbound_tx,
                inbound_rx,
            };
            (transport, script)
        }

        /// Answer requests the script does not cover by looking at them.
        pub fn with_responder<F>(mut self, responder: F) -> Self
        where
            F: Fn(&WireRequest) -> Option<Inbound> + Send + Sync + 'static,
        {
            self.responder = Some(Arc::new(responder));
            self
        }

        /// Deliver every answer this long after the request.
        pub fn with_reply_delay(mut self, delay: Duration) -> Self {
            self.reply_delay = delay;
            self
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        fn transport_type(&self) -> TransportType {
            self.kind
        }

        fn codec(&self) -> Codec {
            self.codec.clone()
        }

        fn is_persistent(&self) -> bool {
            self.persistent
        }

        async fn open(&mut self) -> ProjComResult<()> {
            if self.fail_open {
                return Err(ProjComError::transport("connection refused"));
            }
            Ok(())
        }

        async fn close(&mut self) -> ProjComResult<()> {
            Ok(())
        }

        async fn send(&mut self, request: &WireRequest) -> ProjComResult<()> {
            self.sent.lock().unwrap().push(request.clone());
            let scripted = self.script.lock().unwrap().pop_front();
            let answer = match scripted {
                Some(answer) => answer,
                None => self.responder.as_ref().and_then(|respond| respond(request)),
            };

            if let Some(answer) = answer {
                if self.reply_delay.is_zero() {
                    let _ = self.inbound_tx.send(answer);
                } else {
                    let inbound = self.inbound_tx.clone();
                    let delay = self.reply_delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = inbound.send(answer);
                    });
                }
            }
            Ok(())
        }

        async fn next_reply(&mut self) -> ProjComResult<RawReply> {
            match self.inbound_rx.recv().await {
                Some(reply) => reply,
                None => Err(ProjComError::transport("connection closed")),
            }
        }

        fn discard_buffered(&mut self) -> usize {
            let mut discarded = 0;
            while self.inbound_rx.try_recv().is_ok() {
                discarded += 1;
            }
            discarded
        }
    }
}
