//! Huobi WebSocket market data stream.
//!
//! # Connection Lifecycle
//!
//! 1. **Connect**: open the socket with `connect()`
//! 2. **Subscribe**: send one `sub` per topic with `subscribe()`
//! 3. **Read**: pull events with `next_event()`, which answers heartbeats
//!    inline and expands multi-trade pushes into single events
//! 4. **Snapshot**: `request_snapshot()` sends a `req`; the answer comes
//!    back through `next_event()` as a book snapshot
//!
//! Data frames are gzip-compressed binary. Text frames are accepted too so
//! the stream works against uncompressed test servers.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use super::codec::inflate;
use super::message::{decode_snapshot, decode_tick, HuobiMessage, Pong, ReqRequest, SubRequest};
use crate::error::{Error, Result};
use crate::exchange::{MarketDataStream, MarketEvent, Topic};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a decoded frame asks the stream to do.
#[derive(Debug, PartialEq)]
pub(crate) enum Inbound {
    /// Server heartbeat; reply with the same timestamp.
    Ping(u64),
    /// Events to hand to the caller.
    Events(Vec<MarketEvent>),
    /// Acks, errors and unknown frames; already logged.
    Nothing,
}

/// Decode one frame's JSON text.
pub(crate) fn classify(text: &str) -> Result<Inbound> {
    match serde_json::from_str::<HuobiMessage>(text)? {
        HuobiMessage::Ping { ping } => Ok(Inbound::Ping(ping)),
        HuobiMessage::Tick { ch, tick, .. } => Ok(Inbound::Events(decode_tick(&ch, tick)?)),
        HuobiMessage::Response(resp) => {
            if !resp.is_ok() {
                warn!(
                    id = ?resp.id,
                    code = ?resp.err_code,
                    message = ?resp.err_msg,
                    "Exchange rejected request"
                );
                return Ok(Inbound::Nothing);
            }
            if let Some(subbed) = &resp.subbed {
                debug!(topic = %subbed, "Subscription confirmed");
                return Ok(Inbound::Nothing);
            }
            match (resp.rep, resp.data) {
                (Some(rep), Some(data)) => Ok(Inbound::Events(vec![decode_snapshot(&rep, data)?])),
                _ => Ok(Inbound::Nothing),
            }
        }
        HuobiMessage::Unknown(value) => {
            trace!(frame = %value, "Ignoring unrecognized frame");
            Ok(Inbound::Nothing)
        }
    }
}

/// Huobi market data stream implementing [`MarketDataStream`].
pub struct HuobiDataStream {
    url: String,
    ws: Option<Socket>,
    /// Events decoded from a frame but not yet returned.
    pending: VecDeque<MarketEvent>,
}

impl HuobiDataStream {
    /// Create a new data stream for the given WebSocket URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ws: None,
            pending: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    fn socket(&mut self) -> Result<&mut Socket> {
        self.ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))
    }

    async fn send_json<T: serde::Serialize + Sync>(&mut self, payload: &T) -> Result<()> {
        let json = serde_json::to_string(payload)?;
        self.socket()?.send(Message::Text(json)).await?;
        Ok(())
    }
}

#[async_trait]
impl MarketDataStream for HuobiDataStream {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(&self.url).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        self.pending.clear();
        Ok(())
    }

    async fn subscribe(&mut self, topics: &[Topic]) -> Result<()> {
        for topic in topics {
            debug!(topic = %topic, "Subscribing");
            self.send_json(&SubRequest::new(topic)).await?;
        }
        info!(topics = topics.len(), url = %self.url, "Subscribed to topics");
        Ok(())
    }

    async fn request_snapshot(&mut self, topic: &Topic) -> Result<()> {
        debug!(topic = %topic, "Requesting snapshot");
        self.send_json(&ReqRequest::new(topic)).await
    }

    async fn next_event(&mut self) -> Option<MarketEvent> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let ws = self.ws.as_mut()?;

        loop {
            let text = match ws.next().await? {
                Ok(Message::Binary(bytes)) => match inflate(&bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, bytes = bytes.len(), "Failed to decode frame");
                        continue;
                    }
                },
                Ok(Message::Text(text)) => text,
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if ws.send(Message::Pong(data)).await.is_err() {
                        self.ws = None;
                        return Some(MarketEvent::Disconnected {
                            reason: "Failed to send pong".into(),
                        });
                    }
                    continue;
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    self.ws = None;
                    return Some(MarketEvent::Disconnected {
                        reason: frame.map(|f| f.reason.to_string()).unwrap_or_default(),
                    });
                }
                Ok(_) => continue,
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    self.ws = None;
                    return Some(MarketEvent::Disconnected {
                        reason: e.to_string(),
                    });
                }
            };

            trace!(bytes = text.len(), "Received frame");
            match classify(&text) {
                Ok(Inbound::Ping(ts)) => {
                    let pong = serde_json::to_string(&Pong { pong: ts }).unwrap_or_default();
                    if ws.send(Message::Text(pong)).await.is_err() {
                        self.ws = None;
                        return Some(MarketEvent::Disconnected {
                            reason: "Failed to send pong".into(),
                        });
                    }
                }
                Ok(Inbound::Events(events)) => {
                    self.pending.extend(events);
                    if let Some(event) = self.pending.pop_front() {
                        return Some(event);
                    }
                }
                Ok(Inbound::Nothing) => {}
                Err(e) => {
                    warn!(error = %e, bytes = text.len(), "Failed to parse message");
                }
            }
        }
    }

    fn exchange_name(&self) -> &'static str {
        "Huobi"
    }
}
