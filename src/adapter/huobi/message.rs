//! Huobi WebSocket wire format.
//!
//! Inbound frames are one of: a heartbeat (`{"ping": ts}`), a data push
//! (`{"ch", "ts", "tick"}`), or a response to a `sub`/`req` (`{"status", ...}`).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DepthData, OrderBookData, PriceLevel, TradeData, TradeDirection};
use crate::error::{Error, Result};
use crate::exchange::{MarketEvent, Topic};

/// Any inbound frame after decompression.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum HuobiMessage {
    Ping { ping: u64 },
    Tick { ch: String, ts: u64, tick: Value },
    Response(HuobiResponse),
    Unknown(Value),
}

/// Acknowledgement of a `sub`, or the answer to a `req`.
#[derive(Debug, Deserialize)]
pub struct HuobiResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub subbed: Option<String>,
    #[serde(default)]
    pub rep: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(rename = "err-code", default)]
    pub err_code: Option<String>,
    #[serde(rename = "err-msg", default)]
    pub err_msg: Option<String>,
}

impl HuobiResponse {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// `{"sub": topic, "id": ...}`
#[derive(Debug, Serialize)]
pub struct SubRequest {
    pub sub: String,
    pub id: String,
}

impl SubRequest {
    #[must_use]
    pub fn new(topic: &Topic) -> Self {
        Self {
            sub: topic.to_string(),
            id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// `{"req": topic, "id": ...}`, a one-shot snapshot request.
#[derive(Debug, Serialize)]
pub struct ReqRequest {
    pub req: String,
    pub id: String,
}

impl ReqRequest {
    #[must_use]
    pub fn new(topic: &Topic) -> Self {
        Self {
            req: topic.to_string(),
            id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// Heartbeat reply echoing the server's timestamp.
#[derive(Debug, Serialize)]
pub struct Pong {
    pub pong: u64,
}

#[derive(Debug, Deserialize)]
struct DepthTick {
    #[serde(default)]
    bids: Vec<PriceLevel>,
    #[serde(default)]
    asks: Vec<PriceLevel>,
    #[serde(default)]
    version: u64,
    ts: u64,
}

#[derive(Debug, Deserialize)]
struct TradeTick {
    data: Vec<TradeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TradeEntry {
    trade_id: u64,
    ts: u64,
    price: Decimal,
    amount: Decimal,
    direction: TradeDirection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MbpTick {
    seq_num: u64,
    prev_seq_num: u64,
    #[serde(default)]
    bids: Vec<PriceLevel>,
    #[serde(default)]
    asks: Vec<PriceLevel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MbpSnapshot {
    seq_num: u64,
    #[serde(default)]
    bids: Vec<PriceLevel>,
    #[serde(default)]
    asks: Vec<PriceLevel>,
}

/// Convert a data push into domain events.
///
/// Trade pushes carry several trades and expand to one event each, in the
/// order the exchange sent them.
///
/// # Errors
///
/// Fails if `ch` is not a known topic or `tick` does not match its shape.
pub fn decode_tick(ch: &str, tick: Value) -> Result<Vec<MarketEvent>> {
    let topic: Topic = ch.parse()?;
    match topic {
        Topic::Depth { symbol } => {
            let depth: DepthTick = serde_json::from_value(tick)?;
            Ok(vec![MarketEvent::Depth(DepthData {
                symbol,
                ts: depth.ts,
                version: depth.version,
                bids: depth.bids,
                asks: depth.asks,
            })])
        }
        Topic::Trade { symbol } => {
            let trades: TradeTick = serde_json::from_value(tick)?;
            Ok(trades
                .data
                .into_iter()
                .map(|t| {
                    MarketEvent::Trade(TradeData {
                        symbol: symbol.clone(),
                        trade_id: t.trade_id,
                        ts: t.ts,
                        price: t.price,
                        amount: t.amount,
                        direction: t.direction,
                    })
                })
                .collect())
        }
        Topic::Mbp { symbol, .. } => {
            let update: MbpTick = serde_json::from_value(tick)?;
            Ok(vec![MarketEvent::BookUpdate(OrderBookData::update(
                symbol,
                update.seq_num,
                update.prev_seq_num,
                update.bids,
                update.asks,
            ))])
        }
    }
}

/// Convert the answer to an MBP `req` into a snapshot event.
///
/// # Errors
///
/// Fails if `rep` is not an MBP topic or `data` is not a book snapshot.
pub fn decode_snapshot(rep: &str, data: Value) -> Result<MarketEvent> {
    match rep.parse::<Topic>()? {
        Topic::Mbp { symbol, .. } => {
            let snapshot: MbpSnapshot = serde_json::from_value(data)?;
            Ok(MarketEvent::BookSnapshot(OrderBookData::snapshot(
                symbol,
                snapshot.seq_num,
                snapshot.bids,
                snapshot.asks,
            )))
        }
        other => Err(Error::Parse(format!(
            "unexpected snapshot response for topic '{other}'"
        ))),
    }
}
