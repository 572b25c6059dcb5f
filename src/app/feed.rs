//! Feed tasks that pump a [`MarketDataStream`] into the dispatch channel.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::adapter::huobi::{book_topics, market_topics};
use crate::domain::{BookSync, OrderBookData, Symbol, SyncAction};
use crate::error::Result;
use crate::exchange::{MarketDataStream, MarketEvent, Topic};

/// Subscribe to depth and trades for `symbols` and forward them to `tx`.
///
/// Returns when the stream ends or the receiver is dropped.
///
/// # Errors
///
/// Fails if the initial connect or subscribe fails.
pub async fn run_market_feed<S: MarketDataStream>(
    mut stream: S,
    symbols: &[Symbol],
    tx: mpsc::Sender<MarketEvent>,
) -> Result<()> {
    stream.connect().await?;
    stream.subscribe(&market_topics(symbols)).await?;
    info!(exchange = stream.exchange_name(), symbols = symbols.len(), "Market feed started");

    while let Some(event) = stream.next_event().await {
        match event {
            MarketEvent::Depth(_) | MarketEvent::Trade(_) => {
                if tx.send(event).await.is_err() {
                    debug!("Dispatch channel closed, stopping market feed");
                    break;
                }
            }
            MarketEvent::Disconnected { reason } => {
                warn!(reason = %reason, "Market feed disconnected");
            }
            MarketEvent::Reconnected => info!("Market feed reconnected"),
            other => debug!(event = ?other, "Unexpected event on market feed"),
        }
    }

    info!("Market feed stopped");
    Ok(())
}

/// Keep a synchronized MBP book per symbol and forward every applied
/// snapshot and update to `tx`.
///
/// Updates that arrive before a snapshot are buffered; a snapshot is
/// requested whenever a book needs one.
///
/// # Errors
///
/// Fails if the initial connect or subscribe fails.
pub async fn run_book_feed<S: MarketDataStream>(
    mut stream: S,
    symbols: &[Symbol],
    levels: u16,
    tx: mpsc::Sender<MarketEvent>,
) -> Result<()> {
    let mut books: HashMap<Symbol, BookSync> = symbols
        .iter()
        .map(|s| (s.clone(), BookSync::new(s.clone())))
        .collect();

    stream.connect().await?;
    stream.subscribe(&book_topics(symbols, levels)).await?;
    info!(exchange = stream.exchange_name(), symbols = symbols.len(), levels, "Book feed started");

    while let Some(event) = stream.next_event().await {
        let forward = match event {
            MarketEvent::BookUpdate(update) => {
                let Some(sync) = books.get_mut(&update.symbol) else {
                    debug!(symbol = %update.symbol, "Update for untracked symbol");
                    continue;
                };
                let symbol = update.symbol.clone();
                match sync.on_update(update) {
                    SyncAction::Applied(data) => vec![data],
                    SyncAction::RequestSnapshot => {
                        request_snapshot(&mut stream, symbol, levels).await;
                        Vec::new()
                    }
                    SyncAction::Buffered | SyncAction::Ignored => Vec::new(),
                }
            }
            MarketEvent::BookSnapshot(snapshot) => {
                let Some(sync) = books.get_mut(&snapshot.symbol) else {
                    debug!(symbol = %snapshot.symbol, "Snapshot for untracked symbol");
                    continue;
                };
                let symbol = snapshot.symbol.clone();
                let outcome = sync.on_snapshot(snapshot);
                info!(
                    symbol = %symbol,
                    replayed = outcome.applied.len().saturating_sub(1),
                    resync = outcome.resync,
                    "Order book snapshot applied"
                );
                if outcome.resync {
                    request_snapshot(&mut stream, symbol, levels).await;
                }
                outcome.applied
            }
            MarketEvent::Disconnected { reason } => {
                warn!(reason = %reason, "Book feed disconnected, resetting books");
                books.values_mut().for_each(BookSync::reset);
                Vec::new()
            }
            MarketEvent::Reconnected => {
                // Snapshot requests sent on the old connection will never be answered.
                info!("Book feed reconnected, requesting fresh snapshots");
                for sync in books.values_mut() {
                    sync.reset();
                    sync.mark_requested();
                    request_snapshot(&mut stream, sync.book().symbol().clone(), levels).await;
                }
                Vec::new()
            }
            other => {
                debug!(event = ?other, "Unexpected event on book feed");
                Vec::new()
            }
        };

        for data in forward {
            if tx.send(book_event(data)).await.is_err() {
                debug!("Dispatch channel closed, stopping book feed");
                return Ok(());
            }
        }
    }

    info!("Book feed stopped");
    Ok(())
}

fn book_event(data: OrderBookData) -> MarketEvent {
    if data.is_snapshot() {
        MarketEvent::BookSnapshot(data)
    } else {
        MarketEvent::BookUpdate(data)
    }
}

async fn request_snapshot<S: MarketDataStream>(stream: &mut S, symbol: Symbol, levels: u16) {
    let topic = Topic::Mbp { symbol, levels };
    if let Err(e) = stream.request_snapshot(&topic).await {
        warn!(topic = %topic, error = %e, "Snapshot request failed");
    }
}
