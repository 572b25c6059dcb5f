use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::feed::{run_book_feed, run_market_feed};
use super::Mode;
use crate::adapter::huobi::HuobiDataStream;
use crate::config::Config;
use crate::domain::{DepthData, OrderBook, OrderBookData, Symbol, TradeData, TradeTape};
use crate::error::{Error, Result};
use crate::exchange::{MarketDataStream, MarketEvent, ReconnectingDataStream};
use crate::feature::registry::build_graph;
use crate::feature::{FeatureGraph, ReportWriter};
use crate::render::render_ladder;
use crate::storage::{ObjectStore, S3ObjectStore, Storage};

/// Bound on events queued between the feeds and the dispatch loop.
const CHANNEL_CAPACITY: usize = 10_000;

/// Everything the dispatch loop tracks for one symbol.
struct SymbolState {
    graph: FeatureGraph,
    report: Option<ReportWriter>,
    tape: TradeTape,
    book: OrderBook,
}

/// Main application orchestrator.
pub struct App {
    mode: Mode,
    storage: Arc<Storage>,
    symbols: HashMap<Symbol, SymbolState>,
}

impl App {
    /// Run against Huobi until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Fails if storage, reports, or the feature graph cannot be set up,
    /// or if either feed fails to connect or subscribe.
    pub async fn run(config: Config, mode: Mode, shutdown: impl Future<Output = ()>) -> Result<()> {
        let market = ReconnectingDataStream::new(
            HuobiDataStream::new(config.network.ws_url.clone()),
            config.reconnection.clone(),
        );
        let book = ReconnectingDataStream::new(
            HuobiDataStream::new(config.network.feed_url.clone()),
            config.reconnection.clone(),
        );

        let store: Option<Arc<dyn ObjectStore>> = if config.storage.s3.enabled {
            let s3 = S3ObjectStore::from_config(&config.storage.s3).await;
            info!(bucket = s3.bucket(), region = %config.storage.s3.region, "S3 upload enabled");
            Some(Arc::new(s3))
        } else {
            None
        };

        Self::run_with_streams(config, mode, market, book, store, shutdown).await
    }

    /// Run with caller-provided streams and object store.
    ///
    /// # Errors
    ///
    /// Fails if storage, reports, or the feature graph cannot be set up,
    /// or if either feed fails to connect or subscribe.
    pub async fn run_with_streams<M, B>(
        config: Config,
        mode: Mode,
        market: M,
        book: B,
        store: Option<Arc<dyn ObjectStore>>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()>
    where
        M: MarketDataStream + 'static,
        B: MarketDataStream + 'static,
    {
        let symbols = tracked_symbols(&config, &mode);
        info!(symbols = ?symbols.iter().map(Symbol::as_str).collect::<Vec<_>>(), "Starting openbook");

        let mut app = Self::new(&config, mode, &symbols)?;

        let mut tasks: Vec<JoinHandle<()>> = Vec::new();
        if let Some(store) = store {
            let interval = Duration::from_secs(config.storage.upload_interval_secs);
            tasks.push(Arc::clone(&app.storage).spawn_uploader(store, interval));
        }

        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);
        // A feed that fails reports here before its event sender is dropped.
        let (fail_tx, mut fail_rx) = mpsc::channel::<Error>(2);

        let market_symbols = symbols.clone();
        let market_tx = tx.clone();
        let market_fail = fail_tx.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = run_market_feed(market, &market_symbols, market_tx.clone()).await {
                error!(error = %e, "Market feed failed");
                let _ = market_fail.send(e).await;
            }
            drop(market_tx);
        }));

        let levels = config.book.levels;
        tasks.push(tokio::spawn(async move {
            if let Err(e) = run_book_feed(book, &symbols, levels, tx.clone()).await {
                error!(error = %e, "Book feed failed");
                let _ = fail_tx.send(e).await;
            }
            drop(tx);
        }));

        info!("Listening for market events...");
        tokio::pin!(shutdown);
        let outcome = loop {
            tokio::select! {
                biased;
                Some(e) = fail_rx.recv() => break Err(e),
                () = &mut shutdown => {
                    info!("Shutdown requested");
                    break Ok(());
                }
                event = rx.recv() => match event {
                    Some(event) => app.handle(event),
                    None => {
                        info!("All feeds stopped");
                        break fail_rx.try_recv().map_or(Ok(()), Err);
                    }
                },
            }
        };

        for task in &tasks {
            task.abort();
        }
        app.storage.flush();
        info!("Storage flushed");
        outcome
    }

    fn new(config: &Config, mode: Mode, symbols: &[Symbol]) -> Result<Self> {
        let storage = Arc::new(Storage::open(&config.storage)?);

        let mut states = HashMap::new();
        for symbol in symbols {
            let graph = build_graph(&config.features.enabled)?;
            let names = graph.reported_names();
            let report = if names.is_empty() {
                None
            } else {
                let writer = ReportWriter::create(&config.features.report_dir, symbol, &names)?;
                info!(symbol = %symbol, path = %writer.path().display(), "Feature report opened");
                Some(writer)
            };
            states.insert(
                symbol.clone(),
                SymbolState {
                    graph,
                    report,
                    tape: TradeTape::default(),
                    book: OrderBook::new(symbol.clone()),
                },
            );
        }

        Ok(Self {
            mode,
            storage,
            symbols: states,
        })
    }

    fn handle(&mut self, event: MarketEvent) {
        match event {
            MarketEvent::Depth(depth) => self.on_depth(&depth),
            MarketEvent::Trade(trade) => self.on_trade(trade),
            MarketEvent::BookSnapshot(data) | MarketEvent::BookUpdate(data) => {
                self.on_order_book(&data);
            }
            MarketEvent::Disconnected { reason } => {
                debug!(reason = %reason, "Disconnect reached dispatch loop");
            }
            MarketEvent::Reconnected => debug!("Reconnect reached dispatch loop"),
        }
    }

    fn on_depth(&mut self, depth: &DepthData) {
        self.storage.on_depth(depth);

        let Some(state) = self.symbols.get_mut(&depth.symbol) else {
            return;
        };
        if !state.graph.on_depth(depth) {
            return;
        }
        if let Some(report) = state.report.as_mut() {
            if let Err(e) = report.write_row(depth.ts, &state.graph.reported()) {
                warn!(symbol = %depth.symbol, error = %e, "Failed to write feature report");
            }
        }
    }

    fn on_trade(&mut self, trade: TradeData) {
        self.storage.on_trade(&trade);
        if let Some(state) = self.symbols.get_mut(&trade.symbol) {
            state.tape.push(trade);
        }
    }

    fn on_order_book(&mut self, data: &OrderBookData) {
        self.storage.on_order_book(data);

        let Some(state) = self.symbols.get_mut(&data.symbol) else {
            return;
        };
        if data.is_snapshot() {
            state.book.apply_snapshot(data);
        } else if let Err(e) = state.book.apply_update(data) {
            warn!(symbol = %data.symbol, error = %e, "Ladder book rejected update");
            return;
        }

        if let Mode::Watch { symbol, depth } = &self.mode {
            if symbol == &data.symbol {
                draw(&state.book, state.tape.last().map(|t| t.price), *depth);
            }
        }
    }
}

/// Configured symbols, plus the watched one if it is missing.
fn tracked_symbols(config: &Config, mode: &Mode) -> Vec<Symbol> {
    let mut symbols = config.symbols.clone();
    if let Some(watched) = mode.watched() {
        if !symbols.contains(watched) {
            symbols.push(watched.clone());
        }
    }
    symbols
}

fn draw(book: &OrderBook, last_trade: Option<rust_decimal::Decimal>, depth: usize) {
    // Clear screen and home the cursor.
    print!("\x1b[2J\x1b[H");
    println!("{}", render_ladder(book, depth));
    if let Some(price) = last_trade {
        println!("last trade {price}");
    }
}
