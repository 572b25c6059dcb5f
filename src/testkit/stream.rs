//! Mock [`MarketDataStream`] for testing.
//!
//! [`ScriptedStream`] replays pre-loaded connect/subscribe results and a
//! fixed event queue, and records every snapshot request it receives.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::Result;
use crate::exchange::{MarketDataStream, MarketEvent, Topic};

/// A mock stream with scripted connect/subscribe results and a fixed event queue.
///
/// Each call to `connect()` or `subscribe()` pops the next result from the
/// corresponding queue (defaults to `Ok(())` when exhausted). `next_event()`
/// pops the next scripted event; a scripted `None`, or an empty queue, ends
/// the stream.
pub struct ScriptedStream {
    connect_results: VecDeque<Result<()>>,
    subscribe_results: VecDeque<Result<()>>,
    events: VecDeque<Option<MarketEvent>>,
    connect_count: Arc<AtomicU32>,
    subscribe_count: Arc<AtomicU32>,
    subscribed: Arc<Mutex<Vec<Topic>>>,
    snapshot_requests: Arc<Mutex<Vec<Topic>>>,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            subscribe_results: VecDeque::new(),
            events: VecDeque::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
            subscribe_count: Arc::new(AtomicU32::new(0)),
            subscribed: Arc::new(Mutex::new(Vec::new())),
            snapshot_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_subscribe_results(mut self, results: Vec<Result<()>>) -> Self {
        self.subscribe_results = results.into();
        self
    }

    pub fn with_events(mut self, events: Vec<Option<MarketEvent>>) -> Self {
        self.events = events.into();
        self
    }

    /// Get shared counters for asserting connect/subscribe call counts.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.subscribe_count.clone())
    }

    /// Shared log of the topics passed to the latest `subscribe()`.
    pub fn subscribed(&self) -> Arc<Mutex<Vec<Topic>>> {
        self.subscribed.clone()
    }

    /// Shared log of every `request_snapshot()` topic, in call order.
    pub fn snapshot_requests(&self) -> Arc<Mutex<Vec<Topic>>> {
        self.snapshot_requests.clone()
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataStream for ScriptedStream {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, topics: &[Topic]) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        *self.subscribed.lock() = topics.to_vec();
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn request_snapshot(&mut self, topic: &Topic) -> Result<()> {
        self.snapshot_requests.lock().push(topic.clone());
        Ok(())
    }

    async fn next_event(&mut self) -> Option<MarketEvent> {
        // Yield so feeds interleave with the consumer like a real socket.
        tokio::task::yield_now().await;
        self.events.pop_front().flatten()
    }

    fn exchange_name(&self) -> &'static str {
        "mock"
    }
}
