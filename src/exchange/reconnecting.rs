//! Reconnecting wrapper for [`MarketDataStream`].
//!
//! Adds exponential backoff, a circuit breaker, and topic resubscription to
//! any stream. Disconnects are absorbed: after a successful reconnect callers
//! see a single [`MarketEvent::Reconnected`] instead.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::{MarketDataStream, MarketEvent, Topic};
use crate::config::ReconnectionConfig;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    /// Connections allowed.
    Closed,
    /// Too many failures; no attempts until `until`.
    Open { until: Instant },
}

/// Wrapper that adds reconnection logic to any [`MarketDataStream`].
pub struct ReconnectingDataStream<S: MarketDataStream> {
    inner: S,
    config: ReconnectionConfig,
    /// Replayed after every reconnect.
    topics: Vec<Topic>,
    consecutive_failures: u32,
    current_delay_ms: u64,
    circuit_state: CircuitState,
    connected: bool,
    reconnects: u64,
}

impl<S: MarketDataStream> ReconnectingDataStream<S> {
    pub fn new(inner: S, config: ReconnectionConfig) -> Self {
        let initial_delay = config.initial_delay_ms;
        Self {
            inner,
            config,
            topics: Vec::new(),
            consecutive_failures: 0,
            current_delay_ms: initial_delay,
            circuit_state: CircuitState::Closed,
            connected: false,
            reconnects: 0,
        }
    }

    /// Number of successful reconnects since construction.
    #[must_use]
    pub const fn reconnects(&self) -> u64 {
        self.reconnects
    }

    #[must_use]
    pub const fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }

    fn reset_backoff(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
        self.circuit_state = CircuitState::Closed;
    }

    /// Current delay, then grow it for the next attempt.
    fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_millis(self.current_delay_ms);

        let next_delay = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next_delay.min(self.config.max_delay_ms);

        delay
    }

    fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        self.connected = false;

        if self.consecutive_failures >= self.config.max_consecutive_failures {
            let cooldown = Duration::from_millis(self.config.circuit_breaker_cooldown_ms);
            self.circuit_state = CircuitState::Open {
                until: Instant::now() + cooldown,
            };
            error!(
                exchange = self.inner.exchange_name(),
                failures = self.consecutive_failures,
                cooldown_secs = cooldown.as_secs(),
                "Circuit breaker tripped, pausing reconnection attempts"
            );
        }
    }

    async fn wait_for_circuit(&mut self) {
        if let CircuitState::Open { until } = self.circuit_state {
            let remaining = until.saturating_duration_since(Instant::now());
            if !remaining.is_zero() {
                warn!(
                    remaining_secs = remaining.as_secs(),
                    "Circuit breaker open, waiting for cooldown"
                );
                sleep(remaining).await;
            }
            info!("Circuit breaker cooldown expired, allowing reconnection");
            self.reset_backoff();
        }
    }

    async fn connect_and_resubscribe(&mut self) -> Result<()> {
        self.inner.connect().await?;
        if !self.topics.is_empty() {
            debug!(topics = self.topics.len(), "Resubscribing to topics");
            self.inner.subscribe(&self.topics).await?;
        }
        Ok(())
    }

    async fn reconnect(&mut self) -> Result<()> {
        self.wait_for_circuit().await;

        let delay = self.next_delay();
        info!(
            exchange = self.inner.exchange_name(),
            delay_ms = delay.as_millis() as u64,
            attempt = self.consecutive_failures + 1,
            "Reconnecting after delay"
        );
        sleep(delay).await;

        match self.connect_and_resubscribe().await {
            Ok(()) => {
                info!(exchange = self.inner.exchange_name(), "Reconnected successfully");
                self.connected = true;
                self.reconnects += 1;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Reconnection failed");
                self.record_failure();
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: MarketDataStream> MarketDataStream for ReconnectingDataStream<S> {
    async fn connect(&mut self) -> Result<()> {
        let result = self.inner.connect().await;
        if result.is_ok() {
            self.connected = true;
            self.reset_backoff();
        }
        result
    }

    async fn subscribe(&mut self, topics: &[Topic]) -> Result<()> {
        self.topics = topics.to_vec();
        self.inner.subscribe(topics).await
    }

    async fn request_snapshot(&mut self, topic: &Topic) -> Result<()> {
        self.inner.request_snapshot(topic).await
    }

    async fn next_event(&mut self) -> Option<MarketEvent> {
        loop {
            if !self.connected {
                match self.reconnect().await {
                    Ok(()) => return Some(MarketEvent::Reconnected),
                    Err(e) => {
                        warn!(error = %e, "Reconnection attempt failed, will retry");
                        continue;
                    }
                }
            }

            match self.inner.next_event().await {
                Some(MarketEvent::Disconnected { reason }) => {
                    warn!(reason = %reason, "Connection lost, will reconnect");
                    self.record_failure();
                }
                Some(event) => {
                    if self.consecutive_failures > 0 {
                        debug!("Received event after reconnection, resetting failure count");
                        self.reset_backoff();
                    }
                    return Some(event);
                }
                None => {
                    warn!("Data stream ended unexpectedly, will reconnect");
                    self.record_failure();
                }
            }
        }
    }

    fn exchange_name(&self) -> &'static str {
        self.inner.exchange_name()
    }
}
