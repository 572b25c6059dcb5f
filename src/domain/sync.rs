//! Snapshot + incremental synchronization for a market-by-price book.
//!
//! Incremental updates only make sense on top of a snapshot with a matching
//! sequence number. Until one arrives, updates are buffered; once it arrives
//! the buffer is replayed, skipping anything the snapshot already covers.

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::error::DomainError;
use super::event::OrderBookData;
use super::id::Symbol;
use super::order_book::OrderBook;

/// Upper bound on updates held while waiting for a snapshot.
pub const MAX_BUFFERED_UPDATES: usize = 1000;

/// Buffered updates after which an unanswered snapshot request is repeated.
pub const REREQUEST_AFTER: usize = 200;

/// What the caller should do after feeding an update.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncAction {
    /// The update was applied to the book.
    Applied(OrderBookData),
    /// Held until a snapshot arrives.
    Buffered,
    /// Held, and a snapshot must be requested.
    RequestSnapshot,
    /// Already covered by the current book state.
    Ignored,
}

/// Result of applying a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotOutcome {
    /// The snapshot followed by every replayed update, in order.
    pub applied: Vec<OrderBookData>,
    /// Replay hit a gap; another snapshot is needed.
    pub resync: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    AwaitingSnapshot { requested: bool, since_request: usize },
    Synced,
}

/// Per-symbol book synchronizer.
#[derive(Debug)]
pub struct BookSync {
    book: OrderBook,
    state: SyncState,
    buffer: VecDeque<OrderBookData>,
}

impl BookSync {
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            book: OrderBook::new(symbol),
            state: SyncState::AwaitingSnapshot {
                requested: false,
                since_request: 0,
            },
            buffer: VecDeque::new(),
        }
    }

    #[must_use]
    pub const fn book(&self) -> &OrderBook {
        &self.book
    }

    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Synced
    }

    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Forget any in-flight snapshot request, e.g. after a reconnect.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = SyncState::AwaitingSnapshot {
            requested: false,
            since_request: 0,
        };
    }

    /// Record that a snapshot was requested outside of [`on_update`](Self::on_update),
    /// so the next buffered update does not ask again.
    pub fn mark_requested(&mut self) {
        if let SyncState::AwaitingSnapshot { .. } = self.state {
            self.state = SyncState::AwaitingSnapshot {
                requested: true,
                since_request: 0,
            };
        }
    }

    /// Feed an incremental update.
    pub fn on_update(&mut self, update: OrderBookData) -> SyncAction {
        match self.state {
            SyncState::Synced => {
                if self.is_stale(update.seq_num) {
                    return SyncAction::Ignored;
                }
                match self.book.apply_update(&update) {
                    Ok(()) => SyncAction::Applied(update),
                    Err(e) => {
                        if let DomainError::SequenceGap { .. } = e {
                            warn!(symbol = %self.book.symbol(), error = %e, "Order book out of sync");
                        }
                        self.buffer.clear();
                        self.push(update);
                        self.state = SyncState::AwaitingSnapshot {
                            requested: true,
                            since_request: 0,
                        };
                        SyncAction::RequestSnapshot
                    }
                }
            }
            SyncState::AwaitingSnapshot {
                requested,
                since_request,
            } => {
                self.push(update);
                if !requested || since_request + 1 >= REREQUEST_AFTER {
                    if requested {
                        debug!(symbol = %self.book.symbol(), "Snapshot still pending, requesting again");
                    }
                    self.state = SyncState::AwaitingSnapshot {
                        requested: true,
                        since_request: 0,
                    };
                    SyncAction::RequestSnapshot
                } else {
                    self.state = SyncState::AwaitingSnapshot {
                        requested,
                        since_request: since_request + 1,
                    };
                    SyncAction::Buffered
                }
            }
        }
    }

    /// Apply a snapshot and replay buffered updates on top of it.
    pub fn on_snapshot(&mut self, snapshot: OrderBookData) -> SnapshotOutcome {
        if self.is_synced() && self.is_stale(snapshot.seq_num) {
            debug!(
                symbol = %self.book.symbol(),
                seq_num = snapshot.seq_num,
                "Ignoring snapshot older than local book"
            );
            return SnapshotOutcome::default();
        }

        self.book.apply_snapshot(&snapshot);
        self.state = SyncState::Synced;

        let mut outcome = SnapshotOutcome {
            applied: vec![snapshot],
            resync: false,
        };

        let mut pending = std::mem::take(&mut self.buffer);
        while let Some(update) = pending.pop_front() {
            if self.is_stale(update.seq_num) {
                continue;
            }
            if let Err(e) = self.book.apply_update(&update) {
                warn!(symbol = %self.book.symbol(), error = %e, "Buffered updates do not chain onto snapshot");
                pending.push_front(update);
                self.buffer = pending;
                self.state = SyncState::AwaitingSnapshot {
                    requested: true,
                    since_request: 0,
                };
                outcome.resync = true;
                return outcome;
            }
            outcome.applied.push(update);
        }

        outcome
    }

    fn is_stale(&self, seq_num: u64) -> bool {
        self.book.seq_num().is_some_and(|current| seq_num <= current)
    }

    fn push(&mut self, update: OrderBookData) {
        if self.buffer.len() >= MAX_BUFFERED_UPDATES {
            self.buffer.pop_front();
        }
        self.buffer.push_back(update);
    }
}
