//! Errors raised when book or feature-graph invariants are violated.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An incremental update does not chain onto the local book.
    #[error("sequence gap: expected prevSeqNum {expected}, got {got}")]
    SequenceGap {
        /// Sequence number of the last applied book state.
        expected: u64,
        /// `prev_seq_num` carried by the rejected update.
        got: u64,
    },

    /// An incremental update arrived before any snapshot.
    #[error("order book for {symbol} has no snapshot yet")]
    NotInitialized {
        /// Symbol of the uninitialized book.
        symbol: String,
    },

    /// A feature-graph edge would break registration order.
    #[error("invalid edge {parent} -> {child}: parents must be registered before children")]
    InvalidEdge {
        /// Index of the parent feature.
        parent: usize,
        /// Index of the child feature.
        child: usize,
    },

    /// A feature id that the graph never handed out.
    #[error("unknown feature id {0}")]
    UnknownFeature(usize),
}
