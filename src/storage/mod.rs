//! Local JSON-lines persistence with periodic upload to an object store.
//!
//! Each data stream gets its own folder under the storage root:
//!
//! ```text
//! {dir}/depthData/2024-01-01_12-00-00.json
//! {dir}/tradeData/2024-01-01_12-00-00.json
//! {dir}/orderBookData/2024-01-01_12-00-00.json
//! ```
//!
//! Uploads use the local path as the object key, so every upload of the same
//! file overwrites the previous object with a longer version.

mod local;
mod s3;

pub use local::{file_stamp, LocalStorage, LocalStorageBuilder, FILE_STAMP_FORMAT};
pub use s3::{ObjectStore, S3ObjectStore};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::domain::{DepthData, OrderBookData, TradeData};
use crate::error::Result;

pub const DEPTH_FOLDER: &str = "depthData";
pub const TRADE_FOLDER: &str = "tradeData";
pub const ORDER_BOOK_FOLDER: &str = "orderBookData";

/// The three per-stream files of a collector run.
pub struct Storage {
    depth: Mutex<LocalStorage<DepthData>>,
    trade: Mutex<LocalStorage<TradeData>>,
    order_book: Mutex<LocalStorage<OrderBookData>>,
}

impl Storage {
    /// Open the per-stream files under `config.dir`.
    ///
    /// # Errors
    ///
    /// Fails if any folder or file cannot be created.
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let depth = LocalStorage::builder(config.dir.join(DEPTH_FOLDER))
            .max_rows(config.max_rows)
            .build()?;
        let trade = LocalStorage::builder(config.dir.join(TRADE_FOLDER))
            .max_rows(config.max_rows)
            .build()?;
        let order_book = LocalStorage::builder(config.dir.join(ORDER_BOOK_FOLDER))
            .max_rows(config.max_rows)
            .build()?;

        info!(dir = %config.dir.display(), "Storage opened");
        Ok(Self {
            depth: Mutex::new(depth),
            trade: Mutex::new(trade),
            order_book: Mutex::new(order_book),
        })
    }

    pub fn on_depth(&self, depth: &DepthData) {
        self.depth.lock().on_event(depth);
    }

    pub fn on_trade(&self, trade: &TradeData) {
        self.trade.lock().on_event(trade);
    }

    pub fn on_order_book(&self, book: &OrderBookData) {
        self.order_book.lock().on_event(book);
    }

    pub fn flush(&self) {
        self.depth.lock().flush();
        self.trade.lock().flush();
        self.order_book.lock().flush();
    }

    /// Current file of each stream.
    #[must_use]
    pub fn file_paths(&self) -> Vec<PathBuf> {
        vec![
            self.depth.lock().file_path().to_path_buf(),
            self.trade.lock().file_path().to_path_buf(),
            self.order_book.lock().file_path().to_path_buf(),
        ]
    }

    /// Flush, then upload every file. Failed uploads are logged and skipped.
    ///
    /// Returns the number of files uploaded.
    pub async fn upload_all(&self, store: &dyn ObjectStore) -> usize {
        self.flush();

        let mut uploaded = 0;
        for path in self.file_paths() {
            let key = path.to_string_lossy().into_owned();
            match store.put_file(&key, &path).await {
                Ok(()) => uploaded += 1,
                Err(e) => warn!(key = %key, error = %e, "Upload failed"),
            }
        }
        uploaded
    }

    /// Upload immediately, then once per `interval`, until the task is aborted.
    pub fn spawn_uploader(
        self: Arc<Self>,
        store: Arc<dyn ObjectStore>,
        interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let uploaded = self.upload_all(store.as_ref()).await;
                info!(uploaded, "Storage upload cycle complete");
            }
        })
    }
}
