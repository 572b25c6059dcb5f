use openbook::app::feed::run_book_feed;
use std::time::Duration;

use openbook::domain::{BookSync, Symbol, SyncAction};
use openbook::exchange::{MarketEvent, ReconnectingDataStream, Topic};
use openbook::testkit::config::reconnection;
use openbook::testkit::domain::{disconnect_event, snapshot_event, update_event};
use openbook::testkit::stream::ScriptedStream;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;

fn btc() -> Symbol {
    Symbol::new("btcusdt")
}

fn mbp(levels: u16) -> Topic {
    Topic::Mbp {
        symbol: btc(),
        levels,
    }
}

/// Replays forwarded events into a fresh book, the way the dispatch loop does.
async fn drain_into_book(rx: &mut mpsc::Receiver<MarketEvent>) -> (Vec<u64>, openbook::domain::OrderBook) {
    let mut book = openbook::domain::OrderBook::new(btc());
    let mut seqs = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            MarketEvent::BookSnapshot(s) => {
                book.apply_snapshot(&s);
                seqs.push(s.seq_num);
            }
            MarketEvent::BookUpdate(u) => {
                book.apply_update(&u).expect("forwarded updates chain");
                seqs.push(u.seq_num);
            }
            other => panic!("Unexpected event {other:?}"),
        }
    }
    (seqs, book)
}

#[tokio::test]
async fn subscribes_to_configured_depth() {
    let stream = ScriptedStream::new();
    let subscribed = stream.subscribed();
    let (tx, _rx) = mpsc::channel(8);

    run_book_feed(stream, &[btc()], 20, tx).await.unwrap();

    assert_eq!(*subscribed.lock(), vec![mbp(20)]);
}

#[tokio::test]
async fn gap_after_sync_triggers_resnapshot() {
    let stream = ScriptedStream::new().with_events(vec![
        Some(update_event("btcusdt", 5, &[(dec!(100), dec!(1))], &[])),
        Some(snapshot_event(
            "btcusdt",
            5,
            &[(dec!(100), dec!(1))],
            &[(dec!(101), dec!(1))],
        )),
        Some(update_event("btcusdt", 6, &[], &[(dec!(101), dec!(0))])),
        // 7 is missing.
        Some(update_event("btcusdt", 8, &[(dec!(99), dec!(3))], &[])),
        Some(snapshot_event(
            "btcusdt",
            8,
            &[(dec!(100), dec!(1)), (dec!(99), dec!(3))],
            &[(dec!(102), dec!(2))],
        )),
        Some(update_event("btcusdt", 9, &[(dec!(100), dec!(0))], &[])),
    ]);
    let requests = stream.snapshot_requests();
    let (tx, mut rx) = mpsc::channel(64);

    run_book_feed(stream, &[btc()], 150, tx).await.unwrap();
    let (seqs, book) = drain_into_book(&mut rx).await;

    assert_eq!(requests.lock().len(), 2);
    assert_eq!(seqs, vec![5, 6, 8, 9]);
    assert_eq!(book.seq_num(), Some(9));
    assert_eq!(book.best_bid().map(|l| l.price), Some(dec!(99)));
    assert_eq!(book.best_ask().map(|l| l.price), Some(dec!(102)));
}

#[tokio::test]
async fn untracked_symbols_are_dropped() {
    let stream = ScriptedStream::new().with_events(vec![
        Some(snapshot_event("ethusdt", 1, &[], &[])),
        Some(snapshot_event("btcusdt", 1, &[(dec!(1), dec!(1))], &[])),
    ]);
    let (tx, mut rx) = mpsc::channel(8);

    run_book_feed(stream, &[btc()], 150, tx).await.unwrap();
    let (seqs, _) = drain_into_book(&mut rx).await;

    assert_eq!(seqs, vec![1]);
}

#[tokio::test]
async fn reconnect_requests_fresh_snapshot() {
    let inner = ScriptedStream::new().with_events(vec![
        Some(update_event("btcusdt", 5, &[(dec!(100), dec!(1))], &[])),
        Some(disconnect_event("reset by peer")),
        Some(update_event("btcusdt", 50, &[(dec!(100), dec!(2))], &[])),
        Some(update_event("btcusdt", 51, &[(dec!(100), dec!(3))], &[])),
    ]);
    let requests = inner.snapshot_requests();
    let stream = ReconnectingDataStream::new(inner, reconnection());
    let (tx, _rx) = mpsc::channel(64);

    let feed = tokio::spawn(async move { run_book_feed(stream, &[btc()], 150, tx).await });

    // One request for the first update, one after the reconnect.
    let mut seen = 0;
    for _ in 0..200 {
        seen = requests.lock().len();
        if seen >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    feed.abort();

    assert!(seen >= 2, "expected a snapshot request after reconnecting, got {seen}");
    assert!(requests.lock().iter().all(|t| *t == mbp(150)));
}

#[test]
fn sync_asks_again_after_long_wait() {
    let mut sync = BookSync::new(btc());
    let mut requests = 0;
    for seq in 1..=400 {
        let update = match update_event("btcusdt", seq, &[], &[]) {
            MarketEvent::BookUpdate(u) => u,
            _ => unreachable!(),
        };
        if sync.on_update(update) == SyncAction::RequestSnapshot {
            requests += 1;
        }
    }
    assert!(requests >= 2, "expected repeated snapshot requests, got {requests}");
    assert!(!sync.is_synced());
}
