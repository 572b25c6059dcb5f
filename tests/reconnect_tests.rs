use std::time::Duration;

use openbook::domain::Symbol;
use openbook::error::Error;
use openbook::exchange::{MarketDataStream, MarketEvent, ReconnectingDataStream, Topic};
use openbook::testkit::config::reconnection;
use openbook::testkit::domain::{depth_event, disconnect_event};
use openbook::testkit::stream::ScriptedStream;
use rust_decimal_macros::dec;
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn topics() -> Vec<Topic> {
    vec![Topic::Depth {
        symbol: Symbol::new("btcusdt"),
    }]
}

async fn next(stream: &mut impl MarketDataStream) -> MarketEvent {
    timeout(TEST_TIMEOUT, stream.next_event())
        .await
        .expect("event before timeout")
        .expect("stream still open")
}

#[tokio::test]
async fn disconnect_is_absorbed_and_topics_replayed() {
    let inner = ScriptedStream::new().with_events(vec![
        Some(depth_event("btcusdt", 1, dec!(100), dec!(101))),
        Some(disconnect_event("server closed")),
        Some(depth_event("btcusdt", 2, dec!(100), dec!(102))),
    ]);
    let (connects, subscribes) = inner.counts();
    let subscribed = inner.subscribed();

    let mut stream = ReconnectingDataStream::new(inner, reconnection());
    stream.connect().await.unwrap();
    stream.subscribe(&topics()).await.unwrap();

    assert!(matches!(next(&mut stream).await, MarketEvent::Depth(d) if d.ts == 1));
    assert_eq!(next(&mut stream).await, MarketEvent::Reconnected);
    assert!(matches!(next(&mut stream).await, MarketEvent::Depth(d) if d.ts == 2));

    assert_eq!(stream.reconnects(), 1);
    assert_eq!(connects.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(subscribes.load(std::sync::atomic::Ordering::SeqCst), 2);
    assert_eq!(*subscribed.lock(), topics());
}

#[tokio::test]
async fn failed_reconnect_is_retried() {
    let inner = ScriptedStream::new()
        .with_connect_results(vec![
            Ok(()),
            Err(Error::Connection("refused".into())),
            Ok(()),
        ])
        .with_events(vec![
            Some(disconnect_event("reset")),
            Some(depth_event("btcusdt", 3, dec!(100), dec!(101))),
        ]);
    let (connects, _) = inner.counts();

    let mut stream = ReconnectingDataStream::new(inner, reconnection());
    stream.connect().await.unwrap();

    assert_eq!(next(&mut stream).await, MarketEvent::Reconnected);
    assert!(matches!(next(&mut stream).await, MarketEvent::Depth(_)));
    assert_eq!(connects.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(stream.reconnects(), 1);
    assert_eq!(stream.consecutive_failures(), 0);
}

#[tokio::test]
async fn circuit_breaker_recovers_after_cooldown() {
    let refused = || Err(Error::Connection("refused".into()));
    let inner = ScriptedStream::new()
        .with_connect_results(vec![Ok(()), refused(), refused(), refused(), Ok(())])
        .with_events(vec![
            Some(disconnect_event("reset")),
            Some(depth_event("btcusdt", 4, dec!(100), dec!(101))),
        ]);
    let (connects, _) = inner.counts();

    let mut stream = ReconnectingDataStream::new(inner, reconnection());
    stream.connect().await.unwrap();

    assert_eq!(next(&mut stream).await, MarketEvent::Reconnected);
    assert!(matches!(next(&mut stream).await, MarketEvent::Depth(_)));
    assert_eq!(connects.load(std::sync::atomic::Ordering::SeqCst), 5);
    assert_eq!(stream.consecutive_failures(), 0);
}

#[tokio::test]
async fn snapshot_requests_reach_inner_stream() {
    let inner = ScriptedStream::new();
    let requests = inner.snapshot_requests();

    let mut stream = ReconnectingDataStream::new(inner, reconnection());
    let topic = Topic::Mbp {
        symbol: Symbol::new("btcusdt"),
        levels: 150,
    };
    stream.request_snapshot(&topic).await.unwrap();

    assert_eq!(*requests.lock(), vec![topic]);
    assert_eq!(stream.exchange_name(), "mock");
}
