//! End-to-end relay tests with real websocket clients.
//!
//! Each test binds its own relay on an ephemeral port.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use preview_relay::adapters::websocket::{ProducerClient, RelayServer};
use preview_relay::config::RelayConfig;
use preview_relay::domain::foundation::Percentage;
use preview_relay::domain::preview::{ScrollPosition, SnapshotEnvelope};

type Viewer = WebSocketStream<MaybeTlsStream<TcpStream>>;

const STYLE: &str = "https://cdn.example/markdown.css";
const QUIET: Duration = Duration::from_millis(200);

// =============================================================================
// Helpers
// =============================================================================

async fn start_relay() -> (RelayServer, SocketAddr) {
    let relay = RelayServer::new(RelayConfig::ephemeral());
    let addr = relay.start().await.expect("relay should bind");
    (relay, addr)
}

async fn connect_viewer(addr: SocketAddr) -> Viewer {
    let (viewer, _) = connect_async(format!("ws://{addr}/"))
        .await
        .expect("viewer should connect");
    viewer
}

async fn connect_producer(addr: SocketAddr) -> ProducerClient {
    let producer = ProducerClient::for_relay(addr);
    producer.connect().await.expect("producer should connect");
    producer
}

/// Waits until the relay reports `expected` open connections.
async fn wait_for_members(relay: &RelayServer, expected: usize) {
    for _ in 0..200 {
        if relay.connection_count().await == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {} connections, relay has {}",
        expected,
        relay.connection_count().await
    );
}

/// Next text frame, skipping control frames.
async fn next_text(viewer: &mut Viewer) -> String {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match viewer.next().await {
                Some(Ok(Message::Text(text))) => return text,
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("unexpected frame: {:?}", other),
            }
        }
    })
    .await
    .expect("timed out waiting for a text frame")
}

/// Asserts no text frame arrives within a short window.
async fn assert_quiet(viewer: &mut Viewer) {
    if let Ok(frame) = tokio::time::timeout(QUIET, viewer.next()).await {
        if let Some(Ok(Message::Text(text))) = frame {
            panic!("unexpected payload: {text}");
        }
    }
}

fn envelope(content: &str, position: i64) -> SnapshotEnvelope {
    SnapshotEnvelope::new(STYLE, ScrollPosition::from_raw(position), content)
}

// =============================================================================
// Scenario
// =============================================================================

#[tokio::test]
async fn producer_updates_fan_out_and_late_joiners_catch_up() {
    let (relay, addr) = start_relay().await;
    let producer = connect_producer(addr).await;

    let mut viewer_a = connect_viewer(addr).await;
    wait_for_members(&relay, 2).await;

    let x = envelope("<p>X</p>", 10);
    assert!(producer.send(&x).await);
    assert_eq!(next_text(&mut viewer_a).await, x.to_wire());

    // Late joiner receives the last update as its join snapshot.
    let mut viewer_b = connect_viewer(addr).await;
    assert_eq!(next_text(&mut viewer_b).await, x.to_wire());
    wait_for_members(&relay, 3).await;

    let y = envelope("<p>Y</p>", 20);
    assert!(producer.send(&y).await);
    assert_eq!(next_text(&mut viewer_a).await, y.to_wire());
    assert_eq!(next_text(&mut viewer_b).await, y.to_wire());

    viewer_a.close(None).await.unwrap();
    wait_for_members(&relay, 2).await;

    let z = envelope("<p>Z</p>", 30);
    assert!(producer.send(&z).await);
    assert_eq!(next_text(&mut viewer_b).await, z.to_wire());
    assert_quiet(&mut viewer_b).await;

    producer.close().await;
    relay.shutdown().await;
}

#[tokio::test]
async fn viewer_joining_before_any_update_receives_nothing() {
    let (relay, addr) = start_relay().await;

    let mut viewer = connect_viewer(addr).await;
    wait_for_members(&relay, 1).await;
    assert_quiet(&mut viewer).await;

    let producer = connect_producer(addr).await;
    wait_for_members(&relay, 2).await;
    let first = envelope("<h1>first</h1>", 0);
    producer.send(&first).await;
    assert_eq!(next_text(&mut viewer).await, first.to_wire());

    producer.close().await;
    relay.shutdown().await;
}

#[tokio::test]
async fn each_open_viewer_receives_exactly_one_copy() {
    let (relay, addr) = start_relay().await;
    let mut viewers = Vec::new();
    for _ in 0..5 {
        viewers.push(connect_viewer(addr).await);
    }

    // Any connection may publish; a raw client stands in for the producer.
    let mut sender = connect_viewer(addr).await;
    wait_for_members(&relay, 6).await;
    sender
        .send(Message::Text("<div>payload</div>".to_string()))
        .await
        .unwrap();

    for viewer in viewers.iter_mut() {
        assert_eq!(next_text(viewer).await, "<div>payload</div>");
    }
    // The sender is part of the broadcast set.
    assert_eq!(next_text(&mut sender).await, "<div>payload</div>");
    for viewer in viewers.iter_mut() {
        assert_quiet(viewer).await;
    }

    relay.shutdown().await;
}

#[tokio::test]
async fn out_of_range_positions_are_relayed_verbatim() {
    let (relay, addr) = start_relay().await;
    let producer = connect_producer(addr).await;
    let mut viewer = connect_viewer(addr).await;
    wait_for_members(&relay, 2).await;

    producer.send(&envelope("<p>top</p>", -25)).await;
    let received = SnapshotEnvelope::parse(&next_text(&mut viewer).await).unwrap();
    assert_eq!(received.position.raw(), -25);
    assert_eq!(received.scroll_target(), Percentage::ZERO);

    producer.send(&envelope("<p>bottom</p>", 140)).await;
    let received = SnapshotEnvelope::parse(&next_text(&mut viewer).await).unwrap();
    assert_eq!(received.position.raw(), 140);
    assert_eq!(received.scroll_target(), Percentage::HUNDRED);

    producer.close().await;
    relay.shutdown().await;
}

#[tokio::test]
async fn abrupt_disconnect_does_not_disturb_other_viewers() {
    let (relay, addr) = start_relay().await;
    let producer = connect_producer(addr).await;
    let mut survivor = connect_viewer(addr).await;
    let dropped = connect_viewer(addr).await;
    wait_for_members(&relay, 3).await;

    // No close frame: the transport just goes away.
    drop(dropped);

    let update = envelope("<p>still here</p>", 50);
    producer.send(&update).await;
    assert_eq!(next_text(&mut survivor).await, update.to_wire());
    wait_for_members(&relay, 2).await;

    producer.close().await;
    relay.shutdown().await;
}

#[tokio::test]
async fn plain_http_get_serves_viewer_page() {
    let (relay, addr) = start_relay().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    tokio::io::AsyncWriteExt::write_all(
        &mut stream,
        b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await
    .unwrap();
    let mut response = String::new();
    tokio::io::AsyncReadExt::read_to_string(&mut stream, &mut response)
        .await
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.contains("position-percentage"));

    relay.shutdown().await;
}
