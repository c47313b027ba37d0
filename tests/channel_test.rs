use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use inbox_client::channel::PushChannel;
use inbox_client::config::{Config, DebugConfig, ReconnectPolicy};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to get test addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server failed");
    });
    format!("127.0.0.1:{}", addr.port())
}

/// Endpoint that pushes two valid frames around a malformed one, then closes
async fn pushing_ws(ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(|mut socket: WebSocket| async move {
        let frames = [
            json!({
                "id": "1",
                "title": "A",
                "text": "first",
                "timestamp": "2024-01-01T10:00:00Z",
                "link": "/a"
            })
            .to_string(),
            "{not json".to_string(),
            json!({
                "id": "2",
                "title": "B",
                "text": "second",
                "timestamp": "2024-01-01T10:05:00Z"
            })
            .to_string(),
        ];
        for frame in frames {
            if socket.send(WsMessage::Text(frame)).await.is_err() {
                return;
            }
        }
        let _ = socket.send(WsMessage::Close(None)).await;
    })
}

/// Endpoint that counts connections and hangs up straight away
async fn slamming_ws(State(connections): State<Arc<AtomicUsize>>, ws: WebSocketUpgrade) -> Response {
    connections.fetch_add(1, Ordering::SeqCst);
    ws.on_upgrade(|mut socket: WebSocket| async move {
        let _ = socket.send(WsMessage::Close(None)).await;
    })
}

#[tokio::test]
async fn delivers_frames_in_order_and_survives_malformed_payloads() {
    let host = serve(Router::new().route("/ws/notifications/", get(pushing_ws))).await;

    let channel = PushChannel::new(
        format!("ws://{}/ws/notifications/", host),
        ReconnectPolicy::PageLifetime,
        false,
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move { channel.run(tx).await });

    let first = rx.recv().await.expect("first notification");
    assert_eq!(first.id, "1");
    assert_eq!(first.link.as_deref(), Some("/a"));

    // the malformed frame in between was skipped, not fatal
    let second = rx.recv().await.expect("second notification");
    assert_eq!(second.id, "2");
    assert!(second.link.is_none());

    // page-lifetime policy: after close the channel ends cleanly
    assert!(rx.recv().await.is_none());
    handle
        .await
        .expect("channel task panicked")
        .expect("channel should close cleanly");
}

#[tokio::test]
async fn retry_policy_reconnects_after_close() {
    let connections = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/ws/notifications/", get(slamming_ws))
        .with_state(connections.clone());
    let host = serve(router).await;

    let channel = PushChannel::new(
        format!("ws://{}/ws/notifications/", host),
        ReconnectPolicy::Retry { delay_secs: 0 },
        false,
    );

    let (tx, _rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(async move { channel.run(tx).await });

    let start = std::time::Instant::now();
    while connections.load(Ordering::SeqCst) < 3 && start.elapsed().as_secs() < 5 {
        sleep(Duration::from_millis(25)).await;
    }

    assert!(
        connections.load(Ordering::SeqCst) >= 3,
        "channel did not reconnect"
    );
    handle.abort();
}

#[test]
fn channel_scheme_follows_transport_security() {
    let mut config = Config {
        server_host: "example.org".to_string(),
        secure: false,
        csrf_token: String::new(),
        session_cookie: None,
        timezone: None,
        reconnect: ReconnectPolicy::PageLifetime,
        toast_ttl_secs: 600,
        upload_timeout_secs: 30,
        http_host: "127.0.0.1".to_string(),
        http_port: 0,
        debug: DebugConfig::default(),
    };

    assert_eq!(config.channel_url(), "ws://example.org/ws/notifications/");
    assert_eq!(config.base_url(), "http://example.org");

    config.secure = true;
    assert_eq!(config.channel_url(), "wss://example.org/ws/notifications/");
    assert_eq!(config.base_url(), "https://example.org");
}
