//! End-to-end tests for the process-wide hub.
//!
//! Kept to a single test: the global hub's dispatch loop lives on the
//! runtime of whichever test touches it first.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

use chat_hub::adapters::{build_router, GlobalHub, HubManager, WebSocketState};
use chat_hub::config::{HubConfig, ServerConfig};
use chat_hub::ports::Hub;

#[tokio::test]
async fn global_feed_fans_out_and_is_reported() {
    let manager = Arc::new(HubManager::new(HubConfig::default()));
    let app = build_router(
        WebSocketState::new(Arc::clone(&manager)),
        &ServerConfig::default(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = app.clone();
    tokio::spawn(async move {
        axum::serve(listener, server).await.unwrap();
    });

    let url = format!("ws://{}/ws/global", addr);
    let (mut a, _) = connect_async(url.as_str()).await.unwrap();
    let (mut b, _) = connect_async(url.as_str()).await.unwrap();

    let global = GlobalHub::instance();
    timeout(Duration::from_secs(2), async {
        while global.client_count().await < 2 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("global clients never registered");

    // Room-scoped events are not carried on the global feed.
    a.send(Message::Text(
        r#"{"type":"MessageSent","data":{"content":"wrong hub"}}"#.to_string(),
    ))
    .await
    .unwrap();
    a.send(Message::Text(
        r#"{"type":"UserJoined","data":{"roomId":"r1","userId":"u1"}}"#.to_string(),
    ))
    .await
    .unwrap();

    for socket in [&mut a, &mut b] {
        let message = timeout(Duration::from_secs(2), socket.next())
            .await
            .expect("timed out waiting for message")
            .unwrap()
            .unwrap();
        let envelope: Value = match message {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected message: {:?}", other),
        };
        assert_eq!(envelope["type"], "RoomUserChange");
        assert_eq!(envelope["data"]["userId"], "u1");
    }

    let response = app
        .oneshot(Request::builder().uri("/api/rooms").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["globalClients"], 2);
    assert_eq!(json["rooms"], serde_json::json!([]));

    assert!(Arc::ptr_eq(&global, &GlobalHub::instance()));
    assert_eq!(GlobalHub::dispatch_loops_started(), 1);
}
