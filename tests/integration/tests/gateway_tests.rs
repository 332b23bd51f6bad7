//! Gateway Integration Tests
//!
//! Real WebSocket clients against the gateway, with services publishing to an
//! in-process bus the gateway's listener consumes.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;
use std::time::Duration;

use chat_cache::LocalBus;
use chat_core::EventPublisher;
use futures_util::SinkExt;
use integration_tests::{
    assert_silent, fixtures::*, next_json, FanoutPublisher, GatewayServer, RecordingPublisher,
};
use serde_json::json;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};

async fn start() -> (TestContext, GatewayServer) {
    let bus = LocalBus::new();
    let recorder = RecordingPublisher::new();
    let publisher = FanoutPublisher::new(vec![
        Arc::new(recorder.clone()) as Arc<dyn EventPublisher>,
        Arc::new(bus.clone()) as Arc<dyn EventPublisher>,
    ]);
    let test = TestContext::with_publisher(recorder, Arc::new(publisher));
    let gateway = GatewayServer::start(&test, &bus)
        .await
        .expect("Failed to start gateway");
    (test, gateway)
}

#[tokio::test]
async fn test_upgrade_without_token_is_rejected() {
    let (_test, gateway) = start().await;

    let result = tokio_tungstenite::connect_async(gateway.ws_url(None)).await;

    match result {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("upgrade without token succeeded"),
    }
    assert!(gateway.state.registry().is_empty());
}

#[tokio::test]
async fn test_upgrade_with_bad_token_is_rejected() {
    let (_test, gateway) = start().await;

    let result = tokio_tungstenite::connect_async(gateway.ws_url(Some("garbage"))).await;

    match result {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("upgrade with bad token succeeded"),
    }
}

#[tokio::test]
async fn test_connected_user_receives_message() {
    let (test, gateway) = start().await;
    let mut bob = gateway
        .connect(BOB, &token_for(BOB, "bob"))
        .await
        .expect("bob connects");

    let sent = test.send_direct(ALICE, BOB, "hi bob").await;

    let frame = next_json(&mut bob).await.unwrap();
    assert_eq!(frame["type"], "message");
    assert_eq!(frame["message"]["id"], sent.id.into_inner());
    assert_eq!(frame["message"]["content"], "hi bob");
    assert_eq!(frame["recipient_ids"], json!([2]));
}

#[tokio::test]
async fn test_typing_frame_reaches_peer() {
    let (test, gateway) = start().await;
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    let mut alice = gateway
        .connect(ALICE, &token_for(ALICE, "alice"))
        .await
        .expect("alice connects");
    let mut bob = gateway
        .connect(BOB, &token_for(BOB, "bob"))
        .await
        .expect("bob connects");

    let frame = json!({
        "type": "typing",
        "payload": { "conversation_id": sent.conversation_id, "is_typing": true }
    });
    alice
        .send(WsMessage::Text(frame.to_string()))
        .await
        .expect("frame sent");

    let received = next_json(&mut bob).await.unwrap();
    assert_eq!(received["type"], "typing");
    assert_eq!(received["payload"]["user_id"], 1);
    assert_eq!(received["payload"]["username"], "alice");
    assert_eq!(received["payload"]["is_typing"], true);

    // The typer is a participant too
    let echoed = next_json(&mut alice).await.unwrap();
    assert_eq!(echoed["type"], "typing");
}

#[tokio::test]
async fn test_bad_frame_keeps_session_open() {
    let (test, gateway) = start().await;
    let mut bob = gateway
        .connect(BOB, &token_for(BOB, "bob"))
        .await
        .expect("bob connects");

    bob.send(WsMessage::Text("not json".to_string()))
        .await
        .expect("frame sent");
    bob.send(WsMessage::Text(
        json!({ "type": "unknown", "payload": {} }).to_string(),
    ))
    .await
    .expect("frame sent");
    assert_silent(&mut bob, Duration::from_millis(100)).await;

    test.send_direct(ALICE, BOB, "still there?").await;
    let frame = next_json(&mut bob).await.unwrap();
    assert_eq!(frame["type"], "message");
}

#[tokio::test]
async fn test_typing_outside_conversation_is_ignored() {
    let (test, gateway) = start().await;
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    let mut carol = gateway
        .connect(CAROL, &token_for(CAROL, "carol"))
        .await
        .expect("carol connects");
    test.publisher.clear();

    let frame = json!({
        "type": "typing",
        "payload": { "conversation_id": sent.conversation_id }
    });
    carol
        .send(WsMessage::Text(frame.to_string()))
        .await
        .expect("frame sent");

    assert_silent(&mut carol, Duration::from_millis(100)).await;
    assert!(test.publisher.of_kind("typing").is_empty());
}

#[tokio::test]
async fn test_disconnect_unregisters_session() {
    let (_test, gateway) = start().await;
    let mut bob = gateway
        .connect(BOB, &token_for(BOB, "bob"))
        .await
        .expect("bob connects");

    bob.close(None).await.expect("close sent");

    let unregistered = tokio::time::timeout(Duration::from_secs(2), async {
        while gateway.state.registry().contains(BOB) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(unregistered.is_ok(), "session still registered");
}

#[tokio::test]
async fn test_reconnect_replaces_session() {
    let (test, gateway) = start().await;
    let token = token_for(BOB, "bob");
    let _old = gateway.connect(BOB, &token).await.expect("first connect");
    let registered = gateway.state.registry().lookup(BOB).expect("registered");

    let mut new = gateway.connect(BOB, &token).await.expect("second connect");
    let replaced = tokio::time::timeout(Duration::from_secs(2), async {
        while gateway
            .state
            .registry()
            .lookup(BOB)
            .is_some_and(|c| c.session_id() == registered.session_id())
        {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(replaced.is_ok(), "second session never registered");

    test.send_direct(ALICE, BOB, "to the new session").await;
    let frame = next_json(&mut new).await.unwrap();
    assert_eq!(frame["message"]["content"], "to the new session");
}

#[tokio::test]
async fn test_shutdown_closes_sessions() {
    let (_test, gateway) = start().await;
    let mut bob = gateway
        .connect(BOB, &token_for(BOB, "bob"))
        .await
        .expect("bob connects");

    gateway.shutdown().await;

    assert!(next_json(&mut bob).await.is_err());
    assert!(gateway.state.registry().is_empty());
    assert!(!gateway.state.listener().is_running());
}
