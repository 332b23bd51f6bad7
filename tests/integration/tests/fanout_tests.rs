//! Fan-out tests
//!
//! Services publish to an in-process bus; a broadcast listener consumes it and
//! writes to sessions in a registry. Sessions are plain channels here, no
//! sockets involved.
//!
//! Run with: cargo test -p integration-tests --test fanout_tests

use std::sync::Arc;
use std::time::Duration;

use chat_cache::LocalBus;
use chat_core::{BroadcastEnvelope, EventPublisher, UserId};
use chat_gateway::connection::OutboundFrame;
use chat_gateway::{BroadcastListener, Connection, ConnectionRegistry};
use chat_service::dto::CreateGroupRequest;
use chat_service::ConversationService;
use integration_tests::fakes::{FanoutPublisher, RecordingPublisher};
use integration_tests::fixtures::*;
use tokio::sync::mpsc;

struct Harness {
    test: TestContext,
    registry: Arc<ConnectionRegistry>,
    listener: BroadcastListener,
}

impl Harness {
    fn new() -> Self {
        let bus = LocalBus::new();
        let recorder = RecordingPublisher::new();
        let publisher = FanoutPublisher::new(vec![
            Arc::new(recorder.clone()) as Arc<dyn EventPublisher>,
            Arc::new(bus.clone()) as Arc<dyn EventPublisher>,
        ]);
        let test = TestContext::with_publisher(recorder, Arc::new(publisher));

        let registry = ConnectionRegistry::new_shared();
        let listener = BroadcastListener::new(registry.clone());
        listener.start(bus.receiver());

        Self {
            test,
            registry,
            listener,
        }
    }

    fn connect(&self, user_id: UserId, session_id: &str) -> mpsc::Receiver<OutboundFrame> {
        self.connect_with_capacity(user_id, session_id, 16)
    }

    fn connect_with_capacity(
        &self,
        user_id: UserId,
        session_id: &str,
        capacity: usize,
    ) -> mpsc::Receiver<OutboundFrame> {
        let (tx, rx) = mpsc::channel(capacity);
        self.registry
            .add(Connection::new(session_id, user_id, format!("user{user_id}"), tx));
        rx
    }
}

async fn next_frame(rx: &mut mpsc::Receiver<OutboundFrame>) -> BroadcastEnvelope {
    let frame = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("frame within timeout")
        .expect("session channel open");
    BroadcastEnvelope::from_json(&frame).expect("frame is an envelope")
}

async fn assert_no_frame(rx: &mut mpsc::Receiver<OutboundFrame>) {
    let received = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    if let Ok(Some(frame)) = received {
        panic!("unexpected frame: {frame}");
    }
}

#[tokio::test]
async fn test_only_connected_recipients_receive() {
    let harness = Harness::new();
    let group = ConversationService::new(&harness.test.ctx)
        .create_group(
            ALICE,
            CreateGroupRequest {
                name: "team".to_string(),
                member_ids: vec![BOB, CAROL],
            },
        )
        .await
        .unwrap();
    let mut bob = harness.connect(BOB, "bob-1");

    harness
        .test
        .messages()
        .send_message(ALICE, to_conversation(group.id, "hello team"))
        .await
        .unwrap();

    let envelope = next_frame(&mut bob).await;
    assert_eq!(envelope.kind(), "message");
    assert_eq!(envelope.recipient_ids.len(), 2);

    // Direct dispatch of the same envelope counts one local write
    assert_eq!(harness.listener.dispatch(&envelope), 1);
}

#[tokio::test]
async fn test_sender_does_not_receive_own_message() {
    let harness = Harness::new();
    let mut alice = harness.connect(ALICE, "alice-1");
    let mut bob = harness.connect(BOB, "bob-1");

    harness.test.send_direct(ALICE, BOB, "hi").await;

    assert_eq!(next_frame(&mut bob).await.kind(), "message");
    assert_no_frame(&mut alice).await;
}

#[tokio::test]
async fn test_frames_arrive_in_publish_order() {
    let harness = Harness::new();
    let mut bob = harness.connect(BOB, "bob-1");

    let sent = harness.test.send_direct(ALICE, BOB, "one").await;
    harness
        .test
        .messages()
        .edit_message(
            sent.id,
            ALICE,
            chat_service::dto::EditMessageRequest {
                content: "two".to_string(),
            },
        )
        .await
        .unwrap();
    harness
        .test
        .messages()
        .delete_message(sent.id, ALICE)
        .await
        .unwrap();

    let kinds = [
        next_frame(&mut bob).await.kind(),
        next_frame(&mut bob).await.kind(),
        next_frame(&mut bob).await.kind(),
    ];
    assert_eq!(kinds, ["message", "message_edit", "message_delete"]);
}

#[tokio::test]
async fn test_offline_recipient_misses_event() {
    let harness = Harness::new();

    harness.test.send_direct(ALICE, BOB, "while you were out").await;
    // Let the listener drain the bus before Bob shows up
    tokio::time::sleep(Duration::from_millis(50)).await;

    let mut bob = harness.connect(BOB, "bob-1");
    assert_no_frame(&mut bob).await;
}

#[tokio::test]
async fn test_replaced_session_teardown_keeps_replacement() {
    let harness = Harness::new();
    let mut first = harness.connect(BOB, "bob-1");
    let mut second = harness.connect(BOB, "bob-2");

    // The old session's cleanup must not evict the new one
    assert!(!harness.registry.remove_session(BOB, "bob-1"));
    assert!(harness.registry.contains(BOB));

    harness.test.send_direct(ALICE, BOB, "hi").await;

    assert_eq!(next_frame(&mut second).await.kind(), "message");
    assert_no_frame(&mut first).await;
}

#[tokio::test]
async fn test_full_queue_does_not_block_other_recipients() {
    let harness = Harness::new();
    let group = ConversationService::new(&harness.test.ctx)
        .create_group(
            ALICE,
            CreateGroupRequest {
                name: "team".to_string(),
                member_ids: vec![BOB, CAROL],
            },
        )
        .await
        .unwrap();
    let mut slow = harness.connect_with_capacity(BOB, "bob-1", 1);
    let mut carol = harness.connect(CAROL, "carol-1");

    for content in ["one", "two", "three"] {
        harness
            .test
            .messages()
            .send_message(ALICE, to_conversation(group.id, content))
            .await
            .unwrap();
    }

    for _ in 0..3 {
        assert_eq!(next_frame(&mut carol).await.kind(), "message");
    }

    // Only the first frame fit; the rest were dropped
    assert_eq!(next_frame(&mut slow).await.kind(), "message");
    assert_no_frame(&mut slow).await;
}

#[tokio::test]
async fn test_typing_reaches_typer_and_peer() {
    let harness = Harness::new();
    let mut alice = harness.connect(ALICE, "alice-1");
    let mut bob = harness.connect(BOB, "bob-1");
    let sent = harness.test.send_direct(ALICE, BOB, "hi").await;
    assert_eq!(next_frame(&mut bob).await.kind(), "message");

    chat_service::PresenceService::new(&harness.test.ctx)
        .typing(ALICE, "alice", typing(sent.conversation_id, true))
        .await
        .unwrap();

    assert_eq!(next_frame(&mut alice).await.kind(), "typing");
    assert_eq!(next_frame(&mut bob).await.kind(), "typing");
}

#[tokio::test]
async fn test_listener_stop() {
    let harness = Harness::new();
    assert!(harness.listener.is_running());

    harness.listener.stop().await;
    assert!(!harness.listener.is_running());

    let mut bob = harness.connect(BOB, "bob-1");
    harness.test.send_direct(ALICE, BOB, "nobody listening").await;
    assert_no_frame(&mut bob).await;
}
