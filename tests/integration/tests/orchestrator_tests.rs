//! Chat orchestrator tests
//!
//! Drive the services over in-memory storage, a static directory, and a
//! recording publisher; assert on stored state and on the envelopes handed to
//! the bus.
//!
//! Run with: cargo test -p integration-tests --test orchestrator_tests

use std::time::Duration;

use chat_core::{BroadcastEvent, ConversationId, ErrorKind, MessageId, UserId};
use chat_service::dto::{
    CreateGroupRequest, EditMessageRequest, Pagination, ReactionRequest, StatusRequest,
};
use chat_service::{
    ConversationService, MessageService, PresenceService, ReactionService, ReadReceiptService,
};
use integration_tests::fixtures::*;

fn sorted(mut ids: Vec<UserId>) -> Vec<UserId> {
    ids.sort();
    ids
}

fn edit(content: &str) -> EditMessageRequest {
    EditMessageRequest {
        content: content.to_string(),
    }
}

fn thumbs_up() -> ReactionRequest {
    ReactionRequest {
        reaction: "👍".to_string(),
    }
}

// ============================================================================
// Sending
// ============================================================================

#[tokio::test]
async fn test_first_message_creates_direct_conversation() {
    let test = TestContext::new();

    let message = test.send_direct(ALICE, BOB, "hi").await;

    assert_eq!(test.store.direct_conversation_count(), 1);
    assert_eq!(message.sender_id, ALICE);
    assert_eq!(message.content, "hi");
    assert!(message.edited_at.is_none());

    let envelopes = test.publisher.of_kind("message");
    assert_eq!(envelopes.len(), 1);
    assert_eq!(envelopes[0].recipient_ids, vec![BOB]);
    match &envelopes[0].event {
        BroadcastEvent::Message { message: sent } => assert_eq!(sent.id, message.id),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_second_message_reuses_direct_conversation() {
    let test = TestContext::new();

    let first = test.send_direct(ALICE, BOB, "hi").await;
    let reply = test.send_direct(BOB, ALICE, "hey").await;

    assert_eq!(first.conversation_id, reply.conversation_id);
    assert_eq!(test.store.direct_conversation_count(), 1);
    assert_eq!(
        test.publisher.last().map(|e| e.recipient_ids),
        Some(vec![ALICE])
    );
}

#[tokio::test]
async fn test_concurrent_first_contact_converges() {
    let test = TestContext::new();
    // Both calls see no conversation before either creates one
    test.store.set_delay(Some(Duration::from_millis(20)));

    let messages = test.messages();
    let (a, b) = tokio::join!(
        messages.send_message(ALICE, direct(BOB, "from alice")),
        messages.send_message(BOB, direct(ALICE, "from bob")),
    );

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.conversation_id, b.conversation_id);
    assert_eq!(test.store.direct_conversation_count(), 1);
}

#[tokio::test]
async fn test_send_to_existing_conversation() {
    let test = TestContext::new();
    let first = test.send_direct(ALICE, BOB, "hi").await;

    let message = test
        .messages()
        .send_message(BOB, to_conversation(first.conversation_id, "again"))
        .await
        .unwrap();

    assert_eq!(message.conversation_id, first.conversation_id);
    assert_eq!(
        test.publisher.last().map(|e| e.recipient_ids),
        Some(vec![ALICE])
    );
}

#[tokio::test]
async fn test_send_requires_exactly_one_target() {
    let test = TestContext::new();
    let first = test.send_direct(ALICE, BOB, "hi").await;
    test.publisher.clear();

    let mut neither = direct(BOB, "hi");
    neither.recipient_id = None;
    let err = test.messages().send_message(ALICE, neither).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mut both = direct(BOB, "hi");
    both.conversation_id = Some(first.conversation_id);
    let err = test.messages().send_message(ALICE, both).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    assert!(test.publisher.envelopes().is_empty());
}

#[tokio::test]
async fn test_send_to_self_is_rejected() {
    let test = TestContext::new();

    let err = test
        .messages()
        .send_message(ALICE, direct(ALICE, "me"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(test.store.conversation_count(), 0);
}

#[tokio::test]
async fn test_send_to_unknown_recipient() {
    let test = TestContext::new();

    let err = test
        .messages()
        .send_message(ALICE, direct(UserId::new(99), "anyone?"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.error_code(), "UNKNOWN_USER");
    assert_eq!(test.store.conversation_count(), 0);
}

#[tokio::test]
async fn test_unreachable_directory_reads_as_unknown_recipient() {
    let test = TestContext::new();
    test.directory.set_unreachable(true);

    let err = test
        .messages()
        .send_message(ALICE, direct(BOB, "hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_existing_direct_conversation_skips_directory() {
    let test = TestContext::new();
    test.send_direct(ALICE, BOB, "hi").await;
    test.directory.set_unreachable(true);

    let message = test
        .messages()
        .send_message(ALICE, direct(BOB, "still here"))
        .await
        .unwrap();

    assert_eq!(message.content, "still here");
}

#[tokio::test]
async fn test_send_to_unknown_conversation() {
    let test = TestContext::new();

    let err = test
        .messages()
        .send_message(ALICE, to_conversation(ConversationId::new(404), "hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_non_participant_cannot_send() {
    let test = TestContext::new();
    let first = test.send_direct(ALICE, BOB, "hi").await;

    let err = test
        .messages()
        .send_message(CAROL, to_conversation(first.conversation_id, "let me in"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[tokio::test]
async fn test_content_rules() {
    let test = TestContext::new();

    let err = test
        .messages()
        .send_message(ALICE, direct(BOB, "   "))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = test
        .messages()
        .send_message(ALICE, direct(BOB, &"a".repeat(4001)))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    // Validation happens before any conversation is created
    assert_eq!(test.store.conversation_count(), 0);

    let message = test.send_direct(ALICE, BOB, &"a".repeat(4000)).await;
    assert_eq!(message.content.chars().count(), 4000);
}

#[tokio::test]
async fn test_publish_failure_does_not_fail_send() {
    let test = TestContext::new();
    test.publisher.set_failing(true);

    let message = test.send_direct(ALICE, BOB, "hi").await;

    assert!(test.store.message(message.id).is_some());
    assert_eq!(test.publisher.of_kind("message").len(), 1);
}

#[tokio::test]
async fn test_slow_storage_is_unavailable() {
    let test = TestContext::new();
    test.store.set_delay(Some(TEST_CALL_TIMEOUT * 2));

    let err = test
        .messages()
        .send_message(ALICE, direct(BOB, "hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(err.status_code(), 503);
}

#[tokio::test]
async fn test_storage_down_is_unavailable() {
    let test = TestContext::new();
    test.store.set_unavailable(true);

    let err = test
        .messages()
        .send_message(ALICE, direct(BOB, "hi"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert!(test.publisher.envelopes().is_empty());
}

// ============================================================================
// Editing and deleting
// ============================================================================

#[tokio::test]
async fn test_edit_by_sender() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    let edited = test
        .messages()
        .edit_message(sent.id, ALICE, edit("hello"))
        .await
        .unwrap();

    assert_eq!(edited.content, "hello");
    assert!(edited.edited_at.is_some());

    let envelope = test.publisher.last().unwrap();
    assert_eq!(envelope.kind(), "message_edit");
    assert_eq!(sorted(envelope.recipient_ids), vec![ALICE, BOB]);
    match envelope.event {
        BroadcastEvent::MessageEdit { message } => {
            assert_eq!(message.content, "hello");
            assert!(message.edited_at.is_some());
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_edit_by_other_user_is_forbidden() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    test.publisher.clear();

    let err = test
        .messages()
        .edit_message(sent.id, BOB, edit("hijacked"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(test.store.message(sent.id).unwrap().content, "hi");
    assert!(test.publisher.envelopes().is_empty());
}

#[tokio::test]
async fn test_edit_unknown_message() {
    let test = TestContext::new();

    let err = test
        .messages()
        .edit_message(MessageId::new(404), ALICE, edit("x"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_then_delete_again_conflicts() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    test.messages().delete_message(sent.id, ALICE).await.unwrap();

    let envelope = test.publisher.last().unwrap();
    assert_eq!(envelope.kind(), "message_delete");
    assert_eq!(sorted(envelope.recipient_ids), vec![ALICE, BOB]);

    let err = test
        .messages()
        .delete_message(sent.id, ALICE)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let history = test
        .messages()
        .history(sent.conversation_id, BOB, Pagination::default())
        .await
        .unwrap();
    assert!(history.iter().all(|m| m.id != sent.id));
}

#[tokio::test]
async fn test_delete_by_other_user_is_forbidden() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    let err = test.messages().delete_message(sent.id, BOB).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(!test.store.message(sent.id).unwrap().is_deleted());
}

#[tokio::test]
async fn test_edit_deleted_message_conflicts() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    test.messages().delete_message(sent.id, ALICE).await.unwrap();

    let err = test
        .messages()
        .edit_message(sent.id, ALICE, edit("back"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
}

// ============================================================================
// History and conversations
// ============================================================================

#[tokio::test]
async fn test_history_newest_first_and_paged() {
    let test = TestContext::new();
    let first = test.send_direct(ALICE, BOB, "one").await;
    test.send_direct(BOB, ALICE, "two").await;
    test.send_direct(ALICE, BOB, "three").await;

    let history = test
        .messages()
        .history(first.conversation_id, ALICE, Pagination::default())
        .await
        .unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["three", "two", "one"]);

    let page = test
        .messages()
        .history(first.conversation_id, ALICE, Pagination::new(Some(1), Some(1)))
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].content, "two");
}

#[tokio::test]
async fn test_history_requires_participant() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    let err = test
        .messages()
        .history(sent.conversation_id, CAROL, Pagination::default())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
}

#[tokio::test]
async fn test_conversation_summary_unread_count() {
    let test = TestContext::new();
    let first = test.send_direct(ALICE, BOB, "one").await;
    test.send_direct(ALICE, BOB, "two").await;

    let conversations = ConversationService::new(&test.ctx);
    let summaries = conversations
        .list_conversations(BOB, Pagination::default())
        .await
        .unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].unread_count, 2);
    assert_eq!(
        summaries[0].last_message.as_ref().map(|m| m.content.as_str()),
        Some("two")
    );
    assert_eq!(sorted(summaries[0].participant_ids.clone()), vec![ALICE, BOB]);

    ReadReceiptService::new(&test.ctx)
        .mark_as_read(first.id, BOB)
        .await
        .unwrap();
    let summaries = conversations
        .list_conversations(BOB, Pagination::default())
        .await
        .unwrap();
    assert_eq!(summaries[0].unread_count, 1);

    // The sender's own messages are never unread for them
    let summaries = conversations
        .list_conversations(ALICE, Pagination::default())
        .await
        .unwrap();
    assert_eq!(summaries[0].unread_count, 0);
}

#[tokio::test]
async fn test_create_group_includes_creator() {
    let test = TestContext::new();

    let group = ConversationService::new(&test.ctx)
        .create_group(
            ALICE,
            CreateGroupRequest {
                name: "  team  ".to_string(),
                member_ids: vec![BOB, CAROL, BOB],
            },
        )
        .await
        .unwrap();

    assert!(group.is_group);
    assert_eq!(group.name, "team");

    let participants = ConversationService::new(&test.ctx)
        .participants(group.id, CAROL)
        .await
        .unwrap();
    assert_eq!(sorted(participants), vec![ALICE, BOB, CAROL]);
}

#[tokio::test]
async fn test_create_group_with_unknown_member() {
    let test = TestContext::new();

    let err = ConversationService::new(&test.ctx)
        .create_group(
            ALICE,
            CreateGroupRequest {
                name: "team".to_string(),
                member_ids: vec![BOB, UserId::new(99)],
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(test.store.conversation_count(), 0);
}

#[tokio::test]
async fn test_create_group_with_directory_down() {
    let test = TestContext::new();
    test.directory.set_unreachable(true);

    let err = ConversationService::new(&test.ctx)
        .create_group(
            ALICE,
            CreateGroupRequest {
                name: "team".to_string(),
                member_ids: vec![BOB],
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unavailable);
    assert_eq!(test.store.conversation_count(), 0);
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_add_reaction_twice_stores_once() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    let reactions = ReactionService::new(&test.ctx);

    let first = reactions.add_reaction(sent.id, BOB, thumbs_up()).await.unwrap();
    let second = reactions.add_reaction(sent.id, BOB, thumbs_up()).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(test.store.reaction_count(sent.id), 1);

    let envelopes = test.publisher.of_kind("reaction_add");
    assert_eq!(envelopes.len(), 2);
    assert_eq!(sorted(envelopes[0].recipient_ids.clone()), vec![ALICE, BOB]);
}

#[tokio::test]
async fn test_add_reaction_requires_participant() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    let err = ReactionService::new(&test.ctx)
        .add_reaction(sent.id, CAROL, thumbs_up())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(test.store.reaction_count(sent.id), 0);
}

#[tokio::test]
async fn test_remove_reaction_publishes_even_when_absent() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    let removed = ReactionService::new(&test.ctx)
        .remove_reaction(sent.id, BOB, thumbs_up())
        .await
        .unwrap();

    assert_eq!(removed, 0);
    let envelope = test.publisher.last().unwrap();
    assert_eq!(envelope.kind(), "reaction_remove");
    assert_eq!(sorted(envelope.recipient_ids), vec![ALICE, BOB]);
}

#[tokio::test]
async fn test_remove_reaction_deletes_row() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    let reactions = ReactionService::new(&test.ctx);
    reactions.add_reaction(sent.id, BOB, thumbs_up()).await.unwrap();

    let removed = reactions
        .remove_reaction(sent.id, BOB, thumbs_up())
        .await
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(test.store.reaction_count(sent.id), 0);
    assert!(reactions.list_reactions(sent.id, ALICE).await.unwrap().is_empty());
}

// ============================================================================
// Read receipts
// ============================================================================

#[tokio::test]
async fn test_mark_read_notifies_sender_only() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    let mark = ReadReceiptService::new(&test.ctx)
        .mark_as_read(sent.id, BOB)
        .await
        .unwrap();

    assert_eq!(mark.map(|m| m.user_id), Some(BOB));
    let envelope = test.publisher.last().unwrap();
    assert_eq!(envelope.kind(), "read_receipt");
    assert_eq!(envelope.recipient_ids, vec![ALICE]);
}

#[tokio::test]
async fn test_mark_read_twice_keeps_one_row() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    let receipts = ReadReceiptService::new(&test.ctx);

    receipts.mark_as_read(sent.id, BOB).await.unwrap();
    receipts.mark_as_read(sent.id, BOB).await.unwrap();

    assert_eq!(test.store.read_count(sent.id), 1);
    assert_eq!(receipts.readers(sent.id, ALICE).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sender_reading_own_message_is_noop() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    test.publisher.clear();

    let mark = ReadReceiptService::new(&test.ctx)
        .mark_as_read(sent.id, ALICE)
        .await
        .unwrap();

    assert!(mark.is_none());
    assert_eq!(test.store.read_count(sent.id), 0);
    assert!(test.publisher.envelopes().is_empty());
}

#[tokio::test]
async fn test_mark_read_by_non_participant() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    let err = ReadReceiptService::new(&test.ctx)
        .mark_as_read(sent.id, CAROL)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert_eq!(test.store.read_count(sent.id), 0);
}

// ============================================================================
// Presence
// ============================================================================

#[tokio::test]
async fn test_typing_includes_typer() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;

    let count = PresenceService::new(&test.ctx)
        .typing(ALICE, "alice", typing(sent.conversation_id, true))
        .await
        .unwrap();

    assert_eq!(count, 2);
    let envelope = test.publisher.last().unwrap();
    assert_eq!(envelope.kind(), "typing");
    assert_eq!(sorted(envelope.recipient_ids), vec![ALICE, BOB]);
    match envelope.event {
        BroadcastEvent::Typing { payload } => {
            assert_eq!(payload.user_id, ALICE);
            assert_eq!(payload.username, "alice");
            assert!(payload.is_typing);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_typing_requires_participant() {
    let test = TestContext::new();
    let sent = test.send_direct(ALICE, BOB, "hi").await;
    test.publisher.clear();

    let err = PresenceService::new(&test.ctx)
        .typing(CAROL, "carol", typing(sent.conversation_id, true))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authorization);
    assert!(test.publisher.envelopes().is_empty());
}

#[tokio::test]
async fn test_status_recipients_are_not_deduplicated() {
    let test = TestContext::new();
    test.send_direct(ALICE, BOB, "hi").await;
    ConversationService::new(&test.ctx)
        .create_group(
            ALICE,
            CreateGroupRequest {
                name: "team".to_string(),
                member_ids: vec![BOB, CAROL],
            },
        )
        .await
        .unwrap();

    let count = PresenceService::new(&test.ctx)
        .update_status(
            ALICE,
            "alice",
            StatusRequest {
                status: "away".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(count, 3);
    let envelope = test.publisher.last().unwrap();
    assert_eq!(envelope.kind(), "status");
    assert_eq!(sorted(envelope.recipient_ids), vec![BOB, BOB, CAROL]);
}

#[tokio::test]
async fn test_status_without_conversations_publishes_nothing() {
    let test = TestContext::new();

    let count = PresenceService::new(&test.ctx)
        .update_status(
            DAVE,
            "dave",
            StatusRequest {
                status: "online".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(count, 0);
    assert!(test.publisher.envelopes().is_empty());
}

#[tokio::test]
async fn test_unknown_status_is_rejected() {
    let test = TestContext::new();

    let err = PresenceService::new(&test.ctx)
        .update_status(
            ALICE,
            "alice",
            StatusRequest {
                status: "busy".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
}
