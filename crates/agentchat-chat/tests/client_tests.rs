mod common;

use std::sync::Arc;

use agentchat_chat::{AgentClient, ChatError, SendStatus};
use agentchat_storage::{KeyValueStore, MemoryStore};
use agentchat_types::{is_valid_conversation_id, Message, Theme, FALLBACK_ERROR_MESSAGE};
use common::{client, sse_reply, RecordingView, ViewEvent};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/api/finance-assistant/stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/event-stream"))
        .mount(server)
        .await;
}

fn lifecycle(events: &[ViewEvent]) -> Vec<ViewEvent> {
    events
        .iter()
        .filter(|e| !matches!(e, ViewEvent::History(_)))
        .map(|e| match e {
            ViewEvent::Thinking(_) => ViewEvent::Thinking(0),
            other => other.clone(),
        })
        .collect()
}

#[tokio::test]
async fn test_conversation_id_reused_across_loads() {
    let raw = Arc::new(MemoryStore::new());
    let first: AgentClient<RecordingView> = client("http://127.0.0.1:9", &raw);
    let second = client("http://127.0.0.1:9", &raw);

    assert!(is_valid_conversation_id(first.conversation_id()));
    assert_eq!(first.conversation_id(), second.conversation_id());
    assert_eq!(
        raw.get("aspect_current_conversation_id").as_deref(),
        Some(first.conversation_id())
    );
}

#[tokio::test]
async fn test_new_chat_changes_id_and_persists() {
    let raw = Arc::new(MemoryStore::new());
    let mut chat = client("http://127.0.0.1:9", &raw);
    let before = chat.conversation_id().to_string();

    chat.new_chat().unwrap();

    assert_ne!(chat.conversation_id(), before);
    assert!(is_valid_conversation_id(chat.conversation_id()));
    assert_eq!(
        raw.get("aspect_current_conversation_id").as_deref(),
        Some(chat.conversation_id())
    );
    assert_eq!(chat.view().events, vec![ViewEvent::Clear, ViewEvent::Welcome]);

    let reloaded = client("http://127.0.0.1:9", &raw);
    assert_eq!(reloaded.conversation_id(), chat.conversation_id());
}

#[tokio::test]
async fn test_invalid_stored_id_is_replaced() {
    let raw = Arc::new(MemoryStore::new());
    raw.set("aspect_current_conversation_id", "not-a-uuid").unwrap();
    let chat = client("http://127.0.0.1:9", &raw);
    assert!(is_valid_conversation_id(chat.conversation_id()));
}

#[tokio::test]
async fn test_streamed_reply_lifecycle() {
    let server = MockServer::start().await;
    mock_stream(&server, sse_reply(&["**Q3** ", "revenue rose"])).await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);

    let status = chat.send_message("  How was Q3?  ").await;
    let SendStatus::Replied(outcome) = status else {
        panic!("expected a reply, got {:?}", status);
    };
    assert_eq!(outcome.text, "**Q3** revenue rose");

    assert_eq!(
        lifecycle(&chat.view().events),
        vec![
            ViewEvent::User("How was Q3?".to_string()),
            ViewEvent::Thinking(0),
            ViewEvent::CompleteThinking,
            ViewEvent::BeginBot,
            ViewEvent::UpdateBot("**Q3** ".to_string()),
            ViewEvent::UpdateBot("**Q3** revenue rose".to_string()),
            ViewEvent::FinalizeBot("<strong>Q3</strong> revenue rose".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_local_mode_records_exchange_and_auto_titles() {
    let server = MockServer::start().await;
    mock_stream(&server, sse_reply(&["Margins held steady."])).await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);
    let long_question = "Can you break down our gross margin trend over the last four quarters?";

    chat.send_message(long_question).await;
    chat.send_message("And for next year?").await;

    let items = chat.history_items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0].title,
        format!("{}...", long_question.chars().take(50).collect::<String>())
    );
    assert!(items[0].active);

    let transcript = chat.transcript(chat.conversation_id()).await.unwrap().unwrap();
    assert_eq!(transcript.messages.len(), 4);
}

#[tokio::test]
async fn test_error_frame_shows_fallback_once() {
    let server = MockServer::start().await;
    mock_stream(
        &server,
        "data: {\"chunk\":\"Partial\"}\n\ndata: {\"error\":\"upstream failed\"}\n\ndata: {\"chunk\":\"late\"}\n\n"
            .to_string(),
    )
    .await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);

    let status = chat.send_message("hello").await;
    assert!(matches!(status, SendStatus::Failed(_)));

    let view = chat.view();
    assert_eq!(view.count(&ViewEvent::CompleteThinking), 1);
    assert_eq!(view.count(&ViewEvent::DiscardBot), 1);
    assert_eq!(view.count(&ViewEvent::Error(FALLBACK_ERROR_MESSAGE.to_string())), 1);
    assert!(!view
        .events
        .iter()
        .any(|e| matches!(e, ViewEvent::UpdateBot(t) if t.contains("late"))));
    assert!(!view.events.iter().any(|e| matches!(e, ViewEvent::FinalizeBot(_))));
}

#[tokio::test]
async fn test_http_failure_before_any_chunk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/finance-assistant/stream"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);
    chat.send_message("hello").await;

    assert_eq!(
        lifecycle(&chat.view().events),
        vec![
            ViewEvent::User("hello".to_string()),
            ViewEvent::Thinking(0),
            ViewEvent::CompleteThinking,
            ViewEvent::Error(FALLBACK_ERROR_MESSAGE.to_string()),
        ]
    );
}

#[tokio::test]
async fn test_blank_input_ignored() {
    let raw = Arc::new(MemoryStore::new());
    let mut chat = client("http://127.0.0.1:9", &raw);
    assert_eq!(chat.send_message("   \n ").await, SendStatus::Ignored);
    assert!(chat.view().events.is_empty());
}

#[tokio::test]
async fn test_user_creation_switches_to_remote_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "userId": "user-7" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user/user-7/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversations": [{
                "externalId": "c-remote",
                "title": "From server",
                "createdAt": "2024-01-01T00:00:00.000Z",
                "messageCount": 2
            }]
        })))
        .mount(&server)
        .await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);
    assert!(!chat.is_remote_history());

    assert_eq!(chat.initialize_user_id().await.as_deref(), Some("user-7"));
    assert!(chat.is_remote_history());
    assert_eq!(raw.get("aspect_user_id").as_deref(), Some("user-7"));

    // cached: no second create call
    let mut again = client(&server.uri(), &raw);
    assert_eq!(again.initialize_user_id().await.as_deref(), Some("user-7"));

    let items = chat.history_items().await.unwrap();
    assert_eq!(items[0].id, "c-remote");
    assert_eq!(items[0].title, "From server");
}

#[tokio::test]
async fn test_user_creation_failure_stays_local() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/user/create"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);
    assert_eq!(chat.initialize_user_id().await, None);
    assert!(!chat.is_remote_history());
    assert_eq!(raw.get("aspect_user_id"), None);
}

#[tokio::test]
async fn test_remote_listing_falls_back_to_local_blob() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user/user-7/conversations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let raw = Arc::new(MemoryStore::new());
    raw.set("aspect_user_id", "user-7").unwrap();
    raw.set(
        "aspect_chat_history",
        r#"{"c-local":{"id":"c-local","title":"Cached","createdAt":"2024-01-01T00:00:00.000Z","messageCount":0}}"#,
    )
    .unwrap();

    let chat = client(&server.uri(), &raw);
    assert!(chat.is_remote_history());
    let items = chat.history_items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Cached");
}

#[tokio::test]
async fn test_delete_active_chat_starts_new_one() {
    let server = MockServer::start().await;
    mock_stream(&server, sse_reply(&["ok"])).await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);
    chat.send_message("first").await;
    let active = chat.conversation_id().to_string();

    chat.delete_chat(&active).await.unwrap();

    assert_ne!(chat.conversation_id(), active);
    assert!(chat.history_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_switch_to_chat_replays_messages() {
    let server = MockServer::start().await;
    mock_stream(&server, sse_reply(&["- one\n- two"])).await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);
    chat.send_message("list please").await;
    let first = chat.conversation_id().to_string();

    chat.new_chat().unwrap();
    chat.switch_to_chat(&first).await.unwrap();

    let events = lifecycle(&chat.view_mut().take());
    let replay: Vec<ViewEvent> = events
        .into_iter()
        .rev()
        .take(3)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    assert_eq!(
        replay,
        vec![
            ViewEvent::Clear,
            ViewEvent::User("list please".to_string()),
            ViewEvent::Bot("<ul>\n<li>one</li>\n<li>two</li>\n</ul>".to_string()),
        ]
    );
    assert_eq!(chat.conversation_id(), first);
}

#[tokio::test]
async fn test_switch_rejects_malformed_id() {
    let raw = Arc::new(MemoryStore::new());
    let mut chat = client("http://127.0.0.1:9", &raw);
    let before = chat.conversation_id().to_string();

    let err = chat.switch_to_chat("legacy-chat").await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidConversationId(ref id) if id == "legacy-chat"));
    assert_eq!(chat.conversation_id(), before);
    assert_eq!(
        raw.get("aspect_current_conversation_id").as_deref(),
        Some(before.as_str())
    );
    assert!(chat.view().events.is_empty());
}

#[tokio::test]
async fn test_empty_reply_is_not_recorded_as_bot_turn() {
    let server = MockServer::start().await;
    mock_stream(&server, "data: [DONE]\n\n".to_string()).await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);

    let status = chat.send_message("hello").await;
    assert!(matches!(status, SendStatus::Replied(ref outcome) if outcome.chunks == 0));

    let transcript = chat.transcript(chat.conversation_id()).await.unwrap().unwrap();
    assert_eq!(transcript.messages, vec![Message::user("hello")]);

    // Replaying the chat shows the question and no blank reply
    chat.view_mut().take();
    chat.resume().await.unwrap();
    let events = lifecycle(&chat.view().events);
    assert_eq!(events, vec![ViewEvent::Clear, ViewEvent::User("hello".to_string())]);
}

#[tokio::test]
async fn test_resume_empty_chat_shows_welcome() {
    let raw = Arc::new(MemoryStore::new());
    let mut chat = client("http://127.0.0.1:9", &raw);
    chat.resume().await.unwrap();
    assert_eq!(
        chat.view().events,
        vec![ViewEvent::Clear, ViewEvent::Welcome, ViewEvent::History(Vec::new())]
    );
}

#[tokio::test]
async fn test_theme_toggle_persists() {
    let raw = Arc::new(MemoryStore::new());
    let mut chat = client("http://127.0.0.1:9", &raw);

    assert_eq!(chat.load_theme(), Theme::Light);
    assert_eq!(chat.toggle_theme().unwrap(), Theme::Dark);
    assert_eq!(raw.get("aspect_theme").as_deref(), Some("dark"));

    let mut reloaded = client("http://127.0.0.1:9", &raw);
    assert_eq!(reloaded.load_theme(), Theme::Dark);
}

#[tokio::test]
async fn test_logo_set_and_remove() {
    let dir = tempfile::TempDir::new().unwrap();
    let logo = dir.path().join("brand.gif");
    std::fs::write(&logo, b"GIF89a").unwrap();

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client("http://127.0.0.1:9", &raw);

    chat.set_logo(&logo).unwrap();
    let stored = chat.logo().unwrap();
    assert!(stored.starts_with("data:image/gif;base64,"));

    chat.remove_logo().unwrap();
    assert_eq!(chat.logo(), None);
    assert_eq!(
        chat.view().events,
        vec![ViewEvent::Logo(Some(stored)), ViewEvent::Logo(None)]
    );
}

#[tokio::test]
async fn test_quick_upload_reports_each_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/kb/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fileName": "guide.pdf",
            "status": "completed",
            "fileId": "file-1"
        })))
        .mount(&server)
        .await;

    let raw = Arc::new(MemoryStore::new());
    let mut chat = client(&server.uri(), &raw);
    let uploaded = chat
        .upload_files(vec![agentchat_api::UploadFile::new("guide.pdf", b"%PDF".to_vec())])
        .await;

    assert_eq!(uploaded, 1);
    let events = &chat.view().events;
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[1], ViewEvent::Bot(t) if t.contains("File ID: file-1")));
}
