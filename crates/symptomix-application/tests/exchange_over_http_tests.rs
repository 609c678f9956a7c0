//! ChatExchangeController driving HttpChatBackend against a wiremock server.

use std::sync::Arc;

use serde_json::json;
use symptomix_application::{ChatExchangeController, ControllerOptions};
use symptomix_core::{
    ERROR_NOTICE, EntryKind, ExchangeState, LayoutState, SessionContext, SessionId,
};
use symptomix_interaction::HttpChatBackend;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn controller_for(base_url: impl Into<String>) -> ChatExchangeController {
    let session = SessionContext::new(SessionId::parse("user123").unwrap());
    ChatExchangeController::new(
        session,
        Arc::new(HttpChatBackend::new(base_url)),
        ControllerOptions::default(),
    )
}

// ============================================================================
// TEST: Full exchanges
// ============================================================================

#[tokio::test]
async fn test_reply_markdown_lands_as_html() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get"))
        .and(body_json(json!({ "msg": "hello", "chat_id": "user123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": "**hi**" })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(server.uri());
    let report = controller
        .submit_and_wait("  hello ")
        .await
        .unwrap()
        .expect("exchange should start");

    assert_eq!(report.state, ExchangeState::Rendered);
    assert_eq!(controller.layout().await, LayoutState::Active);

    let transcript = controller.transcript().await;
    assert_eq!(transcript.pending_count(), 0);
    let kinds: Vec<EntryKind> = transcript.entries().iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EntryKind::User, EntryKind::Bot]);
    let bot = transcript.get(report.terminal_entry).unwrap();
    assert!(bot.html.contains("<strong>hi</strong>"), "got {}", bot.html);
}

#[tokio::test]
async fn test_server_error_lands_as_notice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Traceback: boom"))
        .mount(&server)
        .await;

    let controller = controller_for(server.uri());
    let report = controller.submit_and_wait("hello").await.unwrap().unwrap();

    assert_eq!(report.state, ExchangeState::ErrorRendered);
    assert_eq!(report.error.as_ref().and_then(|err| err.status()), Some(500));

    let transcript = controller.transcript().await;
    assert_eq!(transcript.pending_count(), 0);
    let entry = transcript.get(report.terminal_entry).unwrap();
    assert_eq!(entry.kind, EntryKind::BotError);
    assert_eq!(entry.text, ERROR_NOTICE);
    assert!(!entry.html.contains("Traceback"));
}

#[tokio::test]
async fn test_refused_connection_lands_as_notice() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let controller = controller_for(format!("http://{addr}"));
    let report = controller.submit_and_wait("hello").await.unwrap().unwrap();

    assert_eq!(report.state, ExchangeState::ErrorRendered);
    let transcript = controller.transcript().await;
    assert_eq!(transcript.pending_count(), 0);
    assert_eq!(transcript.count(EntryKind::BotError), 1);
    assert_eq!(transcript.entries().last().unwrap().text, ERROR_NOTICE);
}
