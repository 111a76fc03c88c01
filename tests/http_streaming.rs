use integrai::constants::FAILURE_MESSAGE;
use integrai::models::Message;
use integrai::notifier::{NotifyKind, ToastQueue};
use integrai::transport::HttpChatTransport;
use integrai::{ChatController, SubmitOutcome};
use serde_json::json;
use std::sync::Arc;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn submit_over_http_streams_reply() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "model": "m",
            "messages": [
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Hi there, ünïcode ✓"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = Arc::new(HttpChatTransport::new(format!("{}/chat", mock_server.uri())));
    let toasts = ToastQueue::default();
    let mut controller = ChatController::new(transport, Arc::new(toasts.clone()), "m", "sys");

    assert_eq!(controller.submit("hello").await, SubmitOutcome::Completed);
    assert_eq!(
        controller.active_conversation().messages(),
        &[Message::user("hello"), Message::bot("Hi there, ünïcode ✓")]
    );
    assert!(toasts.is_empty());
}

#[tokio::test]
async fn server_error_becomes_apology_toast() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&mock_server)
        .await;

    let transport = Arc::new(HttpChatTransport::new(mock_server.uri()));
    let toasts = ToastQueue::default();
    let mut controller = ChatController::new(transport, Arc::new(toasts.clone()), "m", "sys");

    assert_eq!(controller.submit("hello").await, SubmitOutcome::Failed);
    assert_eq!(
        controller.active_conversation().messages()[1],
        Message::bot(FAILURE_MESSAGE)
    );

    let toast = toasts.current().unwrap();
    assert_eq!(toast.message, FAILURE_MESSAGE);
    assert_eq!(toast.kind, NotifyKind::Error);
}
