use async_trait::async_trait;
use integrai::constants::FAILURE_MESSAGE;
use integrai::models::{ChatRequest, Message, Role};
use integrai::notifier::{Notifier, NotifyKind};
use integrai::transport::{ChatTransport, ChunkStream};
use integrai::{ChatController, ChatError, ChatResult, SubmitOutcome};
use std::sync::{Arc, Mutex};

enum Reply {
    Chunks(Vec<&'static str>),
    Refused,
    Status(u16),
}

struct FakeBackend {
    reply: Reply,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeBackend {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ChatTransport for FakeBackend {
    async fn open(&self, request: &ChatRequest) -> ChatResult<ChunkStream> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Chunks(chunks) => {
                let items: Vec<ChatResult<String>> =
                    chunks.iter().map(|c| Ok(c.to_string())).collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Reply::Refused => Err(ChatError::network_error("connection refused")),
            Reply::Status(status) => Err(ChatError::Status {
                status: *status,
                body: String::new(),
            }),
        }
    }
}

#[derive(Default)]
struct Alerts(Mutex<Vec<(String, NotifyKind)>>);

impl Notifier for Alerts {
    fn notify(&self, message: &str, kind: NotifyKind) {
        self.0.lock().unwrap().push((message.to_string(), kind));
    }
}

fn setup(reply: Reply) -> (ChatController, Arc<FakeBackend>, Arc<Alerts>) {
    let backend = FakeBackend::new(reply);
    let alerts = Arc::new(Alerts::default());
    let controller = ChatController::new(
        backend.clone(),
        alerts.clone(),
        "integrai-test",
        "You are a test assistant.",
    );
    (controller, backend, alerts)
}

#[tokio::test]
async fn streamed_reply_lands_in_one_bot_message() {
    let (mut controller, backend, alerts) = setup(Reply::Chunks(vec!["Hi", " there"]));
    assert_eq!(controller.tabs().names(), vec!["Chat 1"]);

    assert_eq!(controller.submit("hello").await, SubmitOutcome::Completed);

    assert_eq!(
        controller.active_conversation().messages(),
        &[Message::user("hello"), Message::bot("Hi there")]
    );
    assert!(!controller.is_streaming());
    assert!(alerts.0.lock().unwrap().is_empty());

    let requests = backend.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "integrai-test");
    assert_eq!(requests[0].messages[0].role, Role::System);
    assert_eq!(requests[0].messages[0].content, "You are a test assistant.");
    assert_eq!(requests[0].messages.len(), 2);
}

#[tokio::test]
async fn failure_before_first_chunk_apologises() {
    let (mut controller, _, alerts) = setup(Reply::Refused);

    assert_eq!(controller.submit("hello").await, SubmitOutcome::Failed);

    let messages = controller.active_conversation().messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages.last(),
        Some(&Message::bot(
            "Sorry, Something went wrong. I couldn't get a response."
        ))
    );
    assert_eq!(
        *alerts.0.lock().unwrap(),
        vec![(FAILURE_MESSAGE.to_string(), NotifyKind::Error)]
    );
    assert!(!controller.is_streaming());
}

#[tokio::test]
async fn non_ok_status_is_recovered() {
    let (mut controller, _, alerts) = setup(Reply::Status(503));

    assert_eq!(controller.submit("hello").await, SubmitOutcome::Failed);
    assert_eq!(controller.active_conversation().messages()[1].text, FAILURE_MESSAGE);
    assert_eq!(alerts.0.lock().unwrap().len(), 1);

    // the user can try again straight away
    assert_eq!(controller.submit("again").await, SubmitOutcome::Failed);
    assert_eq!(controller.active_conversation().messages().len(), 4);
}

#[tokio::test]
async fn every_submission_adds_exactly_two_messages() {
    let (mut controller, _, _) = setup(Reply::Chunks(vec!["ok"]));

    for (i, text) in ["one", "two", "three"].into_iter().enumerate() {
        controller.submit(text).await;
        assert_eq!(controller.active_conversation().messages().len(), (i + 1) * 2);
    }
    controller.submit("   ").await;
    assert_eq!(controller.active_conversation().messages().len(), 6);
}

#[tokio::test]
async fn conversations_in_different_tabs_stay_separate() {
    let (mut controller, backend, _) = setup(Reply::Chunks(vec!["reply"]));

    controller.submit("in first tab").await;
    assert_eq!(controller.add_tab(), 1);
    assert_eq!(controller.tabs().names(), vec!["Chat 1", "Chat 2"]);
    controller.submit("in second tab").await;

    let requests = backend.requests.lock().unwrap();
    // system prompt + new turn only: the first tab's history is not shared
    assert_eq!(requests[1].messages.len(), 2);

    assert!(controller.select_tab(0));
    assert_eq!(
        controller.active_conversation().messages()[0],
        Message::user("in first tab")
    );
}

#[tokio::test]
async fn last_tab_cannot_be_deleted() {
    let (mut controller, _, _) = setup(Reply::Chunks(vec![]));
    assert!(!controller.delete_tab(0));
    assert_eq!(controller.tabs().names(), vec!["Chat 1"]);
}
