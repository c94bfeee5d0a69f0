use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use slack_digest::core::models::{SummaryRequest, SummaryResult};
use slack_digest::errors::{DigestError, ErrorKind};
use slack_digest::features::Summarize;
use slack_digest::lifecycle::controller::{FAILURE_TITLE, PROGRESS_TITLE, SUCCESS_TITLE};
use slack_digest::lifecycle::{Notifier, RequestController, RequestState};

type Plan = (Duration, Result<String, DigestError>);

/// Pops one planned outcome per call, sleeping for the planned delay first.
#[derive(Default)]
struct ScriptedSummarizer {
    plans: Mutex<VecDeque<Plan>>,
    calls: Mutex<usize>,
}

impl ScriptedSummarizer {
    fn with(plans: Vec<Plan>) -> Arc<Self> {
        Arc::new(Self {
            plans: Mutex::new(plans.into()),
            calls: Mutex::new(0),
        })
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Summarize for ScriptedSummarizer {
    async fn summarize(&self, _request: &SummaryRequest) -> Result<String, DigestError> {
        *self.calls.lock().unwrap() += 1;
        let (delay, outcome) = self
            .plans
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((Duration::ZERO, Ok("default".to_string())));
        tokio::time::sleep(delay).await;
        outcome
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Progress(String),
    Success(String, String),
    Error(String, String),
    Rendered(Option<SummaryResult>),
}

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<Event>>,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show_progress(&self, title: &str) {
        self.events.lock().unwrap().push(Event::Progress(title.to_string()));
    }

    fn show_success(&self, title: &str, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Success(title.to_string(), message.to_string()));
    }

    fn show_error(&self, title: &str, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Error(title.to_string(), message.to_string()));
    }

    fn render_result(&self, result: Option<&SummaryResult>) {
        self.events.lock().unwrap().push(Event::Rendered(result.cloned()));
    }
}

fn channel_request() -> SummaryRequest {
    SummaryRequest::channel("general", Some(7), None)
}

#[tokio::test]
async fn success_walks_loading_then_success() {
    let summarizer = ScriptedSummarizer::with(vec![(Duration::ZERO, Ok("- done".to_string()))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = RequestController::new(summarizer, notifier.clone());

    assert_eq!(controller.state(), RequestState::Idle);
    let handle = controller.submit(channel_request());
    assert!(controller.state().is_loading());
    assert_eq!(controller.result(), None);

    handle.await.unwrap();
    assert!(matches!(controller.state(), RequestState::Success { ref text, .. } if text == "- done"));

    assert_eq!(
        notifier.events(),
        vec![
            Event::Progress(PROGRESS_TITLE.to_string()),
            Event::Rendered(None),
            Event::Success(
                SUCCESS_TITLE.to_string(),
                "Summary for #general generated successfully.".to_string()
            ),
            Event::Rendered(Some(SummaryResult::Summary("- done".to_string()))),
        ]
    );
}

#[tokio::test]
async fn failure_records_kind_and_notifies_error() {
    let summarizer = ScriptedSummarizer::with(vec![(
        Duration::ZERO,
        Err(DigestError::NoSuchChannel("genral".to_string())),
    )]);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = RequestController::new(summarizer, notifier.clone());

    let state = controller
        .submit_and_wait(SummaryRequest::channel("genral", None, None))
        .await;

    match state {
        RequestState::Failure { kind, message, .. } => {
            assert_eq!(kind, ErrorKind::NoSuchChannel);
            assert_eq!(message, "No such channel: genral");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(notifier.events().contains(&Event::Error(
        FAILURE_TITLE.to_string(),
        "No such channel: genral".to_string()
    )));
}

#[tokio::test]
async fn regenerate_before_submit_does_nothing() {
    let summarizer = ScriptedSummarizer::with(vec![]);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = RequestController::new(summarizer.clone(), notifier.clone());

    assert!(controller.regenerate().is_none());
    assert_eq!(controller.regenerate_and_wait().await, RequestState::Idle);
    assert_eq!(summarizer.calls(), 0);
    assert!(notifier.events().is_empty());
}

#[tokio::test]
async fn regenerate_after_failure_reaches_success() {
    let summarizer = ScriptedSummarizer::with(vec![
        (
            Duration::ZERO,
            Err(DigestError::CompletionFailure("rate limited".to_string())),
        ),
        (Duration::ZERO, Ok("- recovered".to_string())),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = RequestController::new(summarizer.clone(), notifier);

    let first = controller.submit_and_wait(channel_request()).await;
    assert!(matches!(first, RequestState::Failure { .. }));

    let second = controller.regenerate_and_wait().await;
    assert!(matches!(second, RequestState::Success { ref text, .. } if text == "- recovered"));
    assert_eq!(summarizer.calls(), 2);
    assert_eq!(controller.request(), Some(channel_request()));
}

#[tokio::test]
async fn each_start_gets_a_new_request_id() {
    let summarizer = ScriptedSummarizer::with(vec![
        (Duration::ZERO, Ok("one".to_string())),
        (Duration::ZERO, Ok("two".to_string())),
    ]);
    let controller =
        RequestController::new(summarizer, Arc::new(RecordingNotifier::default()));

    let first = controller.submit_and_wait(channel_request()).await;
    let second = controller.regenerate_and_wait().await;

    let id = |state: &RequestState| match state {
        RequestState::Success { request_id, .. } => *request_id,
        other => panic!("expected success, got {other:?}"),
    };
    assert_ne!(id(&first), id(&second));
}

#[tokio::test(start_paused = true)]
async fn late_result_of_superseded_request_is_discarded() {
    let summarizer = ScriptedSummarizer::with(vec![
        (Duration::from_millis(500), Ok("stale A".to_string())),
        (Duration::from_millis(10), Ok("fresh B".to_string())),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = RequestController::new(summarizer.clone(), notifier.clone());

    let a = controller.submit(channel_request());
    // Let A start and take its plan before B is issued.
    tokio::task::yield_now().await;
    let b = controller.regenerate().expect("regenerate while loading");

    b.await.unwrap();
    assert!(matches!(controller.state(), RequestState::Success { ref text, .. } if text == "fresh B"));

    a.await.unwrap();
    assert!(matches!(controller.state(), RequestState::Success { ref text, .. } if text == "fresh B"));
    assert_eq!(summarizer.calls(), 2);

    let successes = notifier
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Success(..)))
        .count();
    assert_eq!(successes, 1, "only the active request notifies");
}

#[tokio::test(start_paused = true)]
async fn late_failure_does_not_overwrite_newer_success() {
    let summarizer = ScriptedSummarizer::with(vec![
        (
            Duration::from_millis(500),
            Err(DigestError::ChannelFetchFailure("timeout".to_string())),
        ),
        (Duration::from_millis(10), Ok("fresh".to_string())),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = RequestController::new(summarizer, notifier.clone());

    let a = controller.submit(SummaryRequest::channel("alpha", None, None));
    tokio::task::yield_now().await;
    let b = controller.submit(SummaryRequest::channel("beta", None, None));

    b.await.unwrap();
    a.await.unwrap();

    assert!(matches!(controller.state(), RequestState::Success { ref text, .. } if text == "fresh"));
    assert_eq!(controller.request().map(|r| r.target), Some("beta".to_string()));
    assert!(
        !notifier
            .events()
            .iter()
            .any(|e| matches!(e, Event::Error(..)))
    );
}
