//! Asynchronous request lifecycle.
//!
//! `Idle → Loading → {Success, Failure}`, and back to `Loading` on regenerate.
//! Each start gets a fresh request id; a result is only applied while the
//! state is still `Loading` with that id, so a superseded request that
//! resolves late is dropped instead of overwriting the newer result.
//! Superseded calls are not aborted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::Notifier;
use crate::core::models::{SummaryRequest, SummaryResult};
use crate::errors::ErrorKind;
use crate::features::summarize::Summarize;

pub const PROGRESS_TITLE: &str = "Generating summary...";
pub const SUCCESS_TITLE: &str = "Completed";
pub const FAILURE_TITLE: &str = "Couldn't generate summary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Loading {
        request_id: Uuid,
    },
    Success {
        request_id: Uuid,
        text: String,
    },
    Failure {
        request_id: Uuid,
        kind: ErrorKind,
        message: String,
    },
}

impl RequestState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading { .. })
    }

    #[must_use]
    pub fn result(&self) -> Option<SummaryResult> {
        match self {
            RequestState::Success { text, .. } => Some(SummaryResult::Summary(text.clone())),
            RequestState::Failure { kind, message, .. } => Some(SummaryResult::Failed {
                kind: *kind,
                message: message.clone(),
            }),
            RequestState::Idle | RequestState::Loading { .. } => None,
        }
    }
}

struct Inner {
    state: RequestState,
    request: Option<SummaryRequest>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct RequestController<S> {
    summarizer: Arc<S>,
    notifier: Arc<dyn Notifier>,
    inner: Arc<Mutex<Inner>>,
}

impl<S: Summarize + 'static> RequestController<S> {
    pub fn new(summarizer: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            summarizer,
            notifier,
            inner: Arc::new(Mutex::new(Inner {
                state: RequestState::Idle,
                request: None,
            })),
        }
    }

    #[must_use]
    pub fn state(&self) -> RequestState {
        lock(&self.inner).state.clone()
    }

    #[must_use]
    pub fn result(&self) -> Option<SummaryResult> {
        lock(&self.inner).state.result()
    }

    #[must_use]
    pub fn request(&self) -> Option<SummaryRequest> {
        lock(&self.inner).request.clone()
    }

    /// Starts summarizing `request`, superseding whatever was active.
    pub fn submit(&self, request: SummaryRequest) -> JoinHandle<()> {
        self.start(request)
    }

    /// Re-runs the current request. Returns `None` when nothing was ever submitted.
    pub fn regenerate(&self) -> Option<JoinHandle<()>> {
        let request = {
            let inner = lock(&self.inner);
            if matches!(inner.state, RequestState::Idle) {
                return None;
            }
            inner.request.clone()?
        };
        info!("Regenerating summary for {}", request.display_target());
        Some(self.start(request))
    }

    /// Submits and waits for this request to settle.
    pub async fn submit_and_wait(&self, request: SummaryRequest) -> RequestState {
        let handle = self.submit(request);
        self.settle(handle).await
    }

    /// Regenerates and waits. Stays `Idle` if nothing was submitted.
    pub async fn regenerate_and_wait(&self) -> RequestState {
        match self.regenerate() {
            Some(handle) => self.settle(handle).await,
            None => self.state(),
        }
    }

    async fn settle(&self, handle: JoinHandle<()>) -> RequestState {
        if let Err(e) = handle.await {
            error!("Summary task failed to complete: {}", e);
        }
        self.state()
    }

    fn start(&self, request: SummaryRequest) -> JoinHandle<()> {
        let request_id = Uuid::new_v4();
        {
            let mut inner = lock(&self.inner);
            if let RequestState::Loading { request_id: previous } = inner.state {
                debug!("Request {} superseded by {}", previous, request_id);
            }
            inner.state = RequestState::Loading { request_id };
            inner.request = Some(request.clone());
        }
        self.notifier.show_progress(PROGRESS_TITLE);
        self.notifier.render_result(None);

        let summarizer = Arc::clone(&self.summarizer);
        let notifier = Arc::clone(&self.notifier);
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let outcome = summarizer.summarize(&request).await;

            let result = {
                let mut guard = lock(&inner);
                let still_active = matches!(
                    guard.state,
                    RequestState::Loading { request_id: active } if active == request_id
                );
                if !still_active {
                    debug!("Discarding result of superseded request {}", request_id);
                    return;
                }
                guard.state = match &outcome {
                    Ok(text) => RequestState::Success {
                        request_id,
                        text: text.clone(),
                    },
                    Err(e) => RequestState::Failure {
                        request_id,
                        kind: e.kind(),
                        message: e.to_string(),
                    },
                };
                guard.state.result()
            };

            match &outcome {
                Ok(_) => notifier.show_success(
                    SUCCESS_TITLE,
                    &format!(
                        "Summary for {} generated successfully.",
                        request.display_target()
                    ),
                ),
                Err(e) => {
                    error!("Failed to generate summary: {}", e);
                    notifier.show_error(FAILURE_TITLE, &e.to_string());
                }
            }
            notifier.render_result(result.as_ref());
        })
    }
}
