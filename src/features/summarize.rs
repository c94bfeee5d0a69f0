use async_trait::async_trait;
use tracing::info;

use crate::ai::Complete;
use crate::ai::prompt_builder::{build_channel_prompt, build_thread_prompt};
use crate::core::models::{DEFAULT_LOOKBACK_DAYS, SummaryRequest, TargetKind};
use crate::errors::DigestError;
use crate::slack::MessageSource;

/// Anything that can turn a [`SummaryRequest`] into digest text.
#[async_trait]
pub trait Summarize: Send + Sync {
    /// # Errors
    ///
    /// Propagates the message source and completion errors unchanged.
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, DigestError>;
}

/// Fetch → prompt → complete. Holds no state between calls.
pub struct Summarizer<M, C> {
    source: M,
    completion: C,
}

impl<M: MessageSource, C: Complete> Summarizer<M, C> {
    pub fn new(source: M, completion: C) -> Self {
        Self { source, completion }
    }

    pub fn source(&self) -> &M {
        &self.source
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }

    /// Summarizes the last `days` days of a channel (default 7, negative clamps to 0).
    ///
    /// # Errors
    ///
    /// `NoSuchChannel`, `ChannelFetchFailure`, `AuthFailure` or `CompletionFailure`.
    pub async fn summarize_channel(
        &self,
        channel_name: &str,
        days: Option<i64>,
        custom_prompt: Option<&str>,
    ) -> Result<String, DigestError> {
        let days = days.unwrap_or(DEFAULT_LOOKBACK_DAYS).max(0);
        let messages = self.source.fetch_channel_messages(channel_name, days).await?;
        info!(
            "Summarizing {} messages from #{} over {} days",
            messages.len(),
            channel_name,
            days
        );

        let prompt = build_channel_prompt(&messages, channel_name, custom_prompt);
        self.completion.complete(&prompt).await
    }

    /// Summarizes a thread given its link or `<channelId>:<ts>` identifier.
    ///
    /// # Errors
    ///
    /// `InvalidReferenceKind`, `ThreadFetchFailure`, `AuthFailure` or `CompletionFailure`.
    pub async fn summarize_thread(
        &self,
        thread_ref: &str,
        custom_prompt: Option<&str>,
    ) -> Result<String, DigestError> {
        let messages = self.source.fetch_thread_by_link(thread_ref).await?;
        info!("Summarizing thread with {} messages", messages.len());

        let prompt = build_thread_prompt(&messages, custom_prompt);
        self.completion.complete(&prompt).await
    }
}

#[async_trait]
impl<M: MessageSource, C: Complete> Summarize for Summarizer<M, C> {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, DigestError> {
        let custom = request.custom_prompt.as_deref();
        match request.kind {
            TargetKind::Channel => {
                self.summarize_channel(&request.target, request.lookback_days, custom)
                    .await
            }
            TargetKind::Thread => self.summarize_thread(&request.target, custom).await,
        }
    }
}
