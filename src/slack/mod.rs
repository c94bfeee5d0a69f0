//! All Slack-specific functionality

pub mod client;
pub mod thread_ref;

use async_trait::async_trait;

use crate::core::models::{Channel, Message, ThreadReference};
use crate::errors::DigestError;

// Re-export main types for convenience
pub use client::SlackClient;
pub use thread_ref::{is_thread_link, parse_thread_reference};

/// Read access to the messaging platform.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Channels visible to the authenticated account, in platform order.
    ///
    /// # Errors
    ///
    /// Returns `AuthFailure` or `ChannelFetchFailure`.
    async fn list_channels(&self) -> Result<Vec<Channel>, DigestError>;

    /// Content messages posted within the last `since_days` days, oldest first.
    /// An empty window is `Ok(vec![])`.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchChannel` if the name does not resolve, otherwise
    /// `AuthFailure` or `ChannelFetchFailure`.
    async fn fetch_channel_messages(
        &self,
        channel_name: &str,
        since_days: i64,
    ) -> Result<Vec<Message>, DigestError>;

    /// The root message and all replies, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AuthFailure` or `ThreadFetchFailure`.
    async fn fetch_thread(&self, reference: &ThreadReference) -> Result<Vec<Message>, DigestError>;

    /// Parses a thread link or identifier, then fetches the thread.
    ///
    /// # Errors
    ///
    /// Returns `InvalidReferenceKind` for unrecognized input, otherwise as
    /// [`MessageSource::fetch_thread`].
    async fn fetch_thread_by_link(&self, thread_url_or_id: &str) -> Result<Vec<Message>, DigestError> {
        let reference = parse_thread_reference(thread_url_or_id)?;
        self.fetch_thread(&reference).await
    }
}
