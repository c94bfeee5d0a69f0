//! Slack API client module
//!
//! Read-only access to channels, channel history and thread replies.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use slack_morphism::errors::SlackClientError;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::MessageSource;
use crate::core::models::{Channel, Message, ThreadReference};
use crate::errors::DigestError;
use crate::lifecycle::ChannelCache;
use crate::utils::filters::filter_content_messages;

// Build the Slack client connector without panicking.
// If connector construction fails, store None and surface an error at call sites.
static SLACK_CLIENT: std::sync::LazyLock<Option<SlackHyperClient>> =
    std::sync::LazyLock::new(|| match SlackClientHyperConnector::new() {
        Ok(connector) => Some(SlackHyperClient::new(connector)),
        Err(e) => {
            warn!("Failed to create Slack HTTP connector: {}", e);
            None
        }
    });

const PAGE_LIMIT: u16 = 1000;
const MAX_PAGES: usize = 20;

/// Slack API client
pub struct SlackClient {
    token: SlackApiToken,
    channels: Arc<ChannelCache>,
}

impl SlackClient {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self::with_channel_cache(token, Arc::new(ChannelCache::in_memory()))
    }

    /// Name lookups go through `channels`, shared with whoever else lists channels.
    #[must_use]
    pub fn with_channel_cache(token: String, channels: Arc<ChannelCache>) -> Self {
        Self {
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
            channels,
        }
    }

    fn connector(fallback: fn(String) -> DigestError) -> Result<&'static SlackHyperClient, DigestError> {
        SLACK_CLIENT
            .as_ref()
            .ok_or_else(|| fallback("Slack HTTP connector not initialized".to_string()))
    }

    /// Resolves a channel name (with or without `#`) or ID to its ID via the shared cache.
    async fn resolve_channel_id(&self, channel_name: &str) -> Result<String, DigestError> {
        let channel = self.channels.resolve(self, channel_name).await?;
        Ok(channel.id)
    }

    async fn channel_history(
        &self,
        channel_id: &str,
        oldest: &SlackTs,
    ) -> Result<Vec<SlackHistoryMessage>, DigestError> {
        let session = Self::connector(DigestError::ChannelFetchFailure)?.open_session(&self.token);
        let mut messages = Vec::new();
        let mut cursor: Option<SlackCursorId> = None;

        for _ in 0..MAX_PAGES {
            let mut request = SlackApiConversationsHistoryRequest::new()
                .with_channel(SlackChannelId(channel_id.to_string()))
                .with_oldest(oldest.clone())
                .with_limit(PAGE_LIMIT);
            if let Some(c) = cursor.take() {
                request = request.with_cursor(c);
            }

            let result = session
                .conversations_history(&request)
                .await
                .map_err(|e| slack_error(&e, DigestError::ChannelFetchFailure))?;

            messages.extend(result.messages);
            cursor = next_cursor(result.response_metadata.as_ref());
            if cursor.is_none() {
                break;
            }
        }

        Ok(messages)
    }

    async fn thread_replies(
        &self,
        reference: &ThreadReference,
    ) -> Result<Vec<SlackHistoryMessage>, DigestError> {
        let session = Self::connector(DigestError::ThreadFetchFailure)?.open_session(&self.token);
        let mut messages = Vec::new();
        let mut cursor: Option<SlackCursorId> = None;

        for _ in 0..MAX_PAGES {
            let mut request = SlackApiConversationsRepliesRequest::new(
                SlackChannelId(reference.channel_id.clone()),
                SlackTs(reference.ts.clone()),
            )
            .with_limit(PAGE_LIMIT);
            if let Some(c) = cursor.take() {
                request = request.with_cursor(c);
            }

            let result = session
                .conversations_replies(&request)
                .await
                .map_err(|e| slack_error(&e, DigestError::ThreadFetchFailure))?;

            messages.extend(result.messages);
            cursor = next_cursor(result.response_metadata.as_ref());
            if cursor.is_none() {
                break;
            }
        }

        Ok(messages)
    }

    /// Returns the user's real name, then display name, falling back to the raw ID.
    pub async fn get_user_info(&self, user_id: &str) -> String {
        let Some(client) = SLACK_CLIENT.as_ref() else {
            return user_id.to_string();
        };
        let session = client.open_session(&self.token);
        let user_info_req = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        match session.users_info(&user_info_req).await {
            Ok(info) => info
                .user
                .profile
                .as_ref()
                .and_then(|p| p.real_name.clone())
                .filter(|n| !n.is_empty())
                .or_else(|| {
                    info.user
                        .profile
                        .as_ref()
                        .and_then(|p| p.display_name.clone())
                        .filter(|n| !n.is_empty())
                })
                .unwrap_or_else(|| user_id.to_string()),
            Err(e) => {
                warn!("Failed to fetch user info for {}: {:?}", user_id, e);
                user_id.to_string()
            }
        }
    }

    /// Filters noise, resolves author names and orders messages oldest first.
    async fn to_messages(&self, raw: Vec<SlackHistoryMessage>) -> Vec<Message> {
        let content = filter_content_messages(raw);
        let mut names: HashMap<String, String> = HashMap::new();

        for msg in &content {
            let Some(user_id) = msg.sender.user.as_ref().map(|u| u.0.clone()) else {
                continue;
            };
            if !names.contains_key(&user_id) {
                let name = self.get_user_info(&user_id).await;
                names.insert(user_id, name);
            }
        }

        build_messages(content, &names)
    }
}

/// Converts history into [`Message`]s, oldest first. Noise is dropped; authors
/// missing from `names` keep their raw user ID.
#[must_use]
pub fn build_messages(
    raw: Vec<SlackHistoryMessage>,
    names: &HashMap<String, String>,
) -> Vec<Message> {
    let mut out: Vec<Message> = filter_content_messages(raw)
        .into_iter()
        .filter_map(|msg| {
            let user_id = msg.sender.user.as_ref()?.0.clone();
            let Some(timestamp) = parse_slack_ts(&msg.origin.ts.0) else {
                debug!("Skipping message with unparsable ts {}", msg.origin.ts.0);
                return None;
            };
            let author = names.get(&user_id).cloned().unwrap_or(user_id);
            Some(Message {
                author,
                text: msg.content.text.unwrap_or_default(),
                timestamp,
            })
        })
        .collect();

    out.sort_by_key(|m| m.timestamp);
    out
}

#[async_trait]
impl MessageSource for SlackClient {
    async fn list_channels(&self) -> Result<Vec<Channel>, DigestError> {
        let session = Self::connector(DigestError::ChannelFetchFailure)?.open_session(&self.token);
        let mut channels = Vec::new();
        let mut cursor: Option<SlackCursorId> = None;

        for _ in 0..MAX_PAGES {
            let mut request = SlackApiConversationsListRequest::new()
                .with_exclude_archived(true)
                .with_limit(PAGE_LIMIT);
            if let Some(c) = cursor.take() {
                request = request.with_cursor(c);
            }

            let result = session
                .conversations_list(&request)
                .await
                .map_err(|e| slack_error(&e, DigestError::ChannelFetchFailure))?;

            channels.extend(result.channels.into_iter().filter_map(|info| {
                info.name.map(|name| Channel {
                    id: info.id.0,
                    name,
                })
            }));
            cursor = next_cursor(result.response_metadata.as_ref());
            if cursor.is_none() {
                break;
            }
        }

        info!("Listed {} channels", channels.len());
        Ok(channels)
    }

    async fn fetch_channel_messages(
        &self,
        channel_name: &str,
        since_days: i64,
    ) -> Result<Vec<Message>, DigestError> {
        let channel_id = self.resolve_channel_id(channel_name).await?;
        let oldest = oldest_ts(Utc::now(), since_days);
        info!(
            "Fetching history for {} ({}) since {}",
            channel_name, channel_id, oldest.0
        );

        let raw = self.channel_history(&channel_id, &oldest).await?;
        let messages = self.to_messages(raw).await;
        info!("Collected {} messages from {}", messages.len(), channel_name);
        Ok(messages)
    }

    async fn fetch_thread(&self, reference: &ThreadReference) -> Result<Vec<Message>, DigestError> {
        info!("Fetching thread {}", reference);
        let raw = self.thread_replies(reference).await?;
        let messages = self.to_messages(raw).await;
        info!("Collected {} thread messages", messages.len());
        Ok(messages)
    }
}

fn slack_error(error: &SlackClientError, fallback: fn(String) -> DigestError) -> DigestError {
    DigestError::from_slack(error, fallback)
}

fn next_cursor(metadata: Option<&SlackResponseMetadata>) -> Option<SlackCursorId> {
    metadata
        .and_then(|m| m.next_cursor.clone())
        .filter(|c| !c.0.is_empty())
}

/// Finds a channel by ID or by case-insensitive name, ignoring a leading `#`.
#[must_use]
pub fn find_channel<'a>(channels: &'a [Channel], name_or_id: &str) -> Option<&'a Channel> {
    let wanted = name_or_id.trim().trim_start_matches('#');
    channels
        .iter()
        .find(|c| c.id == wanted)
        .or_else(|| channels.iter().find(|c| c.name.eq_ignore_ascii_case(wanted)))
}

/// Oldest timestamp of the lookback window; negative day counts clamp to zero.
/// Windows reaching past the representable range start at the Unix epoch.
#[must_use]
pub fn oldest_ts(now: DateTime<Utc>, since_days: i64) -> SlackTs {
    let oldest = Duration::try_days(since_days.max(0))
        .and_then(|window| now.checked_sub_signed(window))
        .map_or(0, |oldest| oldest.timestamp().max(0));
    SlackTs(format!("{oldest}.000000"))
}

/// Parses a Slack `ts` (`seconds.micros`) into a UTC instant.
#[must_use]
pub fn parse_slack_ts(ts: &str) -> Option<DateTime<Utc>> {
    let (secs, frac) = ts.split_once('.').unwrap_or((ts, "0"));
    let secs: i64 = secs.parse().ok()?;
    let micros: u32 = format!("{frac:0<6}").get(..6)?.parse().ok()?;
    Utc.timestamp_opt(secs, micros * 1000).single()
}
