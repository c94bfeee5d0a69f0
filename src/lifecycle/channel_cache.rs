use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::core::models::Channel;
use crate::errors::DigestError;
use crate::slack::MessageSource;
use crate::slack::client::find_channel;

pub const CHANNEL_CACHE_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedChannels {
    fetched_at: DateTime<Utc>,
    channels: Vec<Channel>,
}

/// Channel listing kept for 24 hours, optionally mirrored to a JSON file so
/// separate invocations share it.
pub struct ChannelCache {
    ttl: Duration,
    path: Option<PathBuf>,
    entry: Mutex<Option<CachedChannels>>,
}

impl ChannelCache {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            ttl: Duration::hours(CHANNEL_CACHE_TTL_HOURS),
            path: None,
            entry: Mutex::new(None),
        }
    }

    /// Opens a file-backed cache, loading any previous listing. Unreadable files are ignored.
    #[must_use]
    pub fn persistent(path: PathBuf) -> Self {
        let entry = load_entry(&path);
        Self {
            ttl: Duration::hours(CHANNEL_CACHE_TTL_HOURS),
            path: Some(path),
            entry: Mutex::new(entry),
        }
    }

    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("slack-digest").join("channels.json"))
    }

    pub async fn invalidate(&self) {
        *self.entry.lock().await = None;
    }

    /// Current listing, refetched when missing or older than the TTL.
    ///
    /// # Errors
    ///
    /// Propagates the source's listing error; a stale entry is not served on failure.
    pub async fn channels<M>(&self, source: &M) -> Result<Vec<Channel>, DigestError>
    where
        M: MessageSource + ?Sized,
    {
        self.get_or_fetch(source, Utc::now()).await
    }

    /// Resolves a channel name (with or without `#`) or ID against the cached listing.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchChannel` when nothing matches, otherwise the listing error.
    pub async fn resolve<M>(&self, source: &M, name_or_id: &str) -> Result<Channel, DigestError>
    where
        M: MessageSource + ?Sized,
    {
        let channels = self.channels(source).await?;
        find_channel(&channels, name_or_id).cloned().ok_or_else(|| {
            DigestError::NoSuchChannel(name_or_id.trim().trim_start_matches('#').to_string())
        })
    }

    /// As [`ChannelCache::channels`], with an explicit clock reading.
    ///
    /// # Errors
    ///
    /// See [`ChannelCache::channels`].
    pub async fn get_or_fetch<M>(
        &self,
        source: &M,
        now: DateTime<Utc>,
    ) -> Result<Vec<Channel>, DigestError>
    where
        M: MessageSource + ?Sized,
    {
        let mut entry = self.entry.lock().await;

        if let Some(cached) = entry.as_ref() {
            let age = now.signed_duration_since(cached.fetched_at);
            if age >= Duration::zero() && age < self.ttl {
                debug!("Using cached channel list ({} minutes old)", age.num_minutes());
                return Ok(cached.channels.clone());
            }
            info!("Channel list cache is stale, refetching");
        }

        let channels = source.list_channels().await?;
        let fresh = CachedChannels {
            fetched_at: now,
            channels: channels.clone(),
        };
        if let Some(path) = &self.path
            && let Err(e) = store_entry(path, &fresh)
        {
            warn!("Failed to persist channel cache to {}: {}", path.display(), e);
        }
        *entry = Some(fresh);

        Ok(channels)
    }
}

fn load_entry(path: &Path) -> Option<CachedChannels> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(entry) => Some(entry),
        Err(e) => {
            warn!("Ignoring unreadable channel cache {}: {}", path.display(), e);
            None
        }
    }
}

fn store_entry(path: &Path, entry: &CachedChannels) -> Result<(), DigestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(entry).map_err(|e| DigestError::IoError(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}
