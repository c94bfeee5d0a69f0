use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::models::TargetKind;
use crate::ai::prompt_builder::validate_custom_prompt;
use crate::errors::DigestError;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Raw contents of `config.toml`. Every key is optional; the environment fills gaps.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub slack_token: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_org_id: Option<String>,
    pub openai_model: Option<String>,
    pub openai_base_url: Option<String>,
    pub prompt: Option<String>,
    pub channel_prompt: Option<String>,
    pub thread_prompt: Option<String>,
}

impl FileConfig {
    /// Reads a TOML config file. A missing file is an empty config.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self, DigestError> {
        if !path.exists() {
            debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .map_err(|e| DigestError::ConfigError(format!("{}: {e}", path.display())))?;
        Ok(toml::from_str(&raw)?)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PromptOverrides {
    pub shared: Option<String>,
    pub channel: Option<String>,
    pub thread: Option<String>,
}

impl PromptOverrides {
    /// Kind-specific override first, then the shared one.
    #[must_use]
    pub fn for_kind(&self, kind: TargetKind) -> Option<&str> {
        let specific = match kind {
            TargetKind::Channel => self.channel.as_deref(),
            TargetKind::Thread => self.thread.as_deref(),
        };
        specific.or(self.shared.as_deref())
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub slack_token: String,
    pub openai_api_key: String,
    pub openai_org_id: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub prompts: PromptOverrides,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("slack_token", &"[REDACTED]")
            .field("openai_api_key", &"[REDACTED]")
            .field("openai_org_id", &self.openai_org_id)
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("prompts", &self.prompts)
            .finish()
    }
}

impl AppConfig {
    /// Loads the config file (explicit path, `SLACK_DIGEST_CONFIG`, or the default
    /// location) and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unreadable files or invalid prompts, and
    /// `AuthFailure` when a required credential is missing.
    pub fn load(path: Option<&Path>) -> Result<Self, DigestError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env::var("SLACK_DIGEST_CONFIG").ok().map(PathBuf::from))
            .or_else(default_config_path);

        let file = match path {
            Some(p) => FileConfig::read(&p)?,
            None => FileConfig::default(),
        };

        Self::from_sources(file, |key| env::var(key).ok())
    }

    /// Merges a parsed file with an environment lookup; the environment wins.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn from_sources<F>(file: FileConfig, env_lookup: F) -> Result<Self, DigestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env_lookup(key).filter(|v| !v.trim().is_empty());

        let slack_token = lookup("SLACK_TOKEN")
            .or_else(|| lookup("SLACK_BOT_TOKEN"))
            .or(file.slack_token)
            .ok_or_else(|| DigestError::AuthFailure("SLACK_TOKEN is not set".to_string()))?;

        let openai_api_key = lookup("OPENAI_API_KEY")
            .or(file.openai_api_key)
            .ok_or_else(|| DigestError::AuthFailure("OPENAI_API_KEY is not set".to_string()))?;

        let prompts = PromptOverrides {
            shared: checked_prompt(lookup("SLACK_DIGEST_PROMPT").or(file.prompt))?,
            channel: checked_prompt(file.channel_prompt)?,
            thread: checked_prompt(file.thread_prompt)?,
        };

        Ok(Self {
            slack_token,
            openai_api_key,
            openai_org_id: lookup("OPENAI_ORG_ID").or(file.openai_org_id),
            openai_model: lookup("OPENAI_MODEL")
                .or(file.openai_model)
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: lookup("OPENAI_BASE_URL")
                .or(file.openai_base_url)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            prompts,
        })
    }
}

fn checked_prompt(prompt: Option<String>) -> Result<Option<String>, DigestError> {
    match prompt {
        Some(p) if !p.trim().is_empty() => {
            validate_custom_prompt(&p)?;
            Ok(Some(p))
        }
        _ => Ok(None),
    }
}

#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("slack-digest").join("config.toml"))
}
