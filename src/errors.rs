use slack_morphism::errors::SlackClientError;
use thiserror::Error;

/// Slack API error codes that mean the token itself is unusable.
const SLACK_AUTH_ERROR_CODES: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "token_revoked",
    "token_expired",
    "account_inactive",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("No such channel: {0}")]
    NoSuchChannel(String),

    #[error("Not a Slack thread link or identifier: {0}")]
    InvalidReferenceKind(String),

    #[error("Failed to fetch channel messages: {0}")]
    ChannelFetchFailure(String),

    #[error("Failed to fetch thread messages: {0}")]
    ThreadFetchFailure(String),

    #[error("Failed to generate completion: {0}")]
    CompletionFailure(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Clipboard unavailable: {0}")]
    ClipboardError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

/// Copyable discriminant of [`DigestError`], kept alongside failed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AuthFailure,
    NoSuchChannel,
    InvalidReferenceKind,
    ChannelFetchFailure,
    ThreadFetchFailure,
    CompletionFailure,
    Config,
    Clipboard,
    Io,
}

impl DigestError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DigestError::AuthFailure(_) => ErrorKind::AuthFailure,
            DigestError::NoSuchChannel(_) => ErrorKind::NoSuchChannel,
            DigestError::InvalidReferenceKind(_) => ErrorKind::InvalidReferenceKind,
            DigestError::ChannelFetchFailure(_) => ErrorKind::ChannelFetchFailure,
            DigestError::ThreadFetchFailure(_) => ErrorKind::ThreadFetchFailure,
            DigestError::CompletionFailure(_) => ErrorKind::CompletionFailure,
            DigestError::ConfigError(_) => ErrorKind::Config,
            DigestError::ClipboardError(_) => ErrorKind::Clipboard,
            DigestError::IoError(_) => ErrorKind::Io,
        }
    }

    /// Classify a Slack client error: token problems become `AuthFailure`,
    /// everything else is wrapped by `fallback` (channel or thread fetch failure).
    pub fn from_slack(error: &SlackClientError, fallback: fn(String) -> DigestError) -> Self {
        if let SlackClientError::ApiError(api_error) = error
            && SLACK_AUTH_ERROR_CODES.contains(&api_error.code.as_str())
        {
            return DigestError::AuthFailure(format!("Slack rejected the token ({})", api_error.code));
        }
        fallback(error.to_string())
    }
}

impl From<reqwest::Error> for DigestError {
    fn from(error: reqwest::Error) -> Self {
        DigestError::CompletionFailure(error.to_string())
    }
}

impl From<std::io::Error> for DigestError {
    fn from(error: std::io::Error) -> Self {
        DigestError::IoError(error.to_string())
    }
}

impl From<toml::de::Error> for DigestError {
    fn from(error: toml::de::Error) -> Self {
        DigestError::ConfigError(error.to_string())
    }
}
