//! slack-digest - summarize a Slack channel's recent activity or a single thread with ChatGPT.
//!
//! The crate is organised around one pipeline: collect messages from Slack,
//! turn them into a prompt, ask the completion model for a digest, and hand
//! the result to a presentation host.
//!
//! # Architecture
//!
//! - [`slack`] reads channels, history and threads through slack-morphism
//! - [`ai`] builds prompts and calls the chat completions endpoint
//! - [`features`] composes the two into channel and thread summaries
//! - [`lifecycle`] tracks the loading/success/failure cycle of a request and
//!   caches the channel list
//! - [`commands`] and [`views`] make up the terminal front end
//!
//! # Example
//!
//! ```no_run
//! use slack_digest::ai::LlmClient;
//! use slack_digest::core::config::AppConfig;
//! use slack_digest::features::Summarizer;
//! use slack_digest::slack::SlackClient;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     slack_digest::setup_logging();
//!
//!     let config = AppConfig::load(None)?;
//!     let summarizer = Summarizer::new(
//!         SlackClient::new(config.slack_token.clone()),
//!         LlmClient::from_config(&config)?,
//!     );
//!
//!     let digest = summarizer.summarize_channel("general", Some(7), None).await?;
//!     println!("{digest}");
//!     Ok(())
//! }
//! ```

pub mod ai;
pub mod commands;
pub mod core;
pub mod errors;
pub mod features;
pub mod lifecycle;
pub mod slack;
pub mod utils;
pub mod views;

pub use ai::estimate_tokens;
pub use errors::{DigestError, ErrorKind};

/// Install a stderr `tracing` subscriber filtered by `SLACK_DIGEST_LOG` (default `warn`).
///
/// Safe to call more than once; later calls leave the first subscriber in place.
///
/// # Example
///
/// ```
/// slack_digest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_env("SLACK_DIGEST_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
