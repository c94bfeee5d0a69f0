//! Channel and thread summary commands as driven from the terminal.

use dialoguer::{FuzzySelect, Input, Select};
use std::sync::Arc;
use tracing::{info, warn};

use crate::ai::LlmClient;
use crate::ai::prompt_builder::validate_custom_prompt;
use crate::core::config::{AppConfig, PromptOverrides};
use crate::core::models::{Channel, DEFAULT_LOOKBACK_DAYS, SummaryRequest, TargetKind};
use crate::errors::DigestError;
use crate::features::Summarizer;
use crate::features::deliver::{copy_summary, open_in_browser};
use crate::lifecycle::{ChannelCache, Notifier, RequestController, RequestState};
use crate::slack::SlackClient;
use crate::utils::clipboard::{ArboardClipboard, detect_thread_link};
use crate::views::TerminalNotifier;

type SlackSummarizer = Summarizer<SlackClient, LlmClient>;

#[derive(Debug, Clone, Default)]
pub struct ChannelArgs {
    pub channel: Option<String>,
    /// Raw lookback text as typed, e.g. `"7"`.
    pub days: Option<String>,
    pub prompt: Option<String>,
    pub interactive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ThreadArgs {
    pub thread: Option<String>,
    pub prompt: Option<String>,
    pub interactive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CopySummary,
    Regenerate,
    OpenInBrowser,
    Quit,
}

impl Action {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Action::CopySummary => "Copy Summary",
            Action::Regenerate => "Regenerate",
            Action::OpenInBrowser => "Open in Browser",
            Action::Quit => "Quit",
        }
    }
}

/// Actions offered after a result is shown. Copy and open need a digest.
#[must_use]
pub fn available_actions(kind: TargetKind, has_summary: bool) -> Vec<Action> {
    let mut actions = Vec::new();
    if has_summary {
        actions.push(Action::CopySummary);
    }
    actions.push(Action::Regenerate);
    if has_summary && kind == TargetKind::Thread {
        actions.push(Action::OpenInBrowser);
    }
    actions.push(Action::Quit);
    actions
}

/// Parses the lookback text. Blank means the default, negatives clamp to 0,
/// and anything unparsable falls back to the default.
#[must_use]
pub fn parse_lookback_days(text: Option<&str>) -> i64 {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => DEFAULT_LOOKBACK_DAYS,
        Some(raw) => match raw.parse::<i64>() {
            Ok(days) => days.max(0),
            Err(_) => {
                warn!("Ignoring invalid day count {:?}, using {}", raw, DEFAULT_LOOKBACK_DAYS);
                DEFAULT_LOOKBACK_DAYS
            }
        },
    }
}

/// Per-call prompt wins over configured overrides; blank values count as absent.
///
/// # Errors
///
/// Returns `ConfigError` if the explicit prompt is too long.
pub fn resolve_custom_prompt(
    explicit: Option<&str>,
    overrides: &PromptOverrides,
    kind: TargetKind,
) -> Result<Option<String>, DigestError> {
    if let Some(prompt) = explicit.filter(|p| !p.trim().is_empty()) {
        validate_custom_prompt(prompt)?;
        return Ok(Some(prompt.to_string()));
    }
    Ok(overrides.for_kind(kind).map(ToString::to_string))
}

/// One command invocation: shared clients, the channel cache and the presentation host.
pub struct Session {
    config: AppConfig,
    summarizer: Arc<SlackSummarizer>,
    cache: Arc<ChannelCache>,
    notifier: Arc<dyn Notifier>,
}

impl Session {
    /// # Errors
    ///
    /// Returns an error if the completion client cannot be built.
    pub fn new(config: AppConfig) -> Result<Self, DigestError> {
        let cache = Arc::new(
            ChannelCache::default_path().map_or_else(ChannelCache::in_memory, ChannelCache::persistent),
        );
        let source = SlackClient::with_channel_cache(config.slack_token.clone(), Arc::clone(&cache));
        let completion = LlmClient::from_config(&config)?;

        Ok(Self {
            config,
            summarizer: Arc::new(Summarizer::new(source, completion)),
            cache,
            notifier: Arc::new(TerminalNotifier),
        })
    }

    /// # Errors
    ///
    /// Returns `AuthFailure` or `ChannelFetchFailure` when the listing cannot be fetched.
    pub async fn list_channels(&self, refresh: bool) -> Result<Vec<Channel>, DigestError> {
        if refresh {
            self.cache.invalidate().await;
        }
        self.cache.channels(self.summarizer.source()).await
    }

    /// Runs the channel summary flow and returns the final request state.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid input or terminal failures; summarization
    /// errors are reported through the returned `Failure` state instead.
    pub async fn summarize_channel(&self, args: ChannelArgs) -> Result<RequestState, DigestError> {
        let channel = match args.channel.filter(|c| !c.trim().is_empty()) {
            Some(channel) => channel,
            None if args.interactive => self.pick_channel().await?,
            None => {
                return Err(DigestError::NoSuchChannel(
                    "no channel given".to_string(),
                ));
            }
        };

        let days = parse_lookback_days(args.days.as_deref());
        let custom = resolve_custom_prompt(
            args.prompt.as_deref(),
            &self.config.prompts,
            TargetKind::Channel,
        )?;

        let request = SummaryRequest::channel(&channel, Some(days), custom);
        self.run(request, args.interactive).await
    }

    /// Runs the thread summary flow. Without an explicit thread the clipboard
    /// is read once to pre-fill the input.
    ///
    /// # Errors
    ///
    /// See [`Session::summarize_channel`].
    pub async fn summarize_thread(&self, args: ThreadArgs) -> Result<RequestState, DigestError> {
        let thread = match args.thread.filter(|t| !t.trim().is_empty()) {
            Some(thread) => thread,
            None if args.interactive => prompt_thread_link()?,
            None => {
                return Err(DigestError::InvalidReferenceKind(
                    "no thread link given".to_string(),
                ));
            }
        };

        let custom = resolve_custom_prompt(
            args.prompt.as_deref(),
            &self.config.prompts,
            TargetKind::Thread,
        )?;

        let request = SummaryRequest::thread(&thread, custom);
        self.run(request, args.interactive).await
    }

    async fn run(&self, request: SummaryRequest, interactive: bool) -> Result<RequestState, DigestError> {
        let kind = request.kind;
        let title = request.display_target();
        let controller = RequestController::new(Arc::clone(&self.summarizer), Arc::clone(&self.notifier));

        let mut state = controller.submit_and_wait(request).await;
        if !interactive {
            return Ok(state);
        }

        loop {
            let summary = state.result().and_then(|r| r.text().map(ToString::to_string));
            let actions = available_actions(kind, summary.is_some());
            let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

            let choice = Select::new()
                .with_prompt("Action")
                .items(&labels)
                .default(0)
                .interact_opt()
                .map_err(|e| DigestError::IoError(e.to_string()))?;

            match choice.map(|i| actions[i]) {
                Some(Action::CopySummary) => {
                    if let Some(text) = &summary {
                        let copied = ArboardClipboard::new()
                            .and_then(|mut clipboard| copy_summary(&mut clipboard, text));
                        match copied {
                            Ok(()) => self.notifier.show_success("Copied", "Summary copied to clipboard."),
                            Err(e) => self.notifier.show_error("Couldn't copy summary", &e.to_string()),
                        }
                    }
                }
                Some(Action::Regenerate) => {
                    state = controller.regenerate_and_wait().await;
                }
                Some(Action::OpenInBrowser) => {
                    if let Some(text) = &summary {
                        match open_in_browser(&title, text) {
                            Ok(path) => info!("Summary page written to {}", path.display()),
                            Err(e) => self.notifier.show_error("Couldn't open browser", &e.to_string()),
                        }
                    }
                }
                Some(Action::Quit) | None => return Ok(state),
            }
        }
    }

    async fn pick_channel(&self) -> Result<String, DigestError> {
        let channels = self.list_channels(false).await?;
        if channels.is_empty() {
            return Err(DigestError::NoSuchChannel("no channels visible to this token".to_string()));
        }
        let names: Vec<String> = channels.iter().map(|c| format!("#{}", c.name)).collect();

        let picked = FuzzySelect::new()
            .with_prompt("Channel")
            .items(&names)
            .default(0)
            .interact_opt()
            .map_err(|e| DigestError::IoError(e.to_string()))?
            .ok_or_else(|| DigestError::NoSuchChannel("no channel selected".to_string()))?;

        Ok(channels[picked].name.clone())
    }
}

fn prompt_thread_link() -> Result<String, DigestError> {
    let prefill = match ArboardClipboard::new() {
        Ok(mut clipboard) => detect_thread_link(&mut clipboard),
        Err(e) => {
            warn!("Skipping clipboard detection: {}", e);
            None
        }
    };

    let mut input = Input::<String>::new().with_prompt("Thread (or Message) URL");
    if let Some(link) = prefill {
        input = input.with_initial_text(link);
    }
    input
        .interact_text()
        .map_err(|e| DigestError::IoError(e.to_string()))
}
