use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

use slack_digest::commands::{ChannelArgs, Session, ThreadArgs};
use slack_digest::core::config::AppConfig;
use slack_digest::lifecycle::RequestState;

#[derive(Parser)]
#[command(name = "slack-digest")]
#[command(version)]
#[command(about = "Summarize a Slack channel or thread with ChatGPT", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the result once and exit instead of offering follow-up actions
    #[arg(long, global = true)]
    no_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize recent activity in a channel
    #[clap(visible_alias = "c")]
    Channel {
        /// Channel name (with or without #) or ID; pick from a list when omitted
        channel: Option<String>,
        /// Days to look back
        #[arg(short, long, default_value = "7", allow_hyphen_values = true)]
        days: String,
        /// Instruction replacing the default summary prompt
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// Summarize a thread from its link
    #[clap(visible_alias = "t")]
    Thread {
        /// Thread (or message) URL, or <channelId>:<ts>; read from the clipboard when omitted
        thread: Option<String>,
        /// Instruction replacing the default summary prompt
        #[arg(short, long)]
        prompt: Option<String>,
    },
    /// List channels visible to the Slack token
    Channels {
        /// Ignore the cached listing
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    slack_digest::setup_logging();

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

/// Returns whether the command ended in success.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let session = Session::new(config).context("Failed to initialize clients")?;
    let interactive = !cli.no_interactive && std::io::stdin().is_terminal();

    let state = match cli.command {
        Commands::Channel {
            channel,
            days,
            prompt,
        } => {
            session
                .summarize_channel(ChannelArgs {
                    channel,
                    days: Some(days),
                    prompt,
                    interactive,
                })
                .await?
        }
        Commands::Thread { thread, prompt } => {
            session
                .summarize_thread(ThreadArgs {
                    thread,
                    prompt,
                    interactive,
                })
                .await?
        }
        Commands::Channels { refresh } => {
            let channels = session
                .list_channels(refresh)
                .await
                .context("Failed to list channels")?;
            for channel in channels {
                println!("#{}\t{}", channel.name, channel.id);
            }
            return Ok(true);
        }
    };

    Ok(!matches!(state, RequestState::Failure { .. }))
}
