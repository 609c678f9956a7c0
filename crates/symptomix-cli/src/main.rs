use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use symptomix_core::{ClientConfig, InFlightPolicy};
use symptomix_infrastructure::SymptomixPaths;

mod bootstrap;
mod commands;
mod logging;
mod repl;
mod terminal;

use bootstrap::AppContext;

#[derive(Parser)]
#[command(name = "symptomix")]
#[command(version, about = "Symptomix - chat with the Symptomix medical assistant", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides that apply to every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Session id sent as chat_id (generated when not set anywhere)
    #[arg(long, global = true, value_name = "ID")]
    pub session_id: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// What to do with a new message while a reply is outstanding
    #[arg(long, global = true, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Write logs to a daily rolling file in this directory
    #[arg(long, global = true, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Layers command-line values over the loaded configuration.
    pub fn apply(&self, config: &mut ClientConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(session_id) = &self.session_id {
            config.session_id = Some(session_id.clone());
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = Some(timeout);
        }
        if let Some(policy) = self.policy {
            config.in_flight_policy = policy.into();
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Let overlapping messages run side by side
    Concurrent,
    /// Refuse new messages until the reply arrives
    Reject,
}

impl From<PolicyArg> for InFlightPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Concurrent => InFlightPolicy::Concurrent,
            PolicyArg::Reject => InFlightPolicy::Reject,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal text
    #[default]
    Text,
    /// HTML transcript markup
    Html,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Interactive chat (default)
    Chat,
    /// Send a single message and print the transcript
    Ask {
        /// The message; multiple words are joined with spaces
        #[arg(required = true)]
        message: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Drop the backend-side history for the session
    Reset,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    // The REPL logs to a file by default so log lines do not land on the prompt.
    let log_dir = match command {
        Commands::Chat => cli
            .global
            .log_dir
            .clone()
            .or_else(|| SymptomixPaths::logs_dir().ok()),
        _ => cli.global.log_dir.clone(),
    };
    let _log_guard = logging::init(log_dir.as_deref());

    let context = AppContext::from_args(&cli.global)?;

    match command {
        Commands::Chat => {
            commands::chat::run(context).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ask { message, format } => {
            commands::ask::run(context, &message.join(" "), format).await
        }
        Commands::Reset => {
            commands::reset::run(context).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
