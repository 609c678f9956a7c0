use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use symptomix_application::{ChatExchangeController, Submission, drive_surface};
use tokio::task::JoinHandle;

use crate::bootstrap::AppContext;
use crate::repl::{CliHelper, HELP_COMMAND, ReplInput, print_help};
use crate::terminal::TerminalSurface;

/// How long to wait for cancelled exchanges to print on exit.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

fn spawn_surface(controller: &ChatExchangeController) -> JoinHandle<()> {
    let events = controller.subscribe();
    tokio::spawn(async move {
        drive_surface(events, TerminalSurface::new(std::io::stdout())).await;
    })
}

/// Interactive chat loop.
///
/// Messages are submitted without waiting, so the prompt comes back while a
/// reply is outstanding. Replies are printed by the surface task as they land.
pub async fn run(context: AppContext) -> Result<()> {
    let mut controller = context.controller();
    let mut surface = spawn_surface(&controller);

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Symptomix ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Describe your symptoms. Type '{HELP_COMMAND}' for commands or 'quit' to exit.")
            .bright_black()
    );
    println!();

    let outcome = loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("{}", "Type 'quit' or press Ctrl-D to exit.".bright_black());
                continue;
            }
            Err(ReadlineError::Eof) => break Ok(()),
            Err(err) => break Err(err.into()),
        };

        match ReplInput::parse(&line) {
            ReplInput::Empty => {}
            ReplInput::Quit => {
                println!("{}", "Goodbye!".bright_green());
                break Ok(());
            }
            ReplInput::Help => print_help(),
            ReplInput::Session => {
                println!(
                    "{}",
                    format!(
                        "session {} (started {}), {} waiting, policy {}",
                        controller.session().id,
                        controller.session().started_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        controller.in_flight(),
                        controller.options().policy
                    )
                    .bright_black()
                );
            }
            ReplInput::Reset => match controller.restart().await {
                Ok(next) => {
                    controller = next;
                    surface = spawn_surface(&controller);
                    println!("{}", "Started a new conversation.".bright_green());
                }
                Err(err) => {
                    tracing::error!(error = %err, "reset failed");
                    eprintln!("{}", format!("Could not reset the conversation: {err}").red());
                }
            },
            ReplInput::UnknownCommand(command) => {
                println!("{}", format!("Unknown command {command}").bright_black());
            }
            ReplInput::Message(text) => {
                let _ = rl.add_history_entry(line.as_str());
                match controller.submit(&text).await {
                    Submission::Rejected { in_flight } => println!(
                        "{}",
                        format!("Still waiting on {in_flight} reply. Try again in a moment.")
                            .yellow()
                    ),
                    Submission::Closed => {
                        eprintln!("{}", "This conversation is closed. Type /reset to start over.".red());
                    }
                    Submission::Ignored | Submission::Started(_) => {}
                }
            }
        }
    };

    controller.shutdown();
    drop(controller);
    // The surface stops once the last exchange has printed its final entry.
    if tokio::time::timeout(DRAIN_TIMEOUT, surface).await.is_err() {
        tracing::warn!("transcript surface did not drain before exit");
    }

    outcome
}
