use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use symptomix_application::MarkupRenderer;
use symptomix_core::ExchangeState;

use crate::OutputFormat;
use crate::bootstrap::AppContext;
use crate::terminal::format_entry;

/// Sends one message, prints the resulting transcript and exits.
///
/// Exits non-zero when the exchange ends with the error notice.
pub async fn run(context: AppContext, message: &str, format: OutputFormat) -> Result<ExitCode> {
    let controller = context.controller();

    let Some(report) = controller.submit_and_wait(message).await? else {
        anyhow::bail!("Nothing to send: the message is empty");
    };

    let transcript = controller.transcript().await;
    match format {
        OutputFormat::Text => {
            for entry in transcript.entries() {
                println!("{}", format_entry(entry));
            }
        }
        OutputFormat::Html => {
            let renderer = MarkupRenderer::new()?;
            println!("{}", renderer.render_transcript(&transcript, controller.layout().await)?);
        }
    }

    if report.state == ExchangeState::ErrorRendered {
        if let Some(err) = report.error {
            eprintln!("{}", format!("error: {err}").bright_black());
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
