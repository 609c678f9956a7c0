use anyhow::Result;
use colored::Colorize;

use crate::bootstrap::AppContext;

pub async fn run(context: AppContext) -> Result<()> {
    // A generated id has no history on the backend.
    if context.config.session_id.is_none() {
        anyhow::bail!(
            "No session to reset. Pass --session-id or set SYMPTOMIX_SESSION_ID / session_id in the config file."
        );
    }

    context.backend.reset(&context.session.id).await?;
    println!(
        "{}",
        format!("✅ Conversation history cleared for session {}", context.session.id).green()
    );
    Ok(())
}
