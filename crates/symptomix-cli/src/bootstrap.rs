use std::sync::Arc;

use anyhow::{Context, Result};
use symptomix_application::{ChatExchangeController, ControllerOptions};
use symptomix_core::{ChatBackend, ClientConfig, SessionContext};
use symptomix_infrastructure::ConfigService;
use symptomix_interaction::HttpChatBackend;

use crate::GlobalArgs;

/// Everything a command needs, resolved once at startup.
pub struct AppContext {
    pub config: ClientConfig,
    pub session: SessionContext,
    pub backend: Arc<dyn ChatBackend>,
}

impl AppContext {
    /// Resolves configuration (file, environment, flags) and builds the backend.
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let service = match &args.config {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(),
        };

        let mut config = service.load().context("Failed to load configuration")?;
        args.apply(&mut config);
        config.validate().context("Invalid command-line override")?;

        let session = SessionContext::start(config.session_id.as_deref())?;
        let backend = HttpChatBackend::from_config(&config)?;

        tracing::info!(
            endpoint = %config.base_url(),
            session = %session.id,
            config_file = ?service.path(),
            "client configured"
        );

        Ok(Self {
            config,
            session,
            backend: Arc::new(backend),
        })
    }

    /// A controller for a new conversation.
    pub fn controller(&self) -> ChatExchangeController {
        ChatExchangeController::new(
            self.session.clone(),
            Arc::clone(&self.backend),
            ControllerOptions::from_config(&self.config),
        )
    }
}
