//! HttpChatBackend - REST implementation of the chat backend contract.
//!
//! Talks to the Symptomix backend over two JSON endpoints:
//! `POST /get` for a reply and `POST /reset` to drop a session's history.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use symptomix_core::message::{ChatResponse, ErrorResponse, ResetRequest, ResetResponse};
use symptomix_core::{ChatBackend, ClientConfig, OutgoingMessage, Reply, Result, SessionId, SymptomixError};

const CHAT_PATH: &str = "/get";
const RESET_PATH: &str = "/reset";
const USER_AGENT: &str = concat!("symptomix/", env!("CARGO_PKG_VERSION"));

/// Backend implementation that talks to the Symptomix HTTP API.
#[derive(Clone)]
pub struct HttpChatBackend {
    client: Client,
    base_url: String,
}

impl HttpChatBackend {
    /// Creates a backend for `base_url` with a default client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a backend that reuses an existing client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Builds a backend from validated client configuration.
    ///
    /// Timeouts are applied by the exchange controller, not the HTTP client,
    /// so a hung request can be told apart from a refused one in the logs.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| SymptomixError::config(format!("failed to build HTTP client: {err}")))?;
        Ok(Self::with_client(client, config.base_url()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(%url, "sending request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| SymptomixError::transport(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        let body_text = response.text().await.map_err(|err| {
            SymptomixError::transport(format!("failed to read response from {url}: {err}"))
        })?;

        if !status.is_success() {
            return Err(map_http_error(status, &body_text));
        }

        serde_json::from_str(&body_text).map_err(|err| {
            SymptomixError::malformed(format!("unexpected response from {url}: {err}"))
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, message: &OutgoingMessage) -> Result<Reply> {
        let body: ChatResponse = self.post_json(CHAT_PATH, &message.to_request()).await?;
        Ok(body.into())
    }

    async fn reset(&self, session: &SessionId) -> Result<()> {
        let request = ResetRequest {
            chat_id: session.as_str().to_string(),
        };
        let body: ResetResponse = self.post_json(RESET_PATH, &request).await?;
        tracing::info!(session = %session, message = %body.message, "backend session reset");
        Ok(())
    }
}

fn map_http_error(status: StatusCode, body: &str) -> SymptomixError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_string()
            } else {
                body.to_string()
            }
        });
    SymptomixError::http(status.as_u16(), message)
}
