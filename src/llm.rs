//! Free-form question answering
//!
//! Questions that match no local command go to the app's LLM function
//! together with the current recipe context.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::RecipeContext;
use crate::{Error, Result};

/// Question sent to the LLM service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmRequest {
    /// Command text with the wake word stripped
    pub text: String,
    /// Recipe state, `null` when no recipe is open
    pub recipe_context: Option<RecipeContext>,
}

/// Answer from the LLM service
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub success: bool,
    pub response: Option<String>,
    pub video_url: Option<String>,
    pub error: Option<String>,
}

impl LlmResponse {
    /// Successful answer
    #[must_use]
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            success: true,
            response: Some(text.into()),
            ..Self::default()
        }
    }

    /// Failure reported by the service
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Attach a video link
    #[must_use]
    pub fn with_video(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    /// Answer text, present only on success with a non-blank response
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.response
            .as_deref()
            .filter(|text| self.success && !text.trim().is_empty())
    }
}

/// LLM query service
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Ask a question
    async fn query(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Callable-function request body
#[derive(Serialize)]
struct CallableRequest<'a> {
    data: &'a LlmRequest,
}

/// Accepted response bodies
#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Callable { result: LlmResponse },
    Bare(LlmResponse),
}

/// Parse an LLM service response body
///
/// # Errors
///
/// Returns error if the body is neither a bare response nor a callable envelope
pub fn parse_response(body: &str) -> Result<LlmResponse> {
    let parsed: ResponseBody = serde_json::from_str(body)?;
    Ok(match parsed {
        ResponseBody::Callable { result } => result,
        ResponseBody::Bare(response) => response,
    })
}

/// Client for the app's HTTP callable function
#[derive(Debug, Clone)]
pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpLlmClient {
    /// Create a client for `endpoint`
    ///
    /// # Errors
    ///
    /// Returns error if the endpoint is empty or the HTTP client cannot be built
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        if endpoint.trim().is_empty() {
            return Err(Error::Config("LLM endpoint required".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Configured endpoint
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn query(&self, request: &LlmRequest) -> Result<LlmResponse> {
        tracing::debug!(
            text = %request.text,
            has_recipe = request.recipe_context.is_some(),
            "sending LLM query"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&CallableRequest { data: request })
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "LLM request failed");
                e
            })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "LLM service error");
            return Err(Error::Llm(format!("LLM service error {status}: {body}")));
        }

        let parsed = parse_response(&body)?;
        tracing::info!(success = parsed.success, has_video = parsed.video_url.is_some(), "LLM answered");
        Ok(parsed)
    }
}

/// Client used when no endpoint is configured
///
/// Every query fails, so the assistant answers with its apology.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineLlmClient;

#[async_trait]
impl LlmClient for OfflineLlmClient {
    async fn query(&self, _request: &LlmRequest) -> Result<LlmResponse> {
        Err(Error::Llm("no LLM endpoint configured".to_string()))
    }
}
