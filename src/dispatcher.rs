use crate::config::ApiConfig;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// One chat-completion call, built fresh for every submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub query_text: String,
    pub supports_temperature: bool,
}

impl ChatRequest {
    pub fn from_config(api: &ApiConfig, query: &str) -> Self {
        let model = api.model.trim().to_string();
        let supports_temperature = !api
            .temperature_excluded_models
            .iter()
            .any(|excluded| excluded.trim() == model);

        ChatRequest {
            endpoint: api.endpoint.trim().to_string(),
            api_key: api.api_key.trim().to_string(),
            model,
            query_text: query.to_string(),
            supports_temperature,
        }
    }
}

/// Terminal result of one request. Every failure is folded into `Failure`
/// so the UI has a single completion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Success(String),
    Failure(String),
}

impl ChatOutcome {
    pub fn text(&self) -> &str {
        match self {
            ChatOutcome::Success(text) | ChatOutcome::Failure(text) => text,
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("API key not configured")]
    MissingApiKey,
    #[error("Error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Error: {0}")]
    Transport(String),
    #[error("Error: unexpected response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// The HTTP seam. Implementations send one JSON POST with bearer auth and
/// report transport-level faults as errors; any HTTP status is a reply.
pub trait Transport: Send + Sync {
    fn post_json(
        &self,
        endpoint: &str,
        api_key: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> BoxFuture<'static, anyhow::Result<HttpReply>>;
}

#[derive(Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for ReqwestTransport {
    fn post_json(
        &self,
        endpoint: &str,
        api_key: &str,
        body: serde_json::Value,
        timeout: Duration,
    ) -> BoxFuture<'static, anyhow::Result<HttpReply>> {
        let request = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .timeout(timeout);

        Box::pin(async move {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpReply { status, body })
        })
    }
}

/// Turns a [`ChatRequest`] into exactly one [`ChatOutcome`]. A single attempt
/// is made; there are no retries.
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        RequestDispatcher { transport, timeout }
    }

    /// The returned future owns everything it needs and can run on any
    /// executor thread.
    pub fn dispatch(&self, request: ChatRequest) -> BoxFuture<'static, ChatOutcome> {
        let transport = self.transport.clone();
        let timeout = self.timeout;

        Box::pin(async move {
            match execute(transport.as_ref(), &request, timeout).await {
                Ok(content) => ChatOutcome::Success(content),
                Err(e) => {
                    tracing::warn!(model = %request.model, "chat request failed: {}", e);
                    ChatOutcome::Failure(e.to_string())
                }
            }
        })
    }
}

pub fn request_body(request: &ChatRequest) -> serde_json::Value {
    let body = CompletionRequest {
        model: &request.model,
        messages: vec![Message {
            role: "user",
            content: &request.query_text,
        }],
        temperature: request.supports_temperature.then_some(1.0),
    };
    serde_json::json!(body)
}

async fn execute(
    transport: &dyn Transport,
    request: &ChatRequest,
    timeout: Duration,
) -> Result<String, DispatchError> {
    if request.api_key.is_empty() {
        return Err(DispatchError::MissingApiKey);
    }

    tracing::debug!(
        endpoint = %request.endpoint,
        model = %request.model,
        "sending chat request"
    );

    let reply = transport
        .post_json(&request.endpoint, &request.api_key, request_body(request), timeout)
        .await
        .map_err(|e| DispatchError::Transport(format!("{:#}", e)))?;

    if reply.status != 200 {
        return Err(DispatchError::Status {
            status: reply.status,
            body: reply.body,
        });
    }

    let content = extract_content(&reply.body)?;
    tracing::debug!(
        "response received: {}...",
        content.chars().take(100).collect::<String>()
    );
    Ok(content)
}

fn extract_content(body: &str) -> Result<String, DispatchError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| DispatchError::UnexpectedResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| DispatchError::UnexpectedResponse("no choices in response".to_string()))
}
