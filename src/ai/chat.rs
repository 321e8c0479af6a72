use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::provider::Provider;
use crate::error::{FetchError, FetchResult};

pub const SYSTEM_PROMPT: &str = "You are an assistant for a user browsing a GitHub repository. \
Questions usually concern the file the user has open, which is sent as code context.

- Explain what the file does and how its key parts fit together
- Point out bugs, edge cases and possible improvements when asked
- Keep answers focused on the code provided

Format replies as markdown. Use fenced code blocks for multi-line code.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// The open file, sent alongside the transcript
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeContext {
    pub code: String,
    pub language: String,
}

/// System prompt, then the transcript, then the code as a trailing user message.
pub fn build_messages(transcript: &[ChatMessage], context: Option<&CodeContext>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(ChatMessage::new(ChatRole::System, SYSTEM_PROMPT));
    messages.extend(transcript.iter().cloned());
    if let Some(ctx) = context {
        messages.push(ChatMessage::new(
            ChatRole::User,
            format!("This is the code:\n```{}\n{}\n```", ctx.language, ctx.code),
        ));
    }
    messages
}

/// Everything needed to make one completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// First choice's content; absent or empty replies are an error
fn extract_reply(body: &str) -> FetchResult<String> {
    let response: CompletionResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.is_empty())
        .ok_or(FetchError::EmptyReply)
}

pub trait ChatBackend: Send + Sync {
    fn complete(&self, request: &CompletionRequest) -> FetchResult<String>;
}

/// Any provider speaking the OpenAI-compatible chat completions protocol
pub struct OpenAiCompatClient {
    http: Client,
}

impl OpenAiCompatClient {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("rx/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;
        Ok(Self { http })
    }
}

impl ChatBackend for OpenAiCompatClient {
    fn complete(&self, request: &CompletionRequest) -> FetchResult<String> {
        let url = request.provider.completions_url();
        tracing::debug!(url = %url, model = %request.model, messages = request.messages.len(), "POST");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&request.api_key)
            .json(&CompletionBody {
                model: &request.model,
                messages: &request.messages,
            })
            .send()
            .map_err(|e| {
                tracing::warn!(url = %url, "chat request failed: {e}");
                FetchError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "chat provider error");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }
        extract_reply(&response.text()?)
    }
}
