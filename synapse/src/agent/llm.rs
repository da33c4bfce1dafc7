//! OpenAI-compatible chat-completions client
//!
//! The agent delegates reasoning and tool selection to a remote LLM speaking
//! the chat-completions function-calling protocol. The `ChatApi` trait is the
//! seam: production uses the HTTP client below, tests script completions.

use super::AgentError;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the LLM backend
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// API key sent as a bearer token
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Maximum tool-loop turns before the agent gives up
    pub max_turns: usize,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_turns: 8,
            request_timeout_secs: 120,
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// One message in a chat-completions conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role: system, user, assistant, or tool
    pub role: String,
    /// Text content; absent on pure tool-call turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool calls requested by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// For tool-role messages, the id of the call being answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// A system-role message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// A user-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// A tool-role result message answering one tool call
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id, echoed back in the tool-role result
    pub id: String,
    /// Always "function"
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    /// The function to invoke
    pub function: FunctionCall,
}

/// The function half of a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Tool name
    pub name: String,
    /// JSON-encoded argument object
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

/// A callable tool advertised to the model
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    /// Always "function"
    #[serde(rename = "type")]
    pub spec_type: String,
    /// The advertised function
    pub function: FunctionSpec,
}

/// Name, description, and parameter schema of one tool
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    /// Tool name
    pub name: String,
    /// What the tool does, shown to the model
    pub description: String,
    /// JSON-schema of the argument object
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    /// Build a function-type tool spec
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            spec_type: "function".to_string(),
            function: FunctionSpec {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

/// Request body for `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// Conversation history including tool results
    pub messages: Vec<ChatMessage>,
    /// Tools the model may call
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolSpec>,
}

/// Response body of `POST /chat/completions`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    /// Completion choices; only the first is used
    pub choices: Vec<ChatChoice>,
}

/// One completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The completed message
    pub message: ChatMessage,
}

impl ChatCompletion {
    /// Take the first choice's message
    pub fn into_message(self) -> Option<ChatMessage> {
        self.choices.into_iter().next().map(|choice| choice.message)
    }
}

// ============================================================================
// ChatApi
// ============================================================================

/// The LLM backend seam
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Produce one completion for the given request
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, AgentError>;
}

/// HTTP implementation of `ChatApi`
pub struct HttpChatClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
}

impl HttpChatClient {
    /// Create a client for the configured chat endpoint
    pub fn new(config: &LlmConfig) -> Result<Self, AgentError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AgentError::Llm(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ChatApi for HttpChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, AgentError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} (model {})", url, request.model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Llm(format!(
                "chat endpoint returned HTTP {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("invalid chat response: {}", e)))
    }
}
