//! Data models for the Orchestrate REST API
//!
//! These structures match the wire format of the Orchestrate platform. Fields
//! this layer does not interpret are preserved in flattened `extra` maps so
//! they survive round-trips into tool output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identity Types
// ============================================================================

/// Remote agent identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        AgentId(s)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        AgentId(s.to_string())
    }
}

/// Conversation thread identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub String);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        ThreadId(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        ThreadId(s.to_string())
    }
}

/// Run identifier returned by agent invocations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RunId {
    fn from(s: String) -> Self {
        RunId(s)
    }
}

// ============================================================================
// Agent Models
// ============================================================================

/// The three agent families the platform exposes
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Agents built on the platform itself
    Native,
    /// Agents registered from outside the platform
    External,
    /// Assistant-style agents
    Assistant,
}

impl AgentKind {
    /// All kinds in the search order used when no kind is specified
    pub const ALL: [AgentKind; 3] = [AgentKind::Native, AgentKind::External, AgentKind::Assistant];

    /// REST collection path for this kind
    pub fn endpoint(&self) -> &'static str {
        match self {
            AgentKind::Native => "/agents",
            AgentKind::External => "/external-agents",
            AgentKind::Assistant => "/assistants",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKind::Native => write!(f, "native"),
            AgentKind::External => write!(f, "external"),
            AgentKind::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" => Ok(AgentKind::Native),
            "external" => Ok(AgentKind::External),
            "assistant" => Ok(AgentKind::Assistant),
            other => Err(format!("unknown agent kind: {}", other)),
        }
    }
}

/// A remote agent as returned by the platform directory endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Agent id
    pub id: AgentId,
    /// Agent name
    pub name: String,
    /// Agent description
    #[serde(default)]
    pub description: Option<String>,
    /// Lifecycle status reported by the platform
    #[serde(default)]
    pub status: Option<String>,
    /// Creation timestamp, verbatim
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last-update timestamp, verbatim
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Fields this layer does not model, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ============================================================================
// Thread & Message Models
// ============================================================================

/// Message content is either a plain string or a list of typed parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain string content
    Text(String),
    /// Structured content parts
    Parts(Vec<ContentPart>),
    /// Any other shape, kept verbatim
    Other(serde_json::Value),
}

impl MessageContent {
    /// Extract the human-readable text: the string itself, the first part
    /// with `response_type == "text"`, or a JSON rendering as a last resort.
    pub fn text(&self) -> String {
        match self {
            MessageContent::Text(s) => s.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .find(|p| p.response_type == "text")
                .and_then(|p| p.text.clone())
                .unwrap_or_else(|| {
                    serde_json::to_string(parts).unwrap_or_default()
                }),
            MessageContent::Other(value) => value.to_string(),
        }
    }
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

/// One element of a structured message content list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    /// Part type; "text" parts carry the reply text
    pub response_type: String,
    /// Text payload of a text part
    #[serde(default)]
    pub text: Option<String>,
    /// Fields of part types this layer does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single message in a conversation thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Message role: "user" or "assistant"
    pub role: String,
    /// Message content in any of the wire shapes
    #[serde(default)]
    pub content: MessageContent,
    /// Timestamp, verbatim
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl ThreadMessage {
    /// Whether this message was produced by the assistant
    pub fn is_assistant(&self) -> bool {
        self.role == "assistant"
    }
}

/// A `role: text` pair flattened out of the wire-format content shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Message role
    pub role: String,
    /// Extracted text content
    pub content: String,
}

// ============================================================================
// Run Models
// ============================================================================

/// Request body for `POST /runs`
#[derive(Debug, Clone, Serialize)]
pub struct RunRequest {
    /// The user message to deliver
    pub message: RunMessage,
    /// Agent to invoke
    pub agent_id: AgentId,
    /// Existing thread to continue, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ThreadId>,
}

/// The user message carried by a run request
#[derive(Debug, Clone, Serialize)]
pub struct RunMessage {
    /// Always "user"
    pub role: String,
    /// Message text
    pub content: String,
}

/// Response body of `POST /runs`
#[derive(Debug, Clone, Deserialize)]
pub struct RunResponse {
    /// Thread the run was placed on
    #[serde(default)]
    pub thread_id: Option<ThreadId>,
    /// Id of the started run
    #[serde(default)]
    pub run_id: Option<RunId>,
    /// Fields this layer does not model, preserved verbatim
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The assembled result of invoking an agent, including the conversation
/// fetched by the completion-polling loop when one became available.
#[derive(Debug, Clone, Serialize)]
pub struct Invocation {
    /// The invoked agent
    pub agent_id: AgentId,
    /// Thread the reply materializes in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ThreadId>,
    /// Raw platform response to the run request
    pub response: serde_json::Value,
    /// Thread messages fetched after completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ThreadMessage>>,
    /// Flattened `role: text` view of the messages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<Vec<ConversationTurn>>,
}
