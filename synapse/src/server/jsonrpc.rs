//! JSON-RPC 2.0 envelope and A2A message types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The request body was not valid JSON
pub const PARSE_ERROR: i64 = -32700;
/// The request was not a valid JSON-RPC request object
pub const INVALID_REQUEST: i64 = -32600;
/// The requested method does not exist
pub const METHOD_NOT_FOUND: i64 = -32601;
/// The method parameters were invalid
pub const INVALID_PARAMS: i64 = -32602;
/// The method failed internally
pub const INTERNAL_ERROR: i64 = -32603;

/// An incoming JSON-RPC request
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, nominally "2.0"
    #[serde(default)]
    pub jsonrpc: String,
    /// Request id, echoed in the response
    #[serde(default)]
    pub id: serde_json::Value,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

/// An outgoing JSON-RPC response
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Id of the request being answered
    pub id: serde_json::Value,
    /// Result on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// A JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// One of the error codes above
    pub code: i64,
    /// Human-readable detail
    pub message: String,
}

impl JsonRpcResponse {
    /// Build a success response
    pub fn success(id: serde_json::Value, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Build an error response
    pub fn failure(id: serde_json::Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

// ============================================================================
// A2A Messages
// ============================================================================

/// Parameters of the `message/send` method
#[derive(Debug, Clone, Deserialize)]
pub struct MessageSendParams {
    /// The user message to answer
    pub message: A2aMessage,
}

/// An A2A message: a role plus a list of typed parts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2aMessage {
    /// Message role: "user" or "agent"
    pub role: String,
    /// Message parts
    pub parts: Vec<Part>,
    /// Unique id of this message
    pub message_id: String,
    /// Conversation context id, echoed into replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// One part of an A2A message; only `text` parts are interpreted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Part kind, e.g. "text"
    pub kind: String,
    /// Text payload of a `text` part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Fields of part kinds this layer does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl A2aMessage {
    /// Concatenate the text parts of the message
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build an agent-role reply carrying one text part
    pub fn agent_reply(text: impl Into<String>, context_id: Option<String>) -> Self {
        Self {
            role: "agent".to_string(),
            parts: vec![Part {
                kind: "text".to_string(),
                text: Some(text.into()),
                extra: serde_json::Map::new(),
            }],
            message_id: Uuid::new_v4().to_string(),
            context_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_send_params_parse() {
        let params: MessageSendParams = serde_json::from_value(serde_json::json!({
            "message": {
                "role": "user",
                "parts": [
                    {"kind": "text", "text": "list all agents"},
                    {"kind": "file", "uri": "ignored://blob"}
                ],
                "messageId": "m-1",
                "contextId": "ctx-1"
            }
        }))
        .unwrap();

        assert_eq!(params.message.text(), "list all agents");
        assert_eq!(params.message.context_id.as_deref(), Some("ctx-1"));
    }

    #[test]
    fn test_multiple_text_parts_are_joined() {
        let message: A2aMessage = serde_json::from_value(serde_json::json!({
            "role": "user",
            "parts": [
                {"kind": "text", "text": "line one"},
                {"kind": "text", "text": "line two"}
            ],
            "messageId": "m-2"
        }))
        .unwrap();

        assert_eq!(message.text(), "line one\nline two");
    }

    #[test]
    fn test_agent_reply_shape() {
        let reply = A2aMessage::agent_reply("done", Some("ctx-9".to_string()));
        assert_eq!(reply.role, "agent");
        assert!(!reply.message_id.is_empty());

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(value["parts"][0]["kind"], "text");
        assert_eq!(value["contextId"], "ctx-9");
        assert!(value.get("messageId").is_some());
    }

    #[test]
    fn test_failure_response_carries_code() {
        let response = JsonRpcResponse::failure(serde_json::json!(7), METHOD_NOT_FOUND, "nope");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"]["code"], METHOD_NOT_FOUND);
        assert_eq!(value["id"], 7);
        assert!(value.get("result").is_none());
    }
}
