//! Tool-calling agent over the Orchestrate bridge
//!
//! The agent forwards a user query to an LLM together with the nine platform
//! tools, executes every tool call the model requests, and loops until the
//! model produces a plain-text reply or the turn budget runs out.

use crate::orchestrate::OrchestrateBridge;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub mod llm;
pub mod tools;

pub use llm::{ChatApi, ChatCompletion, ChatMessage, ChatRequest, HttpChatClient, LlmConfig, ToolSpec};
pub use tools::{dispatch, tool_specs};

/// Content types the agent accepts and produces
pub const SUPPORTED_CONTENT_TYPES: [&str; 2] = ["text", "text/plain"];

const SYSTEM_PROMPT: &str = "You are a gateway to the Orchestrate platform. \
Use the available tools to list, inspect, and invoke Orchestrate agents and \
to read conversation threads. Answer with the information the tools return; \
do not invent agents or threads.";

/// Agent error types
#[derive(Debug, Error)]
pub enum AgentError {
    /// The LLM backend failed
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// The LLM returned a completion without any choices
    #[error("LLM returned an empty completion")]
    EmptyCompletion,
}

/// Tool-calling agent fronting the Orchestrate platform
pub struct OrchestrateAgent {
    bridge: Arc<OrchestrateBridge>,
    chat: Box<dyn ChatApi>,
    model: String,
    max_turns: usize,
}

impl OrchestrateAgent {
    /// Create an agent backed by an OpenAI-compatible chat endpoint
    pub fn new(bridge: Arc<OrchestrateBridge>, config: &LlmConfig) -> Result<Self, AgentError> {
        let chat = Box::new(HttpChatClient::new(config)?);
        Ok(Self::with_chat_api(bridge, chat, config))
    }

    /// Create an agent with a custom `ChatApi` implementation
    pub fn with_chat_api(
        bridge: Arc<OrchestrateBridge>,
        chat: Box<dyn ChatApi>,
        config: &LlmConfig,
    ) -> Self {
        Self {
            bridge,
            chat,
            model: config.model.clone(),
            max_turns: config.max_turns.max(1),
        }
    }

    /// Run the tool loop for one user query and return the final reply text
    pub async fn run(&self, query: &str) -> Result<String, AgentError> {
        let tools = tool_specs();
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(query)];
        let mut last_content: Option<String> = None;

        for turn in 0..self.max_turns {
            let request = ChatRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                tools: tools.clone(),
            };

            let completion = self.chat.complete(request).await?;
            let message = completion.into_message().ok_or(AgentError::EmptyCompletion)?;

            let tool_calls = message.tool_calls.clone().unwrap_or_default();
            if let Some(content) = &message.content {
                if !content.is_empty() {
                    last_content = Some(content.clone());
                }
            }
            messages.push(message.clone());

            if tool_calls.is_empty() {
                return Ok(message.content.unwrap_or_default());
            }

            for call in tool_calls {
                debug!(
                    "Turn {}: executing tool {} with {}",
                    turn, call.function.name, call.function.arguments
                );
                let result =
                    dispatch(&self.bridge, &call.function.name, &call.function.arguments).await;
                messages.push(ChatMessage::tool(call.id, result));
            }
        }

        warn!(
            "Tool loop exhausted {} turns without a final reply",
            self.max_turns
        );
        Ok(last_content
            .unwrap_or_else(|| "The agent stopped before producing a final reply.".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrate::OrchestrateConfig;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted ChatApi that pops one completion per call
    struct ScriptedChat {
        completions: Mutex<Vec<ChatCompletion>>,
    }

    impl ScriptedChat {
        fn new(mut completions: Vec<ChatCompletion>) -> Self {
            completions.reverse();
            Self {
                completions: Mutex::new(completions),
            }
        }
    }

    #[async_trait]
    impl ChatApi for ScriptedChat {
        async fn complete(&self, _request: ChatRequest) -> Result<ChatCompletion, AgentError> {
            self.completions
                .lock()
                .unwrap()
                .pop()
                .ok_or(AgentError::EmptyCompletion)
        }
    }

    fn completion(json: serde_json::Value) -> ChatCompletion {
        serde_json::from_value(json).unwrap()
    }

    fn test_agent(completions: Vec<ChatCompletion>, max_turns: usize) -> OrchestrateAgent {
        // Bridge pointing nowhere with retries disabled; tool failures render
        // as error text instead of aborting the loop.
        let bridge = Arc::new(
            OrchestrateBridge::new(OrchestrateConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                max_retries: 0,
                retry_delay_ms: 1,
                ..Default::default()
            })
            .unwrap(),
        );
        let config = LlmConfig {
            max_turns,
            ..Default::default()
        };
        OrchestrateAgent::with_chat_api(bridge, Box::new(ScriptedChat::new(completions)), &config)
    }

    #[tokio::test]
    async fn test_run_returns_direct_reply() {
        let agent = test_agent(
            vec![completion(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "No tools needed."}}]
            }))],
            8,
        );

        let reply = agent.run("hello").await.unwrap();
        assert_eq!(reply, "No tools needed.");
    }

    #[tokio::test]
    async fn test_run_executes_tool_calls_then_replies() {
        let agent = test_agent(
            vec![
                completion(serde_json::json!({
                    "choices": [{"message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "list_native_agents", "arguments": "{}"}
                        }]
                    }}]
                })),
                completion(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "The platform is unreachable."}}]
                })),
            ],
            8,
        );

        let reply = agent.run("list agents").await.unwrap();
        assert_eq!(reply, "The platform is unreachable.");
    }

    #[tokio::test]
    async fn test_run_survives_unknown_tool_names() {
        let agent = test_agent(
            vec![
                completion(serde_json::json!({
                    "choices": [{"message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "launch_rockets", "arguments": "{}"}
                        }]
                    }}]
                })),
                completion(serde_json::json!({
                    "choices": [{"message": {"role": "assistant", "content": "Sorry, no such tool."}}]
                })),
            ],
            8,
        );

        let reply = agent.run("do something odd").await.unwrap();
        assert_eq!(reply, "Sorry, no such tool.");
    }

    #[tokio::test]
    async fn test_run_stops_at_turn_budget() {
        // Every completion asks for another tool call; the loop must stop.
        let looping = || {
            completion(serde_json::json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_n",
                        "type": "function",
                        "function": {"name": "list_native_agents", "arguments": "{}"}
                    }]
                }}]
            }))
        };
        let agent = test_agent(vec![looping(), looping(), looping()], 2);

        let reply = agent.run("loop forever").await.unwrap();
        assert!(reply.contains("stopped before producing a final reply"));
    }
}
