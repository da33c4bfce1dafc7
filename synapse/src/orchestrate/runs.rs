//! Agent invocation and completion polling
//!
//! Invoking an agent starts a run on the platform; the reply materializes
//! asynchronously in the run's conversation thread. This module owns the
//! polling loop that watches the thread until the assistant's reply is
//! judged complete, and the heuristic that does the judging.

use super::client::{OrchestrateClient, OrchestrateError, Result};
use super::models::{
    AgentId, ConversationTurn, Invocation, RunRequest, RunResponse, RunMessage, ThreadId,
    ThreadMessage,
};
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Replies shorter than this are not judged complete on length alone
const MIN_COMPLETE_LEN: usize = 50;

/// Phrases agents use to close out a reply
const CLOSING_PHRASES: [&str; 9] = [
    "hope this helps",
    "let me know",
    "anything else",
    "is there anything",
    "do you have",
    "can i help",
    "feel free",
    "if you need",
    "additional",
];

/// Judge whether a candidate assistant reply looks finished.
///
/// `waited_min` is true once the poll has run past the configured minimum
/// wait; at that point even a short, unpunctuated reply is accepted rather
/// than held indefinitely.
pub(crate) fn reply_looks_complete(text: &str, waited_min: bool) -> bool {
    if text.len() > MIN_COMPLETE_LEN {
        return true;
    }

    let lowered = text.to_lowercase();
    if CLOSING_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
        return true;
    }

    if text.ends_with(['.', '!', '?']) {
        return true;
    }

    waited_min
}

/// Flatten wire-format messages into `role: text` pairs
pub(crate) fn format_conversation(messages: &[ThreadMessage]) -> Vec<ConversationTurn> {
    messages
        .iter()
        .map(|message| ConversationTurn {
            role: message.role.clone(),
            content: message.content.text(),
        })
        .collect()
}

/// Run operations: invoke agents and read conversation threads
pub struct RunClient {
    client: OrchestrateClient,
}

impl RunClient {
    /// Create a new run client
    pub(crate) fn new(client: OrchestrateClient) -> Self {
        Self { client }
    }

    /// Invoke an agent with a message.
    ///
    /// When the platform response names a thread, the thread is polled until
    /// the assistant reply is judged complete and the conversation is
    /// attached to the result. Polling failures degrade the result rather
    /// than failing the invocation.
    pub async fn invoke(
        &self,
        agent_id: &AgentId,
        message: &str,
        thread_id: Option<ThreadId>,
    ) -> Result<Invocation> {
        let request = RunRequest {
            message: RunMessage {
                role: "user".to_string(),
                content: message.to_string(),
            },
            agent_id: agent_id.clone(),
            thread_id,
        };

        let raw: serde_json::Value = self
            .client
            .execute_with_retry(|| self.client.post("/runs", &request))
            .await?;
        let run: RunResponse = serde_json::from_value(raw.clone())?;

        let mut invocation = Invocation {
            agent_id: agent_id.clone(),
            thread_id: run.thread_id.clone(),
            response: raw,
            messages: None,
            conversation: None,
        };

        if let Some(thread_id) = &run.thread_id {
            match self.wait_for_reply(thread_id).await {
                Ok(messages) => {
                    invocation.conversation = Some(format_conversation(&messages));
                    invocation.messages = Some(messages);
                }
                Err(e) => {
                    warn!("Failed to fetch thread {} after invocation: {}", thread_id, e);
                }
            }
        }

        Ok(invocation)
    }

    /// Fetch all messages in a thread
    pub async fn thread_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>> {
        let path = format!("/threads/{}/messages", thread_id);
        self.client
            .execute_with_retry(|| self.client.get(&path))
            .await
            .map_err(|e| match e {
                OrchestrateError::Api { status, .. } if status == StatusCode::NOT_FOUND => {
                    OrchestrateError::ThreadNotFound(thread_id.clone())
                }
                other => other,
            })
    }

    /// Poll a thread until the assistant reply is judged complete.
    ///
    /// Returns whatever messages were last fetched once the deadline lapses;
    /// a fetch error aborts polling and is propagated to the caller, who
    /// degrades the invocation rather than failing it.
    async fn wait_for_reply(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>> {
        let config = self.client.config();
        let interval = Duration::from_millis(config.poll_interval_ms);
        let deadline = Duration::from_secs(config.poll_max_wait_secs);
        let min_wait = Duration::from_secs(config.poll_min_wait_secs);

        let started = Instant::now();
        let mut last_count = 0usize;

        while started.elapsed() < deadline {
            tokio::time::sleep(interval).await;
            let elapsed = started.elapsed();

            let messages = self.thread_messages(thread_id).await?;

            if messages.len() > last_count {
                info!(
                    "Thread {}: {} messages (was {})",
                    thread_id,
                    messages.len(),
                    last_count
                );
                last_count = messages.len();
            }

            if messages.len() < 2 {
                info!(
                    "Waiting for agent response ({:.0?} elapsed, {} messages)",
                    elapsed,
                    messages.len()
                );
                continue;
            }

            let Some(reply) = messages.iter().rev().find(|m| m.is_assistant()) else {
                info!("Waiting for assistant reply ({:.0?} elapsed)", elapsed);
                continue;
            };

            let text = reply.content.text();
            if reply_looks_complete(&text, elapsed >= min_wait) {
                info!(
                    "Complete reply in thread {} after {:.0?}",
                    thread_id, elapsed
                );
                return Ok(messages);
            }

            info!(
                "Waiting for complete reply ({:.0?} elapsed, reply length {})",
                elapsed,
                text.len()
            );
        }

        warn!(
            "Polling deadline of {}s reached for thread {}, returning available messages",
            config.poll_max_wait_secs, thread_id
        );
        self.thread_messages(thread_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrate::models::MessageContent;

    #[test]
    fn test_long_reply_is_complete() {
        let text = "a".repeat(MIN_COMPLETE_LEN + 1);
        assert!(reply_looks_complete(&text, false));
    }

    #[test]
    fn test_short_reply_without_signal_is_incomplete() {
        assert!(!reply_looks_complete("Working on it", false));
    }

    #[test]
    fn test_closing_phrase_completes_short_reply() {
        assert!(reply_looks_complete("Let me know", false));
        assert!(reply_looks_complete("HOPE THIS HELPS", false));
    }

    #[test]
    fn test_terminal_punctuation_completes_short_reply() {
        assert!(reply_looks_complete("Done.", false));
        assert!(reply_looks_complete("Done!", false));
        assert!(reply_looks_complete("Done?", false));
    }

    #[test]
    fn test_minimum_wait_overrides_incomplete_signals() {
        assert!(!reply_looks_complete("thinking", false));
        assert!(reply_looks_complete("thinking", true));
    }

    #[test]
    fn test_empty_reply_is_incomplete_until_min_wait() {
        assert!(!reply_looks_complete("", false));
        assert!(reply_looks_complete("", true));
    }

    #[test]
    fn test_format_conversation_extracts_part_text() {
        let messages = vec![
            ThreadMessage {
                role: "user".to_string(),
                content: MessageContent::Text("what is the weather".to_string()),
                timestamp: None,
            },
            ThreadMessage {
                role: "assistant".to_string(),
                content: serde_json::from_value(serde_json::json!([
                    {"response_type": "text", "text": "Sunny, 21C."}
                ]))
                .unwrap(),
                timestamp: None,
            },
        ];

        let conversation = format_conversation(&messages);
        assert_eq!(
            conversation,
            vec![
                ConversationTurn {
                    role: "user".to_string(),
                    content: "what is the weather".to_string(),
                },
                ConversationTurn {
                    role: "assistant".to_string(),
                    content: "Sunny, 21C.".to_string(),
                },
            ]
        );
    }
}
