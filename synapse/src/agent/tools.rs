//! Platform tools exposed to the LLM
//!
//! Each tool is a thin formatting wrapper over one bridge operation. Tool
//! results are markdown text: failures are rendered as readable error
//! strings so the model can recover instead of the loop aborting.

use super::llm::ToolSpec;
use crate::orchestrate::{
    AgentKind, AgentRecord, Invocation, OrchestrateBridge, ThreadId, ThreadMessage,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

// ============================================================================
// Tool Arguments
// ============================================================================

/// Arguments of the `get_agent_by_id` tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetAgentByIdArgs {
    /// The id of the agent to retrieve
    pub agent_id: String,
    /// Restrict the search to one agent kind; all kinds are searched when omitted
    #[serde(default)]
    pub agent_kind: Option<AgentKind>,
}

/// Arguments of the `get_agent_by_name` tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetAgentByNameArgs {
    /// The exact name of the agent to retrieve
    pub name: String,
    /// Restrict the search to one agent kind; all kinds are searched when omitted
    #[serde(default)]
    pub agent_kind: Option<AgentKind>,
}

/// Arguments of the `invoke_agent_by_name` tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InvokeAgentByNameArgs {
    /// The name of the agent to invoke
    pub agent_name: String,
    /// The message to send to the agent
    pub message: String,
    /// Thread id for conversation continuity
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Arguments of the `invoke_agent_by_id` tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct InvokeAgentByIdArgs {
    /// The id of the agent to invoke
    pub agent_id: String,
    /// The message to send to the agent
    pub message: String,
    /// Thread id for conversation continuity
    #[serde(default)]
    pub thread_id: Option<String>,
}

/// Arguments of the `get_thread_messages` tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetThreadMessagesArgs {
    /// The thread id to read messages from
    pub thread_id: String,
}

fn schema_of<T: JsonSchema>() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|_| empty_schema())
}

fn empty_schema() -> serde_json::Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// The nine platform tools advertised to the model
pub fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::function(
            "list_native_agents",
            "List all native agents on the Orchestrate platform.",
            empty_schema(),
        ),
        ToolSpec::function(
            "list_external_agents",
            "List all external agents on the Orchestrate platform.",
            empty_schema(),
        ),
        ToolSpec::function(
            "list_assistant_agents",
            "List all assistant agents on the Orchestrate platform.",
            empty_schema(),
        ),
        ToolSpec::function(
            "list_all_agents",
            "List all agents (native, external, assistant) on the Orchestrate platform.",
            empty_schema(),
        ),
        ToolSpec::function(
            "get_agent_by_id",
            "Get detailed information about a specific agent by its id.",
            schema_of::<GetAgentByIdArgs>(),
        ),
        ToolSpec::function(
            "get_agent_by_name",
            "Get detailed information about a specific agent by its name.",
            schema_of::<GetAgentByNameArgs>(),
        ),
        ToolSpec::function(
            "invoke_agent_by_name",
            "Invoke an Orchestrate agent by name with a message and return its reply.",
            schema_of::<InvokeAgentByNameArgs>(),
        ),
        ToolSpec::function(
            "invoke_agent_by_id",
            "Invoke an Orchestrate agent by id with a message and return its reply.",
            schema_of::<InvokeAgentByIdArgs>(),
        ),
        ToolSpec::function(
            "get_thread_messages",
            "Get all messages from a specific conversation thread.",
            schema_of::<GetThreadMessagesArgs>(),
        ),
    ]
}

// ============================================================================
// Dispatch
// ============================================================================

/// Execute one tool call against the bridge, returning markdown text
pub async fn dispatch(bridge: &OrchestrateBridge, name: &str, arguments: &str) -> String {
    match name {
        "list_native_agents" => list_kind(bridge, AgentKind::Native).await,
        "list_external_agents" => list_kind(bridge, AgentKind::External).await,
        "list_assistant_agents" => list_kind(bridge, AgentKind::Assistant).await,
        "list_all_agents" => {
            let all = bridge.list_all_agents().await;
            render_agent_overview(&all)
        }
        "get_agent_by_id" => match parse_args::<GetAgentByIdArgs>(arguments) {
            Ok(args) => {
                let agent_id = args.agent_id.clone().into();
                match bridge.get_agent_by_id(&agent_id, args.agent_kind).await {
                    Ok(Some(agent)) => render_agent_details(&agent),
                    Ok(None) => format!("Agent with id '{}' not found.", args.agent_id),
                    Err(e) => format!("Error getting agent by id: {}", e),
                }
            }
            Err(e) => e,
        },
        "get_agent_by_name" => match parse_args::<GetAgentByNameArgs>(arguments) {
            Ok(args) => match bridge.get_agent_by_name(&args.name, args.agent_kind).await {
                Ok(Some(agent)) => render_agent_details(&agent),
                Ok(None) => format!("Agent with name '{}' not found.", args.name),
                Err(e) => format!("Error getting agent by name: {}", e),
            },
            Err(e) => e,
        },
        "invoke_agent_by_name" => match parse_args::<InvokeAgentByNameArgs>(arguments) {
            Ok(args) => {
                let thread_id = args.thread_id.map(ThreadId::from);
                match bridge
                    .invoke_agent_by_name(&args.agent_name, &args.message, thread_id)
                    .await
                {
                    Ok(invocation) => render_invocation(&args.agent_name, &invocation),
                    Err(e) => format!("Error invoking agent '{}': {}", args.agent_name, e),
                }
            }
            Err(e) => e,
        },
        "invoke_agent_by_id" => match parse_args::<InvokeAgentByIdArgs>(arguments) {
            Ok(args) => {
                let agent_id = args.agent_id.clone().into();
                let thread_id = args.thread_id.map(ThreadId::from);
                match bridge.invoke_agent(&agent_id, &args.message, thread_id).await {
                    Ok(invocation) => render_invocation(&args.agent_id, &invocation),
                    Err(e) => format!("Error invoking agent with id '{}': {}", args.agent_id, e),
                }
            }
            Err(e) => e,
        },
        "get_thread_messages" => match parse_args::<GetThreadMessagesArgs>(arguments) {
            Ok(args) => {
                let thread_id = ThreadId::from(args.thread_id);
                match bridge.thread_messages(&thread_id).await {
                    Ok(messages) => render_thread(&thread_id, &messages),
                    Err(e) => format!("Error getting thread messages: {}", e),
                }
            }
            Err(e) => e,
        },
        other => format!("Unknown tool: {}", other),
    }
}

async fn list_kind(bridge: &OrchestrateBridge, kind: AgentKind) -> String {
    match bridge.list_agents(kind).await {
        Ok(agents) => render_agent_list(kind, &agents),
        Err(e) => format!("Error listing {} agents: {}", kind, e),
    }
}

fn parse_args<T: DeserializeOwned>(arguments: &str) -> Result<T, String> {
    let arguments = if arguments.trim().is_empty() {
        "{}"
    } else {
        arguments
    };
    serde_json::from_str(arguments).map_err(|e| format!("Invalid tool arguments: {}", e))
}

// ============================================================================
// Rendering
// ============================================================================

fn push_agent_entry(out: &mut String, index: usize, agent: &AgentRecord) {
    out.push_str(&format!("{}. **{}**\n", index, agent.name));
    out.push_str(&format!("   - ID: {}\n", agent.id));
    out.push_str(&format!(
        "   - Description: {}\n",
        agent.description.as_deref().unwrap_or("No description")
    ));
    out.push_str(&format!(
        "   - Status: {}\n\n",
        agent.status.as_deref().unwrap_or("Unknown")
    ));
}

pub(crate) fn render_agent_list(kind: AgentKind, agents: &[AgentRecord]) -> String {
    if agents.is_empty() {
        return format!("No {} agents found on the Orchestrate platform.", kind);
    }

    let mut out = format!("Found {} {} agent(s):\n\n", agents.len(), kind);
    for (i, agent) in agents.iter().enumerate() {
        push_agent_entry(&mut out, i + 1, agent);
    }
    out
}

pub(crate) fn render_agent_overview(all: &BTreeMap<AgentKind, Vec<AgentRecord>>) -> String {
    let mut out = String::from("**All Agents on the Orchestrate platform:**\n\n");

    for (kind, agents) in all {
        out.push_str(&format!("## {} Agents ({})\n", capitalize(kind), agents.len()));
        if agents.is_empty() {
            out.push_str("No agents found.\n\n");
        } else {
            for (i, agent) in agents.iter().enumerate() {
                push_agent_entry(&mut out, i + 1, agent);
            }
        }
    }

    out
}

pub(crate) fn render_agent_details(agent: &AgentRecord) -> String {
    let mut out = String::from("**Agent Details:**\n\n");
    out.push_str(&format!("**Name:** {}\n", agent.name));
    out.push_str(&format!("**ID:** {}\n", agent.id));
    out.push_str(&format!(
        "**Description:** {}\n",
        agent.description.as_deref().unwrap_or("No description")
    ));
    out.push_str(&format!(
        "**Status:** {}\n",
        agent.status.as_deref().unwrap_or("Unknown")
    ));
    out.push_str(&format!(
        "**Created:** {}\n",
        agent.created_at.as_deref().unwrap_or("Unknown")
    ));
    out.push_str(&format!(
        "**Updated:** {}\n",
        agent.updated_at.as_deref().unwrap_or("Unknown")
    ));

    for (key, value) in &agent.extra {
        out.push_str(&format!("**{}:** {}\n", capitalize_word(key), value));
    }

    out
}

pub(crate) fn render_invocation(agent_label: &str, invocation: &Invocation) -> String {
    let mut out = String::from("**Agent Response:**\n\n");
    out.push_str(&format!("**Agent:** {}\n", agent_label));
    if let Some(thread_id) = &invocation.thread_id {
        out.push_str(&format!("**Thread ID:** {}\n", thread_id));
    }

    match &invocation.conversation {
        Some(conversation) if !conversation.is_empty() => {
            out.push_str("**Conversation:**\n");
            for turn in conversation {
                out.push_str(&format!("- {}: {}\n", turn.role, turn.content));
            }
        }
        _ => {
            out.push_str(&format!("**Response:** {}\n", invocation.response));
        }
    }

    out
}

pub(crate) fn render_thread(thread_id: &ThreadId, messages: &[ThreadMessage]) -> String {
    if messages.is_empty() {
        return format!("No messages found in thread '{}'.", thread_id);
    }

    let mut out = format!("**Thread Messages (Thread ID: {}):**\n\n", thread_id);
    for (i, message) in messages.iter().enumerate() {
        out.push_str(&format!("**Message {}:**\n", i + 1));
        out.push_str(&format!("**Role:** {}\n", message.role));
        out.push_str(&format!("**Content:** {}\n", message.content.text()));
        out.push_str(&format!(
            "**Timestamp:** {}\n\n",
            message.timestamp.as_deref().unwrap_or("Unknown")
        ));
    }
    out
}

fn capitalize(kind: &AgentKind) -> String {
    capitalize_word(&kind.to_string())
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrate::AgentId;

    fn agent(id: &str, name: &str) -> AgentRecord {
        AgentRecord {
            id: AgentId::from(id),
            name: name.to_string(),
            description: Some("test agent".to_string()),
            status: Some("active".to_string()),
            created_at: None,
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_tool_specs_cover_all_nine_tools() {
        let specs = tool_specs();
        assert_eq!(specs.len(), 9);

        let names: Vec<_> = specs.iter().map(|s| s.function.name.as_str()).collect();
        for expected in [
            "list_native_agents",
            "list_external_agents",
            "list_assistant_agents",
            "list_all_agents",
            "get_agent_by_id",
            "get_agent_by_name",
            "invoke_agent_by_name",
            "invoke_agent_by_id",
            "get_thread_messages",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }
    }

    #[test]
    fn test_parse_args_accepts_empty_arguments() {
        let args: Result<GetThreadMessagesArgs, _> = parse_args(r#"{"thread_id": "t1"}"#);
        assert_eq!(args.unwrap().thread_id, "t1");

        let err: Result<GetThreadMessagesArgs, _> = parse_args("");
        assert!(err.is_err());
    }

    #[test]
    fn test_render_agent_list_empty() {
        let out = render_agent_list(AgentKind::Native, &[]);
        assert_eq!(out, "No native agents found on the Orchestrate platform.");
    }

    #[test]
    fn test_render_agent_list_entries() {
        let agents = vec![agent("a1", "Weather Bot"), agent("a2", "Ticket Bot")];
        let out = render_agent_list(AgentKind::External, &agents);
        assert!(out.starts_with("Found 2 external agent(s):"));
        assert!(out.contains("1. **Weather Bot**"));
        assert!(out.contains("   - ID: a2"));
    }

    #[test]
    fn test_render_agent_details_includes_extra_fields() {
        let mut record = agent("a1", "Weather Bot");
        record
            .extra
            .insert("llm".to_string(), serde_json::json!("granite-13b"));
        let out = render_agent_details(&record);
        assert!(out.contains("**Name:** Weather Bot"));
        assert!(out.contains("**Llm:** \"granite-13b\""));
    }

    #[test]
    fn test_render_invocation_prefers_conversation() {
        let invocation = Invocation {
            agent_id: AgentId::from("a1"),
            thread_id: Some(ThreadId::from("t1")),
            response: serde_json::json!({"run_id": "r1"}),
            messages: None,
            conversation: Some(vec![crate::orchestrate::ConversationTurn {
                role: "assistant".to_string(),
                content: "Sunny.".to_string(),
            }]),
        };
        let out = render_invocation("Weather Bot", &invocation);
        assert!(out.contains("**Thread ID:** t1"));
        assert!(out.contains("- assistant: Sunny."));
        assert!(!out.contains("**Response:**"));
    }

    #[test]
    fn test_render_thread_empty() {
        let out = render_thread(&ThreadId::from("t9"), &[]);
        assert_eq!(out, "No messages found in thread 't9'.");
    }
}
