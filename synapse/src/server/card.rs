//! Agent card published at the A2A well-known endpoint

use serde::{Deserialize, Serialize};

/// Capability flags advertised by the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Whether streaming replies are supported
    pub streaming: bool,
}

/// One skill entry in the agent card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSkill {
    /// Skill id, matching the tool name
    pub id: String,
    /// Display name
    pub name: String,
    /// What the skill does
    pub description: String,
    /// Discovery tags
    pub tags: Vec<String>,
    /// Example invocations
    pub examples: Vec<String>,
}

/// The A2A agent card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Agent name
    pub name: String,
    /// What the agent does
    pub description: String,
    /// Public URL of the A2A endpoint
    pub url: String,
    /// Gateway version
    pub version: String,
    /// Accepted input content types
    pub default_input_modes: Vec<String>,
    /// Produced output content types
    pub default_output_modes: Vec<String>,
    /// Capability flags
    pub capabilities: AgentCapabilities,
    /// Advertised skills
    pub skills: Vec<AgentSkill>,
}

fn skill(id: &str, name: &str, description: &str, tags: &[&str], example: &str) -> AgentSkill {
    AgentSkill {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        examples: vec![example.to_string()],
    }
}

/// Build the gateway's agent card for the given public URL
pub fn agent_card(public_url: &str) -> AgentCard {
    let content_types: Vec<String> = crate::agent::SUPPORTED_CONTENT_TYPES
        .iter()
        .map(|t| t.to_string())
        .collect();

    AgentCard {
        name: "Orchestrate Gateway Agent".to_string(),
        description: "An agent that provides tools to interact with the Orchestrate platform."
            .to_string(),
        url: public_url.to_string(),
        version: crate::VERSION.to_string(),
        default_input_modes: content_types.clone(),
        default_output_modes: content_types,
        capabilities: AgentCapabilities { streaming: false },
        skills: vec![
            skill(
                "list_native_agents",
                "List Native Agents",
                "List all native agents on the Orchestrate platform.",
                &["orchestrate", "agents", "list"],
                "List all native agents",
            ),
            skill(
                "list_external_agents",
                "List External Agents",
                "List all external agents on the Orchestrate platform.",
                &["orchestrate", "agents", "list"],
                "List all external agents",
            ),
            skill(
                "list_assistant_agents",
                "List Assistant Agents",
                "List all assistant agents on the Orchestrate platform.",
                &["orchestrate", "agents", "list"],
                "List all assistant agents",
            ),
            skill(
                "list_all_agents",
                "List All Agents",
                "List all agents (native, external, assistant) on the Orchestrate platform.",
                &["orchestrate", "agents", "list"],
                "List all agents",
            ),
            skill(
                "get_agent_by_id",
                "Get Agent by ID",
                "Get detailed information about a specific agent by its id.",
                &["orchestrate", "agents", "details"],
                "Get agent with ID 'agent-123'",
            ),
            skill(
                "get_agent_by_name",
                "Get Agent by Name",
                "Get detailed information about a specific agent by its name.",
                &["orchestrate", "agents", "details"],
                "Get agent named 'Weather Bot'",
            ),
            skill(
                "invoke_agent_by_name",
                "Invoke Agent by Name",
                "Invoke an Orchestrate agent by name with a message.",
                &["orchestrate", "agents", "invoke"],
                "Invoke agent 'Weather Bot' with message 'What's the weather?'",
            ),
            skill(
                "invoke_agent_by_id",
                "Invoke Agent by ID",
                "Invoke an Orchestrate agent by id with a message.",
                &["orchestrate", "agents", "invoke"],
                "Invoke agent with ID 'agent-123' with message 'Hello'",
            ),
            skill(
                "get_thread_messages",
                "Get Thread Messages",
                "Get all messages from a specific conversation thread.",
                &["orchestrate", "threads", "messages"],
                "Get messages from thread 'thread-456'",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_card_serializes_camel_case() {
        let card = agent_card("http://localhost:8080/");
        let value = serde_json::to_value(&card).unwrap();
        assert!(value.get("defaultInputModes").is_some());
        assert!(value.get("defaultOutputModes").is_some());
        assert_eq!(value["capabilities"]["streaming"], false);
        assert_eq!(value["url"], "http://localhost:8080/");
    }

    #[test]
    fn test_card_advertises_nine_skills() {
        let card = agent_card("http://localhost:8080/");
        assert_eq!(card.skills.len(), 9);

        let ids: HashSet<_> = card.skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), 9);
    }

    #[test]
    fn test_skill_ids_match_tool_names() {
        let card = agent_card("http://localhost:8080/");
        let tool_names: HashSet<String> = crate::agent::tool_specs()
            .into_iter()
            .map(|spec| spec.function.name)
            .collect();
        for skill in &card.skills {
            assert!(
                tool_names.contains(&skill.id),
                "skill {} has no matching tool",
                skill.id
            );
        }
    }
}
