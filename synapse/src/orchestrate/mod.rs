//! Orchestrate Bridge - typed client for the Orchestrate platform
//!
//! This module wraps the platform's REST API behind one facade: agent
//! directory lookups, agent invocation with completion polling, and
//! interval-based re-authentication.
//!
//! # Architecture
//!
//! - `client` - HTTP core: bearer injection, retries, error mapping
//! - `auth` - API-key to bearer-token exchange with scheduled refresh
//! - `models` - wire data models
//! - `agents` - directory listing and lookup across agent kinds
//! - `runs` - invocation and the completion-polling loop
//!
//! # Example
//!
//! ```no_run
//! use synapse::orchestrate::{OrchestrateBridge, OrchestrateConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OrchestrateConfig {
//!         base_url: "https://orchestrate.example.com/v1".to_string(),
//!         api_key: "secret".to_string(),
//!         ..Default::default()
//!     };
//!     let bridge = OrchestrateBridge::new(config)?;
//!
//!     let agents = bridge.list_all_agents().await;
//!     println!("{} agent kinds", agents.len());
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;

// Module declarations
pub mod agents;
pub mod auth;
pub mod client;
pub mod models;
pub mod runs;

// Re-export key types
pub use client::{OrchestrateConfig, OrchestrateError, Result};
pub use models::{
    AgentId, AgentKind, AgentRecord, ContentPart, ConversationTurn, Invocation, MessageContent,
    RunId, ThreadId, ThreadMessage,
};

use agents::AgentDirectory;
use client::{agent_not_found, OrchestrateClient};
use runs::RunClient;

/// Facade over the Orchestrate platform API
pub struct OrchestrateBridge {
    /// Agent directory
    directory: AgentDirectory,

    /// Run operations
    runs: RunClient,

    /// HTTP client core (shared by the managers above)
    client: OrchestrateClient,
}

impl OrchestrateBridge {
    /// Create a new bridge.
    ///
    /// No network traffic happens here; the first request authenticates.
    pub fn new(config: OrchestrateConfig) -> Result<Self> {
        let client = OrchestrateClient::new(config)?;

        Ok(Self {
            directory: AgentDirectory::new(client.clone()),
            runs: RunClient::new(client.clone()),
            client,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &OrchestrateConfig {
        self.client.config()
    }

    /// Authenticate now, refreshing any cached token.
    ///
    /// Useful as a startup or operational smoke check.
    pub async fn authenticate(&self) -> Result<()> {
        self.client.auth().force_refresh().await.map(|_| ())
    }

    // ========================================================================
    // Agent Directory
    // ========================================================================

    /// List all agents of one kind
    pub async fn list_agents(&self, kind: AgentKind) -> Result<Vec<AgentRecord>> {
        self.directory.list(kind).await
    }

    /// List all agents across every kind; failing kinds come back empty
    pub async fn list_all_agents(&self) -> BTreeMap<AgentKind, Vec<AgentRecord>> {
        self.directory.list_all().await
    }

    /// Find an agent by id, optionally restricted to one kind
    pub async fn get_agent_by_id(
        &self,
        agent_id: &AgentId,
        kind: Option<AgentKind>,
    ) -> Result<Option<AgentRecord>> {
        self.directory.find_by_id(agent_id, kind).await
    }

    /// Find an agent by exact name, optionally restricted to one kind
    pub async fn get_agent_by_name(
        &self,
        name: &str,
        kind: Option<AgentKind>,
    ) -> Result<Option<AgentRecord>> {
        self.directory.find_by_name(name, kind).await
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Invoke an agent by id and wait for its reply
    pub async fn invoke_agent(
        &self,
        agent_id: &AgentId,
        message: &str,
        thread_id: Option<ThreadId>,
    ) -> Result<Invocation> {
        self.runs.invoke(agent_id, message, thread_id).await
    }

    /// Invoke an agent by name and wait for its reply
    pub async fn invoke_agent_by_name(
        &self,
        name: &str,
        message: &str,
        thread_id: Option<ThreadId>,
    ) -> Result<Invocation> {
        let agent = self
            .directory
            .find_by_name(name, None)
            .await?
            .ok_or_else(|| agent_not_found(format!("agent named '{}'", name)))?;

        self.runs.invoke(&agent.id, message, thread_id).await
    }

    /// Fetch all messages in a conversation thread
    pub async fn thread_messages(&self, thread_id: &ThreadId) -> Result<Vec<ThreadMessage>> {
        self.runs.thread_messages(thread_id).await
    }
}
