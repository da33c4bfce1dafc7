//! Agent directory operations
//!
//! Listing and lookup across the platform's three agent families. Lookups
//! without an explicit kind search native, external, then assistant agents.

use super::client::{OrchestrateClient, Result};
use super::models::{AgentId, AgentKind, AgentRecord};
use std::collections::BTreeMap;
use tracing::warn;

/// Directory of remote agents, grouped by kind
pub struct AgentDirectory {
    client: OrchestrateClient,
}

impl AgentDirectory {
    /// Create a new agent directory
    pub(crate) fn new(client: OrchestrateClient) -> Self {
        Self { client }
    }

    /// List all agents of one kind
    pub async fn list(&self, kind: AgentKind) -> Result<Vec<AgentRecord>> {
        self.client
            .execute_with_retry(|| self.client.get(kind.endpoint()))
            .await
    }

    /// List all agents across every kind.
    ///
    /// A failing kind is logged and reported as empty so one unavailable
    /// family does not hide the others.
    pub async fn list_all(&self) -> BTreeMap<AgentKind, Vec<AgentRecord>> {
        let mut all = BTreeMap::new();

        for kind in AgentKind::ALL {
            match self.list(kind).await {
                Ok(agents) => {
                    all.insert(kind, agents);
                }
                Err(e) => {
                    warn!("Failed to list {} agents: {}", kind, e);
                    all.insert(kind, Vec::new());
                }
            }
        }

        all
    }

    /// Find an agent by id, optionally restricted to one kind
    pub async fn find_by_id(
        &self,
        agent_id: &AgentId,
        kind: Option<AgentKind>,
    ) -> Result<Option<AgentRecord>> {
        self.find(kind, |agent| &agent.id == agent_id).await
    }

    /// Find an agent by exact name, optionally restricted to one kind
    pub async fn find_by_name(
        &self,
        name: &str,
        kind: Option<AgentKind>,
    ) -> Result<Option<AgentRecord>> {
        self.find(kind, |agent| agent.name == name).await
    }

    async fn find<F>(&self, kind: Option<AgentKind>, matches: F) -> Result<Option<AgentRecord>>
    where
        F: Fn(&AgentRecord) -> bool,
    {
        let kinds: &[AgentKind] = match &kind {
            Some(kind) => std::slice::from_ref(kind),
            None => &AgentKind::ALL,
        };

        for kind in kinds {
            let agents = self.list(*kind).await?;
            if let Some(found) = agents.into_iter().find(&matches) {
                return Ok(Some(found));
            }
        }

        Ok(None)
    }
}
