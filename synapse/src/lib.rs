//! Synapse - Agent-to-Agent gateway for the Orchestrate platform
//!
//! Synapse fronts the Orchestrate conversational-agent platform with an A2A
//! HTTP server. Incoming `message/send` requests are answered by a
//! tool-calling LLM agent whose nine tools list, inspect, and invoke remote
//! Orchestrate agents and read their conversation threads.
//!
//! # Architecture
//!
//! - `orchestrate` - typed client for the platform REST API: authentication
//!   with scheduled refresh, agent directory, invocation with completion
//!   polling
//! - `agent` - the tool-calling agent and its LLM backend seam
//! - `server` - the A2A surface: agent card, health, JSON-RPC
//! - `config` - environment-driven configuration

#![warn(missing_docs)]

// Orchestrate platform client
pub mod orchestrate;

// Tool-calling agent
pub mod agent;

// A2A server adapter
pub mod server;

// Environment-driven configuration
pub mod config;

// Re-export key types
pub use agent::{AgentError, OrchestrateAgent};
pub use config::SynapseConfig;
pub use orchestrate::{OrchestrateBridge, OrchestrateConfig, OrchestrateError};
pub use server::{agent_card, AgentCard, AppState};

/// Synapse version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
