//! A2A server adapter
//!
//! Fronts the tool-calling agent with the Agent-to-Agent HTTP surface: the
//! well-known agent card, a health endpoint, and a JSON-RPC `message/send`
//! method.

pub mod card;
pub mod error;
pub mod jsonrpc;
pub mod routes;
pub mod server;

pub use card::{agent_card, AgentCapabilities, AgentCard, AgentSkill};
pub use error::ApiError;
pub use routes::{create_routes, AppState};
pub use server::start_server;
