//! Synapse CLI - Agent-to-Agent gateway for the Orchestrate platform.
//!
//! # Usage
//!
//! ```bash
//! # Start the A2A server
//! synapse serve --host 0.0.0.0 --port 8080
//!
//! # Start with the public URL taken from the container platform
//! synapse serve --public-url auto
//!
//! # Print the agent card
//! synapse card
//!
//! # Authenticate and list agents across all kinds
//! synapse check
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use synapse::agent::OrchestrateAgent;
use synapse::config::SynapseConfig;
use synapse::orchestrate::OrchestrateBridge;
use synapse::server::{agent_card, start_server, AppState};

#[derive(Parser)]
#[command(name = "synapse")]
#[command(about = "Synapse - A2A gateway for the Orchestrate platform", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the A2A server
    Serve {
        /// Host to bind the server to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind the server to (overridden by $PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Public URL advertised in the agent card; 'auto' resolves from $SERVICE_URL
        #[arg(long)]
        public_url: Option<String>,
    },

    /// Print the agent card JSON
    Card {
        /// Public URL advertised in the card; 'auto' resolves from $SERVICE_URL
        #[arg(long)]
        public_url: Option<String>,
    },

    /// Authenticate and list agents across all kinds
    Check,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = SynapseConfig::from_env()?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            public_url,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(public_url) = public_url {
                config.server.public_url = Some(public_url);
            }

            serve(config).await
        }

        Commands::Card { public_url } => {
            if let Some(public_url) = public_url {
                config.server.public_url = Some(public_url);
            }
            let url = config
                .server
                .resolve_public_url(std::env::var("SERVICE_URL").ok());
            let card = agent_card(&url);
            println!("{}", serde_json::to_string_pretty(&card)?);
            Ok(())
        }

        Commands::Check => check(config).await,
    }
}

async fn serve(config: SynapseConfig) -> Result<()> {
    let public_url = config
        .server
        .resolve_public_url(std::env::var("SERVICE_URL").ok());
    info!("Agent card URL set to: {}", public_url);

    let bridge = Arc::new(OrchestrateBridge::new(config.orchestrate)?);
    let agent = OrchestrateAgent::new(bridge, &config.llm)?;

    let state = AppState {
        agent: Arc::new(agent),
        card: Arc::new(agent_card(&public_url)),
        started_at: Instant::now(),
    };

    start_server(&config.server.host, config.server.port, state).await
}

async fn check(config: SynapseConfig) -> Result<()> {
    let bridge = OrchestrateBridge::new(config.orchestrate)?;

    bridge.authenticate().await?;
    println!("Authentication: ok");

    let all = bridge.list_all_agents().await;
    for (kind, agents) in &all {
        println!("{} agents: {}", kind, agents.len());
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("synapse=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("synapse=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
