pub mod commands;
pub mod session_store;
pub mod utils;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::gateway::Gateway;
use crate::records::Session;
use crate::session::{AuthState, SessionManager};

#[derive(Parser)]
#[command(name = "finboard")]
#[command(about = "finboard - command-line client for the integrated finance dashboard")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "One-time data seeding against the gateway")]
    Init {
        #[command(subcommand)]
        cmd: commands::init::InitCommands,
    },

    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Portfolio dashboard: clients and portfolios")]
    Portfolio {
        #[command(subcommand)]
        cmd: commands::portfolio::PortfolioCommands,
    },

    #[command(about = "Personal finance: transactions, budgets, categories")]
    Finance {
        #[command(subcommand)]
        cmd: commands::finance::FinanceCommands,
    },

    #[command(about = "Trading journal: trades and performance")]
    Trading {
        #[command(subcommand)]
        cmd: commands::trading::TradingCommands,
    },

    #[command(about = "Cross-app summary stats")]
    Dashboard,

    #[command(about = "Interactive shell over the four views")]
    Shell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Init { cmd } => commands::init::handle(cmd, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Portfolio { cmd } => commands::portfolio::handle(cmd, output_format).await,
        Commands::Finance { cmd } => commands::finance::handle(cmd, output_format).await,
        Commands::Trading { cmd } => commands::trading::handle(cmd, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(output_format).await,
        Commands::Shell => commands::shell::handle(output_format).await,
    }
}

/// Shared per-invocation context: the gateway client plus a session manager
/// restored from the persisted token.
pub(crate) struct CliContext {
    pub gateway: Arc<Gateway>,
    pub sessions: Arc<SessionManager>,
}

impl CliContext {
    pub async fn connect() -> anyhow::Result<Self> {
        let config = config::config();
        if config.gateway.url.is_empty() {
            anyhow::bail!("gateway URL not configured; set FINBOARD_GATEWAY_URL");
        }
        if config.gateway.anon_key.is_empty() {
            anyhow::bail!("gateway API key not configured; set FINBOARD_GATEWAY_KEY");
        }

        let gateway = Arc::new(Gateway::from_config(&config.gateway)?);
        let sessions = Arc::new(SessionManager::new(gateway.clone(), &config.session));

        let stored = session_store::load_session()?;
        let had_stored = stored.is_some();
        let state = sessions.restore(stored).await;

        // Persist refreshed tokens; drop a stored session that did not survive
        match state {
            AuthState::Authenticated { .. } => {
                if let Some(snapshot) = sessions.stored() {
                    session_store::save_session(&snapshot)?;
                }
            }
            AuthState::Unauthenticated if had_stored => {
                session_store::clear_session()?;
            }
            _ => {}
        }

        Ok(Self { gateway, sessions })
    }

    pub fn require_session(&self) -> anyhow::Result<Session> {
        self.sessions.current().session().cloned().ok_or_else(|| {
            anyhow::anyhow!("not signed in; run `finboard auth login <email>` first")
        })
    }

    pub fn access_token(&self) -> Option<String> {
        self.sessions.access_token()
    }
}
