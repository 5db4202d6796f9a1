use clap::Subcommand;

use crate::cli::utils::{output_success, prompt};
use crate::cli::{session_store, CliContext, OutputFormat};
use crate::session::AuthState;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in to the gateway")]
    Login {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and clear the stored session")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Register a new account")]
    Register {
        #[arg(help = "Email address")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let ctx = CliContext::connect().await?;
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };

            let session = ctx.sessions.sign_in(&email, &password).await?;
            if let Some(snapshot) = ctx.sessions.stored() {
                session_store::save_session(&snapshot)?;
            }

            let role = ctx.sessions.current().role();
            output_success(
                &output_format,
                &format!("Signed in as {}", session.email),
                Some(serde_json::json!({
                    "user_id": session.user_id,
                    "role": role.map(|r| r.as_str()),
                })),
            )
        }
        AuthCommands::Logout => {
            let ctx = CliContext::connect().await?;
            // Local state is cleared regardless of the remote call's outcome
            ctx.sessions.sign_out().await;
            session_store::clear_session()?;
            output_success(&output_format, "Signed out", None)
        }
        AuthCommands::Status => {
            let ctx = CliContext::connect().await?;
            match ctx.sessions.current() {
                AuthState::Authenticated { session, role } => output_success(
                    &output_format,
                    &format!(
                        "Signed in as {} (role: {})",
                        session.email,
                        role.map(|r| r.as_str()).unwrap_or("resolving")
                    ),
                    Some(serde_json::json!({
                        "user_id": session.user_id,
                        "role": role.map(|r| r.as_str()),
                    })),
                ),
                _ => output_success(&output_format, "Not signed in", None),
            }
        }
        AuthCommands::Whoami => {
            let ctx = CliContext::connect().await?;
            let session = ctx.require_session()?;
            let role = ctx.sessions.current().role();
            output_success(
                &output_format,
                &format!(
                    "{} ({}, role: {})",
                    session.email,
                    session.user_id,
                    role.map(|r| r.as_str()).unwrap_or("unknown")
                ),
                Some(serde_json::json!({
                    "user_id": session.user_id,
                    "email": session.email,
                    "role": role.map(|r| r.as_str()),
                })),
            )
        }
        AuthCommands::Register { email, password } => {
            let ctx = CliContext::connect().await?;
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };

            let outcome = ctx.sessions.sign_up(&email, &password).await?;
            let message = if outcome.confirmation_required {
                format!(
                    "Account created for {}; check your email to confirm before signing in",
                    outcome.email
                )
            } else {
                format!("Account created for {}", outcome.email)
            };
            output_success(
                &output_format,
                &message,
                Some(serde_json::json!({
                    "confirmation_required": outcome.confirmation_required,
                })),
            )
        }
    }
}
