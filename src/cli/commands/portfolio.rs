use clap::Subcommand;

use crate::cli::utils::output_success;
use crate::cli::{CliContext, OutputFormat};
use crate::records::Role;
use crate::views::portfolio::{ClientDraft, PortfolioView};

#[derive(Subcommand)]
pub enum PortfolioCommands {
    #[command(about = "Show the portfolio dashboard")]
    Show,

    #[command(about = "Add a client and create their initial portfolio")]
    AddClient {
        #[arg(long, help = "Client full name")]
        full_name: String,
        #[arg(long, help = "Client email")]
        email: String,
        #[arg(long, help = "Client phone number")]
        phone: Option<String>,
        #[arg(long, default_value = "moderate", help = "conservative | moderate | aggressive")]
        risk_profile: String,
        #[arg(long, help = "Initial capital amount")]
        initial_capital: String,
    },
}

pub async fn handle(cmd: PortfolioCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PortfolioCommands::Show => {
            let ctx = CliContext::connect().await?;
            ctx.require_session()?;
            render(&ctx, &output_format).await
        }
        PortfolioCommands::AddClient {
            full_name,
            email,
            phone,
            risk_profile,
            initial_capital,
        } => {
            let ctx = CliContext::connect().await?;
            let session = ctx.require_session()?;
            let token = ctx.access_token();

            let mut view = PortfolioView::new();
            view.draft = ClientDraft {
                full_name,
                email,
                phone: phone.unwrap_or_default(),
                risk_profile: risk_profile.parse().map_err(anyhow::Error::msg)?,
                initial_capital,
            };

            view.add_client(&ctx.gateway, token.as_deref(), session.user_id)
                .await?;

            output_success(
                &output_format,
                "Client added with initial portfolio",
                Some(serde_json::json!({ "clients": view.clients.len() })),
            )
        }
    }
}

/// Render the portfolio screen for the current role. Shared with the shell.
pub(crate) async fn render(ctx: &CliContext, output_format: &OutputFormat) -> anyhow::Result<()> {
    let session = ctx.require_session()?;
    let token = ctx.access_token();
    let role = ctx.sessions.current().role().unwrap_or(Role::Ic);

    let mut view = PortfolioView::new();
    view.refresh(&ctx.gateway, token.as_deref()).await;
    let summary = view.summary();

    if let OutputFormat::Json = output_format {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "role": role.as_str(),
                "summary": summary,
                "clients": view.clients,
                "portfolios": view.portfolios,
            }))?
        );
        return Ok(());
    }

    println!("Portfolio Dashboard ({})", role.as_str());
    println!(
        "  clients: {}   total value: {}   total return: {}   avg return: {}%",
        summary.client_count,
        summary.total_value,
        summary.total_return,
        summary.avg_return_percentage
    );

    match role {
        Role::Ic => {
            println!();
            println!(
                "  {:<24} {:<28} {:<14} {:>14}",
                "NAME", "EMAIL", "RISK", "CAPITAL"
            );
            for client in &view.clients {
                println!(
                    "  {:<24} {:<28} {:<14} {:>14}",
                    client.full_name,
                    client.email,
                    format!("{:?}", client.risk_profile).to_lowercase(),
                    client.initial_capital
                );
            }
        }
        Role::Client => {
            println!();
            let own: Vec<_> = view
                .portfolios
                .iter()
                .filter(|p| p.client_id == session.user_id)
                .collect();
            if own.is_empty() {
                println!("  No portfolio on file yet; contact your advisor.");
            } else {
                println!("  {:<14} {:>14} {:>12}", "VALUE", "RETURN", "RETURN %");
                for portfolio in own {
                    println!(
                        "  {:<14} {:>14} {:>12}",
                        portfolio.total_value,
                        portfolio.total_return,
                        portfolio.return_percentage
                    );
                }
            }
        }
    }

    Ok(())
}
