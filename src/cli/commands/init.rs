use clap::Subcommand;

use crate::cli::utils::output_success;
use crate::cli::{CliContext, OutputFormat};
use crate::filter::Filter;
use crate::records::default_categories;

#[derive(Subcommand)]
pub enum InitCommands {
    #[command(about = "Seed the default category set if none exist")]
    Seed,
}

/// Explicit one-time seeding step, run before normal use. Normal startup
/// never touches schema or seed data.
pub async fn handle(cmd: InitCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        InitCommands::Seed => {
            let ctx = CliContext::connect().await?;
            let token = ctx.access_token();

            let mut existing = Filter::new("categories")?;
            existing.select(vec!["id".to_string()])?.limit(1, None)?;
            let rows: Vec<serde_json::Value> =
                ctx.gateway.select(token.as_deref(), &existing).await?;

            if !rows.is_empty() {
                return output_success(
                    &output_format,
                    "Categories already present, nothing to seed",
                    None,
                );
            }

            let categories = default_categories();
            let count = categories.len();
            ctx.gateway
                .insert(token.as_deref(), "categories", &categories)
                .await?;

            output_success(
                &output_format,
                &format!("Seeded {} default categories", count),
                Some(serde_json::json!({ "seeded": count })),
            )
        }
    }
}
