use crate::cli::{CliContext, OutputFormat};
use crate::views::dashboard;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::connect().await?;
    ctx.require_session()?;
    render(&ctx, &output_format).await
}

pub(crate) async fn render(ctx: &CliContext, output_format: &OutputFormat) -> anyhow::Result<()> {
    let session = ctx.require_session()?;
    let token = ctx.access_token();

    let stats = dashboard::load_stats(&ctx.gateway, token.as_deref(), session.user_id).await;

    if let OutputFormat::Json = output_format {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Integrated Finance Dashboard — {}", session.email);
    println!(
        "  portfolio value: {}   month balance: {}   trading P/L: {}   records: {}",
        stats.portfolio_value,
        stats.personal_balance,
        stats.trading_profit,
        stats.total_transactions
    );
    println!();
    println!("  portfolio  Portfolio Dashboard — clients and portfolios");
    println!("  finance    Personal Finance — transactions and budgets");
    println!("  trading    Trading Journal — trades and performance");

    Ok(())
}
