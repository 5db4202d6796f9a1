use clap::Subcommand;

use crate::cli::utils::output_success;
use crate::cli::{CliContext, OutputFormat};
use crate::views::trading::TradingView;

#[derive(Subcommand)]
pub enum TradingCommands {
    #[command(about = "Show the trade list and performance stats")]
    Show,

    #[command(about = "Record a trade")]
    AddTrade {
        #[arg(long, help = "Ticker symbol, e.g. PTT")]
        symbol: String,
        #[arg(long, default_value = "buy", help = "buy | sell")]
        side: String,
        #[arg(long, help = "Number of shares")]
        quantity: String,
        #[arg(long, help = "Entry price")]
        entry_price: String,
        #[arg(long, help = "Exit price (closed trades)")]
        exit_price: Option<String>,
        #[arg(long, help = "Entry date (YYYY-MM-DD, defaults to today)")]
        entry_date: Option<String>,
        #[arg(long, help = "Exit date (YYYY-MM-DD)")]
        exit_date: Option<String>,
        #[arg(long, help = "Strategy label, e.g. Swing Trading")]
        strategy: Option<String>,
        #[arg(long, help = "Free-form notes")]
        notes: Option<String>,
        #[arg(long, default_value = "open", help = "open | closed")]
        status: String,
    },
}

pub async fn handle(cmd: TradingCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TradingCommands::Show => {
            let ctx = CliContext::connect().await?;
            ctx.require_session()?;
            render(&ctx, &output_format).await
        }
        TradingCommands::AddTrade {
            symbol,
            side,
            quantity,
            entry_price,
            exit_price,
            entry_date,
            exit_date,
            strategy,
            notes,
            status,
        } => {
            let ctx = CliContext::connect().await?;
            let session = ctx.require_session()?;
            let token = ctx.access_token();

            let mut view = TradingView::new();
            view.draft.symbol = symbol;
            view.draft.side = side.parse().map_err(anyhow::Error::msg)?;
            view.draft.quantity = quantity;
            view.draft.entry_price = entry_price;
            view.draft.exit_price = exit_price.unwrap_or_default();
            if let Some(entry_date) = entry_date {
                view.draft.entry_date = entry_date;
            }
            view.draft.exit_date = exit_date.unwrap_or_default();
            view.draft.strategy = strategy.unwrap_or_default();
            view.draft.notes = notes.unwrap_or_default();
            view.draft.status = status.parse().map_err(anyhow::Error::msg)?;

            view.submit(&ctx.gateway, token.as_deref(), session.user_id)
                .await?;

            output_success(&output_format, "Trade recorded", None)
        }
    }
}

pub(crate) async fn render(ctx: &CliContext, output_format: &OutputFormat) -> anyhow::Result<()> {
    let session = ctx.require_session()?;
    let token = ctx.access_token();

    let mut view = TradingView::new();
    view.refresh(&ctx.gateway, token.as_deref(), session.user_id)
        .await;
    let stats = view.stats();
    let top = view.top_symbols(5);

    if let OutputFormat::Json = output_format {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "sample_data": view.using_samples,
                "stats": stats,
                "top_symbols": top,
                "trades": view.trades,
            }))?
        );
        return Ok(());
    }

    println!("Trading Journal{}", if view.using_samples { " (sample data)" } else { "" });
    println!(
        "  total P/L: {}   win rate: {}%   trades: {}   open: {}",
        stats.total_profit,
        stats.win_rate,
        view.trades.len(),
        stats.open_count
    );
    println!(
        "  invested: {}   current value: {}   wins: {}   losses: {}",
        stats.total_invested, stats.current_value, stats.winning, stats.losing
    );

    if !top.is_empty() {
        let ranked: Vec<String> = top
            .iter()
            .map(|s| format!("{}:{}", s.symbol, s.count))
            .collect();
        println!("  most traded: {}", ranked.join("  "));
    }

    println!();
    println!(
        "  {:<8} {:<6} {:>10} {:>10} {:>10} {:>14} {:<8}",
        "SYMBOL", "SIDE", "QTY", "ENTRY", "EXIT", "P/L", "STATUS"
    );
    for trade in &view.trades {
        let exit = trade
            .exit_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        let pl = match (trade.profit_loss, trade.profit_loss_percentage) {
            (Some(amount), Some(pct)) => format!("{} ({}%)", amount, pct),
            (Some(amount), None) => amount.to_string(),
            _ => "-".to_string(),
        };
        println!(
            "  {:<8} {:<6} {:>10} {:>10} {:>10} {:>14} {:<8}",
            trade.symbol,
            format!("{:?}", trade.side).to_lowercase(),
            trade.quantity,
            trade.entry_price,
            exit,
            pl,
            format!("{:?}", trade.status).to_lowercase()
        );
    }

    Ok(())
}
