use clap::Subcommand;
use uuid::Uuid;

use crate::cli::utils::output_success;
use crate::cli::{CliContext, OutputFormat};
use crate::records::{FlowKind, Month};
use crate::views::finance::FinanceView;

#[derive(Subcommand)]
pub enum FinanceCommands {
    #[command(about = "Show the month's transactions, budgets, and totals")]
    Show {
        #[arg(long, help = "Month to show (YYYY-MM, defaults to current)")]
        month: Option<String>,
    },

    #[command(about = "Record an income or expense transaction")]
    AddTransaction {
        #[arg(long, default_value = "expense", help = "income | expense")]
        kind: String,
        #[arg(long, help = "Amount")]
        amount: String,
        #[arg(long, help = "Description")]
        description: String,
        #[arg(long, help = "Category id or name")]
        category: String,
        #[arg(long, help = "Date (YYYY-MM-DD, defaults to today)")]
        date: Option<String>,
    },

    #[command(about = "Set a category budget for a month")]
    AddBudget {
        #[arg(long, help = "Category id or name")]
        category: String,
        #[arg(long, help = "Amount")]
        amount: String,
        #[arg(long, help = "Month (YYYY-MM, defaults to current)")]
        month: Option<String>,
    },

    #[command(about = "List selectable months")]
    Months,
}

pub async fn handle(cmd: FinanceCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        FinanceCommands::Show { month } => {
            let ctx = CliContext::connect().await?;
            ctx.require_session()?;
            let month = parse_month(month)?;
            render(&ctx, &output_format, month).await
        }
        FinanceCommands::AddTransaction {
            kind,
            amount,
            description,
            category,
            date,
        } => {
            let ctx = CliContext::connect().await?;
            let session = ctx.require_session()?;
            let token = ctx.access_token();

            let kind: FlowKind = kind.parse().map_err(anyhow::Error::msg)?;
            let mut view = FinanceView::new(Month::current());
            view.refresh(&ctx.gateway, token.as_deref(), session.user_id)
                .await;

            let category_id = resolve_category(&view, kind, &category)?;
            view.transaction_draft.kind = kind;
            view.transaction_draft.amount = amount;
            view.transaction_draft.description = description;
            view.transaction_draft.category = category_id.to_string();
            if let Some(date) = date {
                view.transaction_draft.date = date;
            }

            view.submit_transaction(&ctx.gateway, token.as_deref(), session.user_id)
                .await?;

            output_success(&output_format, "Transaction recorded", None)
        }
        FinanceCommands::AddBudget {
            category,
            amount,
            month,
        } => {
            let ctx = CliContext::connect().await?;
            let session = ctx.require_session()?;
            let token = ctx.access_token();

            let target_month = parse_month(month)?;
            let mut view = FinanceView::new(target_month);
            view.refresh(&ctx.gateway, token.as_deref(), session.user_id)
                .await;

            // Budgets may target any category kind
            let category_id = resolve_category_any(&view, &category)?;
            view.budget_draft.category = category_id.to_string();
            view.budget_draft.amount = amount;
            view.budget_draft.month = target_month.to_string();

            view.submit_budget(&ctx.gateway, token.as_deref(), session.user_id)
                .await?;

            output_success(&output_format, "Budget recorded", None)
        }
        FinanceCommands::Months => {
            let months = Month::current().recent(12);
            if let OutputFormat::Json = output_format {
                let values: Vec<String> = months.iter().map(Month::to_string).collect();
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else {
                for month in months {
                    println!("{}  {}", month, month.label());
                }
            }
            Ok(())
        }
    }
}

pub(crate) async fn render(
    ctx: &CliContext,
    output_format: &OutputFormat,
    month: Month,
) -> anyhow::Result<()> {
    let session = ctx.require_session()?;
    let token = ctx.access_token();

    let mut view = FinanceView::new(month);
    view.refresh(&ctx.gateway, token.as_deref(), session.user_id)
        .await;
    let summary = view.summary();

    if let OutputFormat::Json = output_format {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "month": month.to_string(),
                "summary": summary,
                "transactions": view.transactions,
                "budgets": view.budgets,
            }))?
        );
        return Ok(());
    }

    println!("Personal Finance — {}", month.label());
    println!(
        "  income: {}   expenses: {}   balance: {}   budget: {}",
        summary.income, summary.expenses, summary.balance, summary.total_budget
    );
    println!();
    println!(
        "  {:<12} {:<28} {:<18} {:>12} {:<8}",
        "DATE", "DESCRIPTION", "CATEGORY", "AMOUNT", "TYPE"
    );
    for transaction in &view.transactions {
        let category = transaction
            .categories
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("-");
        let sign = match transaction.kind {
            FlowKind::Income => "+",
            FlowKind::Expense => "-",
        };
        println!(
            "  {:<12} {:<28} {:<18} {:>11}{} {:<8}",
            transaction.date,
            transaction.description,
            category,
            transaction.amount,
            sign,
            format!("{:?}", transaction.kind).to_lowercase()
        );
    }

    if !view.budgets.is_empty() {
        println!();
        println!("  {:<18} {:>12}", "BUDGET CATEGORY", "AMOUNT");
        for budget in &view.budgets {
            let category = budget
                .categories
                .as_ref()
                .map(|c| c.name.as_str())
                .unwrap_or("-");
            println!("  {:<18} {:>12}", category, budget.amount);
        }
    }

    Ok(())
}

fn parse_month(month: Option<String>) -> anyhow::Result<Month> {
    match month {
        Some(text) => Ok(text.parse()?),
        None => Ok(Month::current()),
    }
}

/// Accept either a category id or a (case-insensitive) category name valid
/// for the transaction kind.
fn resolve_category(view: &FinanceView, kind: FlowKind, input: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = input.parse::<Uuid>() {
        return Ok(id);
    }

    let choices = view.category_choices(kind);
    choices
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(input))
        .map(|c| c.id)
        .ok_or_else(|| {
            let names: Vec<&str> = choices.iter().map(|c| c.name.as_str()).collect();
            anyhow::anyhow!(
                "unknown category '{}'; choices for {:?}: {}",
                input,
                kind,
                names.join(", ")
            )
        })
}

fn resolve_category_any(view: &FinanceView, input: &str) -> anyhow::Result<Uuid> {
    if let Ok(id) = input.parse::<Uuid>() {
        return Ok(id);
    }

    view.categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(input))
        .map(|c| c.id)
        .ok_or_else(|| anyhow::anyhow!("unknown category '{}'", input))
}
