//! Main dashboard: cross-app summary stats. Each stat is sourced from its
//! own read and degrades to zero independently, so one failing table never
//! blanks the whole screen.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::filter::Filter;
use crate::gateway::{Gateway, GatewayError};
use crate::records::{FlowKind, Month, TradeStatus};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DashboardStats {
    /// Sum of all portfolio values.
    pub portfolio_value: Decimal,
    /// Current-month income minus expenses.
    pub personal_balance: Decimal,
    /// Realized profit over closed trades.
    pub trading_profit: Decimal,
    /// Loaded transaction and trade rows backing the stats above.
    pub total_transactions: usize,
}

pub async fn load_stats(
    gateway: &Gateway,
    access_token: Option<&str>,
    user_id: Uuid,
) -> DashboardStats {
    let month = Month::current();
    let (portfolio_value, (personal_balance, transaction_count), (trading_profit, trade_count)) =
        futures::join!(
            fetch_portfolio_value(gateway, access_token),
            fetch_personal_balance(gateway, access_token, user_id, month),
            fetch_trading_profit(gateway, access_token, user_id),
        );

    DashboardStats {
        portfolio_value,
        personal_balance,
        trading_profit,
        total_transactions: transaction_count + trade_count,
    }
}

async fn fetch_portfolio_value(gateway: &Gateway, access_token: Option<&str>) -> Decimal {
    #[derive(Deserialize)]
    struct ValueRow {
        #[serde(default)]
        total_value: Decimal,
    }

    let result: Result<Vec<ValueRow>, GatewayError> = async {
        let mut filter = Filter::new("portfolios")?;
        filter.select(vec!["total_value".to_string()])?;
        gateway.select(access_token, &filter).await
    }
    .await;

    match result {
        Ok(rows) => rows.iter().map(|r| r.total_value).sum(),
        Err(err) => {
            tracing::warn!("failed to fetch portfolio totals: {}", err);
            Decimal::ZERO
        }
    }
}

async fn fetch_personal_balance(
    gateway: &Gateway,
    access_token: Option<&str>,
    user_id: Uuid,
    month: Month,
) -> (Decimal, usize) {
    #[derive(Deserialize)]
    struct FlowRow {
        #[serde(rename = "type")]
        kind: FlowKind,
        amount: Decimal,
    }

    let result: Result<Vec<FlowRow>, GatewayError> = async {
        let mut filter = Filter::new("transactions")?;
        filter
            .select(vec!["type".to_string(), "amount".to_string()])?
            .eq("user_id", user_id)?
            .gte("date", month.first_day())?
            .lt("date", month.next().first_day())?;
        gateway.select(access_token, &filter).await
    }
    .await;

    match result {
        Ok(rows) => {
            let balance = rows
                .iter()
                .map(|r| match r.kind {
                    FlowKind::Income => r.amount,
                    FlowKind::Expense => -r.amount,
                })
                .sum();
            (balance, rows.len())
        }
        Err(err) => {
            tracing::warn!("failed to fetch month balance: {}", err);
            (Decimal::ZERO, 0)
        }
    }
}

async fn fetch_trading_profit(
    gateway: &Gateway,
    access_token: Option<&str>,
    user_id: Uuid,
) -> (Decimal, usize) {
    #[derive(Deserialize)]
    struct ProfitRow {
        #[serde(default)]
        profit_loss: Option<Decimal>,
        status: TradeStatus,
    }

    let result: Result<Vec<ProfitRow>, GatewayError> = async {
        let mut filter = Filter::new("trades")?;
        filter
            .select(vec!["profit_loss".to_string(), "status".to_string()])?
            .eq("user_id", user_id)?;
        gateway.select(access_token, &filter).await
    }
    .await;

    match result {
        Ok(rows) => {
            let profit = rows
                .iter()
                .filter(|r| r.status == TradeStatus::Closed)
                .filter_map(|r| r.profit_loss)
                .sum();
            (profit, rows.len())
        }
        Err(err) => {
            tracing::warn!("failed to fetch trading profit: {}", err);
            (Decimal::ZERO, 0)
        }
    }
}
