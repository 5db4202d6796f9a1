//! Trading journal: trade list, performance statistics, and the add-trade
//! form with derived profit/loss for closed trades.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{optional, parse_amount, parse_date, required, today_iso, SubmitError};
use crate::filter::Filter;
use crate::gateway::{Gateway, GatewayError};
use crate::records::{NewTrade, Trade, TradeSide, TradeStatus};

#[derive(Debug, Clone)]
pub struct TradeDraft {
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: String,
    pub entry_price: String,
    pub exit_price: String,
    pub entry_date: String,
    pub exit_date: String,
    pub strategy: String,
    pub notes: String,
    pub status: TradeStatus,
}

impl Default for TradeDraft {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            side: TradeSide::Buy,
            quantity: String::new(),
            entry_price: String::new(),
            exit_price: String::new(),
            entry_date: today_iso(),
            exit_date: String::new(),
            strategy: String::new(),
            notes: String::new(),
            status: TradeStatus::Open,
        }
    }
}

impl TradeDraft {
    fn parse(&self, user_id: Uuid) -> Result<NewTrade, SubmitError> {
        let quantity: i64 = self
            .quantity
            .trim()
            .parse()
            .map_err(|_| SubmitError::invalid("quantity", "must be a whole number"))?;
        if quantity <= 0 {
            return Err(SubmitError::invalid("quantity", "must be positive"));
        }

        let exit_price = match optional(&self.exit_price) {
            Some(text) => Some(parse_amount("exit_price", &text)?),
            None => None,
        };
        let exit_date = match optional(&self.exit_date) {
            Some(text) => Some(parse_date("exit_date", &text)?),
            None => None,
        };

        let mut trade = NewTrade {
            user_id,
            symbol: required("symbol", &self.symbol)?.to_uppercase(),
            side: self.side,
            quantity,
            entry_price: parse_amount("entry_price", &self.entry_price)?,
            exit_price,
            entry_date: parse_date("entry_date", &self.entry_date)?,
            exit_date,
            strategy: optional(&self.strategy),
            notes: optional(&self.notes),
            status: self.status,
            profit_loss: None,
            profit_loss_percentage: None,
        };
        trade.finalize_result();
        Ok(trade)
    }
}

/// Statistics over the loaded trade list. Pure function of the list.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TradeStats {
    pub total_profit: Decimal,
    pub winning: usize,
    pub losing: usize,
    pub open_count: usize,
    pub closed_count: usize,
    /// Winning share of closed trades as a percentage; 0 with no closed trades.
    pub win_rate: Decimal,
    pub total_invested: Decimal,
    pub current_value: Decimal,
}

pub fn statistics(trades: &[Trade]) -> TradeStats {
    let closed: Vec<&Trade> = trades
        .iter()
        .filter(|t| t.status == TradeStatus::Closed)
        .collect();
    let open_count = trades.len() - closed.len();

    let total_profit: Decimal = closed
        .iter()
        .filter_map(|t| t.profit_loss)
        .sum();
    let winning = closed
        .iter()
        .filter(|t| t.profit_loss.unwrap_or(Decimal::ZERO) > Decimal::ZERO)
        .count();
    let losing = closed
        .iter()
        .filter(|t| t.profit_loss.unwrap_or(Decimal::ZERO) < Decimal::ZERO)
        .count();

    let win_rate = if closed.is_empty() {
        Decimal::ZERO
    } else {
        (Decimal::from(winning as i64) / Decimal::from(closed.len() as i64)
            * Decimal::from(100))
        .round_dp(2)
    };

    let total_invested: Decimal = trades
        .iter()
        .map(|t| Decimal::from(t.quantity) * t.entry_price)
        .sum();

    // Open positions carry no live quote; mark them at entry plus the fixed
    // 2% placeholder markup the upstream dashboard used.
    let open_markup = Decimal::new(102, 2);
    let current_value: Decimal = trades
        .iter()
        .map(|t| {
            let quantity = Decimal::from(t.quantity);
            match t.status {
                TradeStatus::Closed => quantity * t.exit_price.unwrap_or(Decimal::ZERO),
                TradeStatus::Open => quantity * t.entry_price * open_markup,
            }
        })
        .sum();

    TradeStats {
        total_profit,
        winning,
        losing,
        open_count,
        closed_count: closed.len(),
        win_rate,
        total_invested,
        current_value,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SymbolCount {
    pub symbol: String,
    pub count: usize,
}

/// Count-ranked symbols, most traded first. The sort is stable, so symbols
/// with equal counts keep their first-encounter order.
pub fn top_symbols(trades: &[Trade], limit: usize) -> Vec<SymbolCount> {
    let mut counts: Vec<SymbolCount> = Vec::new();
    for trade in trades {
        match counts.iter_mut().find(|c| c.symbol == trade.symbol) {
            Some(entry) => entry.count += 1,
            None => counts.push(SymbolCount {
                symbol: trade.symbol.clone(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Built-in demo dataset served when the trade read fails or comes back
/// empty. Not a cache: nothing is persisted.
pub fn sample_trades() -> Vec<Trade> {
    // dates are fixed constants, always valid
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();

    vec![
        Trade {
            id: Uuid::from_u128(1),
            user_id: None,
            symbol: "PTT".into(),
            side: TradeSide::Buy,
            quantity: 1000,
            entry_price: Decimal::new(3550, 2),
            exit_price: Some(Decimal::new(3875, 2)),
            entry_date: date(2024, 1, 15),
            exit_date: Some(date(2024, 1, 20)),
            strategy: Some("Swing Trading".into()),
            notes: Some("Bought into the uptrend".into()),
            status: TradeStatus::Closed,
            profit_loss: Some(Decimal::from(3250)),
            profit_loss_percentage: Some(Decimal::new(915, 2)),
        },
        Trade {
            id: Uuid::from_u128(2),
            user_id: None,
            symbol: "CPALL".into(),
            side: TradeSide::Buy,
            quantity: 500,
            entry_price: Decimal::new(6500, 2),
            exit_price: Some(Decimal::new(6850, 2)),
            entry_date: date(2024, 1, 18),
            exit_date: Some(date(2024, 1, 25)),
            strategy: Some("Value Investing".into()),
            notes: Some("Priced below average".into()),
            status: TradeStatus::Closed,
            profit_loss: Some(Decimal::from(1750)),
            profit_loss_percentage: Some(Decimal::new(538, 2)),
        },
        Trade {
            id: Uuid::from_u128(3),
            user_id: None,
            symbol: "KBANK".into(),
            side: TradeSide::Buy,
            quantity: 800,
            entry_price: Decimal::new(14250, 2),
            exit_price: None,
            entry_date: date(2024, 1, 22),
            exit_date: None,
            strategy: Some("Long Term".into()),
            notes: Some("Long-term position".into()),
            status: TradeStatus::Open,
            profit_loss: Some(Decimal::from(4400)),
            profit_loss_percentage: Some(Decimal::new(386, 2)),
        },
    ]
}

#[derive(Default)]
pub struct TradingView {
    pub trades: Vec<Trade>,
    pub draft: TradeDraft,
    /// Whether the current list is the demo dataset rather than real rows.
    pub using_samples: bool,
}

impl TradingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the user's trades, newest entry first. A failed or empty read
    /// substitutes the sample dataset.
    pub async fn refresh(&mut self, gateway: &Gateway, access_token: Option<&str>, user_id: Uuid) {
        match fetch_trades(gateway, access_token, user_id).await {
            Ok(rows) if !rows.is_empty() => {
                self.trades = rows;
                self.using_samples = false;
            }
            Ok(_) => {
                self.trades = sample_trades();
                self.using_samples = true;
            }
            Err(err) => {
                if err.is_relation_missing() {
                    tracing::debug!("trades relation missing, serving sample data");
                } else {
                    tracing::warn!("failed to fetch trades, serving sample data: {}", err);
                }
                self.trades = sample_trades();
                self.using_samples = true;
            }
        }
    }

    pub fn stats(&self) -> TradeStats {
        statistics(&self.trades)
    }

    pub fn top_symbols(&self, limit: usize) -> Vec<SymbolCount> {
        top_symbols(&self.trades, limit)
    }

    pub async fn submit(
        &mut self,
        gateway: &Gateway,
        access_token: Option<&str>,
        user_id: Uuid,
    ) -> Result<(), SubmitError> {
        let row = self.draft.parse(user_id)?;
        gateway.insert(access_token, "trades", &[row]).await?;

        self.draft = TradeDraft::default();
        self.refresh(gateway, access_token, user_id).await;
        Ok(())
    }
}

async fn fetch_trades(
    gateway: &Gateway,
    access_token: Option<&str>,
    user_id: Uuid,
) -> Result<Vec<Trade>, GatewayError> {
    let mut filter = Filter::new("trades")?;
    filter.eq("user_id", user_id)?.order("entry_date desc")?;
    gateway.select(access_token, &filter).await
}
