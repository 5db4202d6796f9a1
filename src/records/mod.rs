//! Typed schemas for every record that crosses the gateway boundary.
//!
//! The gateway itself is schemaless from the client's point of view (generic
//! table endpoints), so each table's shape is pinned down here and validated
//! by serde when responses are decoded. Read types carry server-generated
//! fields (`id`); the `New*` types are the insert payloads.

pub mod month;

pub use month::Month;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity established by a successful sign-in, sign-up, or restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// Coarse user role derived by probing the `clients` table.
///
/// `Ic` (investment consultant) manages client records; `Client` sees only
/// their own portfolio. The role is a heuristic, not an authorization
/// decision; the fallback on ambiguity is a config policy, not a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Ic,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Ic => "ic",
            Role::Client => "client",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ic" => Ok(Role::Ic),
            "client" => Ok(Role::Client),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl std::str::FromStr for RiskProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "conservative" => Ok(RiskProfile::Conservative),
            "moderate" => Ok(RiskProfile::Moderate),
            "aggressive" => Ok(RiskProfile::Aggressive),
            other => Err(format!("unknown risk profile: {}", other)),
        }
    }
}

/// Direction of a personal-finance transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Income,
    Expense,
}

impl std::str::FromStr for FlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "income" => Ok(FlowKind::Income),
            "expense" => Ok(FlowKind::Expense),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

/// Which transaction kinds a category applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
    Both,
}

impl CategoryKind {
    /// Whether a category of this kind is offered for a transaction of `kind`.
    pub fn accepts(&self, kind: FlowKind) -> bool {
        match self {
            CategoryKind::Both => true,
            CategoryKind::Income => kind == FlowKind::Income,
            CategoryKind::Expense => kind == FlowKind::Expense,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl std::str::FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            other => Err(format!("unknown trade side: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl std::str::FromStr for TradeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            other => Err(format!("unknown trade status: {}", other)),
        }
    }
}

/// Advisor-owned customer record from the `clients` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub risk_profile: RiskProfile,
    pub initial_capital: Decimal,
    #[serde(default)]
    pub ic_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewClient {
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub risk_profile: RiskProfile,
    pub initial_capital: Decimal,
    pub ic_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: Uuid,
    pub client_id: Uuid,
    #[serde(default)]
    pub total_value: Decimal,
    #[serde(default)]
    pub total_return: Decimal,
    #[serde(default)]
    pub return_percentage: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPortfolio {
    pub client_id: Uuid,
    pub total_value: Decimal,
    pub total_return: Decimal,
    pub return_percentage: Decimal,
}

impl NewPortfolio {
    /// The initial portfolio created alongside a new client: total value is
    /// the client's initial capital, returns start at zero.
    pub fn initial(client_id: Uuid, initial_capital: Decimal) -> Self {
        Self {
            client_id,
            total_value: initial_capital,
            total_return: Decimal::ZERO,
            return_percentage: Decimal::ZERO,
        }
    }
}

/// Category name and color embedded into transaction/budget reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTag {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    pub color: &'static str,
}

/// The fixed category set seeded by `finboard init seed` when the
/// `categories` table is empty.
pub fn default_categories() -> Vec<NewCategory> {
    use CategoryKind::*;

    vec![
        NewCategory { name: "Food", kind: Expense, color: "#ef4444" },
        NewCategory { name: "Transport", kind: Expense, color: "#f97316" },
        NewCategory { name: "Shopping", kind: Expense, color: "#eab308" },
        NewCategory { name: "Housing", kind: Expense, color: "#22c55e" },
        NewCategory { name: "Health", kind: Expense, color: "#06b6d4" },
        NewCategory { name: "Entertainment", kind: Expense, color: "#8b5cf6" },
        NewCategory { name: "Salary", kind: Income, color: "#10b981" },
        NewCategory { name: "Business", kind: Income, color: "#3b82f6" },
        NewCategory { name: "Investment", kind: Income, color: "#6366f1" },
        NewCategory { name: "Other", kind: Both, color: "#6b7280" },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: FlowKind,
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub category: Option<Uuid>,
    pub date: NaiveDate,
    /// Embedded category tag when the read joins `categories (name, color)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryTag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTransaction {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: FlowKind,
    pub amount: Decimal,
    pub description: String,
    pub category: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub category: Option<Uuid>,
    pub amount: Decimal,
    pub month: Month,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryTag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBudget {
    pub user_id: Uuid,
    pub category: Uuid,
    pub amount: Decimal,
    pub month: Month,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub quantity: i64,
    pub entry_price: Decimal,
    #[serde(default)]
    pub exit_price: Option<Decimal>,
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub exit_date: Option<NaiveDate>,
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub status: TradeStatus,
    #[serde(default)]
    pub profit_loss: Option<Decimal>,
    #[serde(default)]
    pub profit_loss_percentage: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTrade {
    pub user_id: Uuid,
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: TradeSide,
    pub quantity: i64,
    pub entry_price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<Decimal>,
    pub entry_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: TradeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_loss_percentage: Option<Decimal>,
}

impl NewTrade {
    /// Fill in the derived profit/loss fields for a closed trade with a
    /// known exit price: `pl = qty * (exit - entry)` and
    /// `pl% = pl / (qty * entry) * 100`, rounded to two decimal places.
    /// Open trades and closed trades without an exit price are left as-is.
    pub fn finalize_result(&mut self) {
        if self.status != TradeStatus::Closed {
            return;
        }
        let Some(exit) = self.exit_price else { return };

        let quantity = Decimal::from(self.quantity);
        let cost = quantity * self.entry_price;
        let profit = quantity * (exit - self.entry_price);

        let percentage = if cost.is_zero() {
            Decimal::ZERO
        } else {
            (profit / cost * Decimal::from(100)).round_dp(2)
        };

        self.profit_loss = Some(profit.round_dp(2));
        self.profit_loss_percentage = Some(percentage);
    }
}
