//! Personal finance: month-windowed transactions, budgets, and categories.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{parse_amount, parse_date, parse_uuid, required, today_iso, SubmitError};
use crate::filter::Filter;
use crate::gateway::{Gateway, GatewayError};
use crate::records::{
    Budget, Category, FlowKind, Month, NewBudget, NewTransaction, Transaction,
};

/// Form state for a new transaction. Numeric and date fields stay text
/// until submission, when they are parsed and validated.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub kind: FlowKind,
    pub amount: String,
    pub description: String,
    /// Category id as text (picked from `category_choices`).
    pub category: String,
    pub date: String,
}

impl Default for TransactionDraft {
    fn default() -> Self {
        Self {
            kind: FlowKind::Expense,
            amount: String::new(),
            description: String::new(),
            category: String::new(),
            date: today_iso(),
        }
    }
}

impl TransactionDraft {
    fn parse(&self, user_id: Uuid) -> Result<NewTransaction, SubmitError> {
        Ok(NewTransaction {
            user_id,
            kind: self.kind,
            amount: parse_amount("amount", &self.amount)?,
            description: required("description", &self.description)?,
            category: parse_uuid("category", &self.category)?,
            date: parse_date("date", &self.date)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BudgetDraft {
    pub category: String,
    pub amount: String,
    pub month: String,
}

impl Default for BudgetDraft {
    fn default() -> Self {
        Self {
            category: String::new(),
            amount: String::new(),
            month: Month::current().to_string(),
        }
    }
}

impl BudgetDraft {
    fn parse(&self, user_id: Uuid) -> Result<NewBudget, SubmitError> {
        let month: Month = self
            .month
            .trim()
            .parse()
            .map_err(|e: crate::records::month::InvalidMonth| {
                SubmitError::invalid("month", e.to_string())
            })?;
        Ok(NewBudget {
            user_id,
            category: parse_uuid("category", &self.category)?,
            amount: parse_amount("amount", &self.amount)?,
            month,
        })
    }
}

/// Totals derived from the loaded month. Pure function of the lists.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MonthSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
    pub total_budget: Decimal,
}

pub fn summarize(transactions: &[Transaction], budgets: &[Budget]) -> MonthSummary {
    let income: Decimal = transactions
        .iter()
        .filter(|t| t.kind == FlowKind::Income)
        .map(|t| t.amount)
        .sum();
    let expenses: Decimal = transactions
        .iter()
        .filter(|t| t.kind == FlowKind::Expense)
        .map(|t| t.amount)
        .sum();
    let total_budget: Decimal = budgets.iter().map(|b| b.amount).sum();

    MonthSummary {
        income,
        expenses,
        balance: income - expenses,
        total_budget,
    }
}

pub struct FinanceView {
    pub month: Month,
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    pub categories: Vec<Category>,
    pub transaction_draft: TransactionDraft,
    pub budget_draft: BudgetDraft,
}

impl FinanceView {
    pub fn new(month: Month) -> Self {
        Self {
            month,
            transactions: Vec::new(),
            budgets: Vec::new(),
            categories: Vec::new(),
            transaction_draft: TransactionDraft::default(),
            budget_draft: BudgetDraft::default(),
        }
    }

    /// Change the selected month. Callers re-`refresh` afterwards, matching
    /// the view's activation behavior.
    pub fn set_month(&mut self, month: Month) {
        self.month = month;
    }

    /// Load the month's transactions, its budgets, and the category list.
    /// The three reads run concurrently; each degrades to empty on failure.
    pub async fn refresh(&mut self, gateway: &Gateway, access_token: Option<&str>, user_id: Uuid) {
        let (transactions, budgets, categories) = futures::join!(
            fetch_transactions(gateway, access_token, user_id, self.month),
            fetch_budgets(gateway, access_token, user_id, self.month),
            fetch_categories(gateway, access_token),
        );
        self.transactions = transactions;
        self.budgets = budgets;
        self.categories = categories;
    }

    pub fn summary(&self) -> MonthSummary {
        summarize(&self.transactions, &self.budgets)
    }

    /// Categories offered for a transaction of the given kind.
    pub fn category_choices(&self, kind: FlowKind) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|c| c.kind.accepts(kind))
            .collect()
    }

    pub async fn submit_transaction(
        &mut self,
        gateway: &Gateway,
        access_token: Option<&str>,
        user_id: Uuid,
    ) -> Result<(), SubmitError> {
        let row = self.transaction_draft.parse(user_id)?;
        gateway
            .insert(access_token, "transactions", &[row])
            .await?;

        self.transaction_draft = TransactionDraft::default();
        self.transactions = fetch_transactions(gateway, access_token, user_id, self.month).await;
        Ok(())
    }

    pub async fn submit_budget(
        &mut self,
        gateway: &Gateway,
        access_token: Option<&str>,
        user_id: Uuid,
    ) -> Result<(), SubmitError> {
        let row = self.budget_draft.parse(user_id)?;
        gateway.insert(access_token, "budgets", &[row]).await?;

        self.budget_draft = BudgetDraft::default();
        self.budgets = fetch_budgets(gateway, access_token, user_id, self.month).await;
        Ok(())
    }
}

async fn fetch_transactions(
    gateway: &Gateway,
    access_token: Option<&str>,
    user_id: Uuid,
    month: Month,
) -> Vec<Transaction> {
    let result: Result<Vec<Transaction>, GatewayError> = async {
        let mut filter = Filter::new("transactions")?;
        filter
            .embed("categories", &["name", "color"])?
            .eq("user_id", user_id)?
            .gte("date", month.first_day())?
            .lt("date", month.next().first_day())?
            .order("date desc")?;
        gateway.select(access_token, &filter).await
    }
    .await;

    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!("failed to fetch transactions: {}", err);
            Vec::new()
        }
    }
}

async fn fetch_budgets(
    gateway: &Gateway,
    access_token: Option<&str>,
    user_id: Uuid,
    month: Month,
) -> Vec<Budget> {
    let result: Result<Vec<Budget>, GatewayError> = async {
        let mut filter = Filter::new("budgets")?;
        filter
            .embed("categories", &["name", "color"])?
            .eq("user_id", user_id)?
            .eq("month", month)?;
        gateway.select(access_token, &filter).await
    }
    .await;

    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!("failed to fetch budgets: {}", err);
            Vec::new()
        }
    }
}

async fn fetch_categories(gateway: &Gateway, access_token: Option<&str>) -> Vec<Category> {
    let result: Result<Vec<Category>, GatewayError> = async {
        let mut filter = Filter::new("categories")?;
        filter.order("name")?;
        gateway.select(access_token, &filter).await
    }
    .await;

    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!("failed to fetch categories: {}", err);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn transaction(kind: FlowKind, amount: &str) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            kind,
            amount: dec(amount),
            description: "test".into(),
            category: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            categories: None,
        }
    }

    fn budget(amount: &str) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            category: None,
            amount: dec(amount),
            month: "2024-01".parse().unwrap(),
            categories: None,
        }
    }

    #[test]
    fn summary_totals() {
        let transactions = vec![
            transaction(FlowKind::Income, "50000"),
            transaction(FlowKind::Expense, "1200.50"),
            transaction(FlowKind::Expense, "799.50"),
            transaction(FlowKind::Income, "1500"),
        ];
        let budgets = vec![budget("3000"), budget("2000")];

        let summary = summarize(&transactions, &budgets);
        assert_eq!(summary.income, dec("51500"));
        assert_eq!(summary.expenses, dec("2000.00"));
        assert_eq!(summary.balance, dec("49500.00"));
        assert_eq!(summary.total_budget, dec("5000"));
    }

    #[test]
    fn summary_is_idempotent_over_unchanged_list() {
        let transactions = vec![
            transaction(FlowKind::Income, "100"),
            transaction(FlowKind::Expense, "40"),
        ];
        let budgets = vec![budget("25")];

        let first = summarize(&transactions, &budgets);
        let second = summarize(&transactions, &budgets);
        assert_eq!(first, second);
    }

    #[test]
    fn summary_of_empty_lists_is_zero() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.income, Decimal::ZERO);
        assert_eq!(summary.expenses, Decimal::ZERO);
        assert_eq!(summary.balance, Decimal::ZERO);
        assert_eq!(summary.total_budget, Decimal::ZERO);
    }

    #[test]
    fn category_choices_respect_kind() {
        use crate::records::CategoryKind;

        let mut view = FinanceView::new("2024-01".parse().unwrap());
        view.categories = vec![
            Category {
                id: Uuid::new_v4(),
                name: "Salary".into(),
                kind: CategoryKind::Income,
                color: "#10b981".into(),
            },
            Category {
                id: Uuid::new_v4(),
                name: "Food".into(),
                kind: CategoryKind::Expense,
                color: "#ef4444".into(),
            },
            Category {
                id: Uuid::new_v4(),
                name: "Other".into(),
                kind: CategoryKind::Both,
                color: "#6b7280".into(),
            },
        ];

        let income_names: Vec<&str> = view
            .category_choices(FlowKind::Income)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(income_names, ["Salary", "Other"]);

        let expense_names: Vec<&str> = view
            .category_choices(FlowKind::Expense)
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(expense_names, ["Food", "Other"]);
    }

    #[test]
    fn transaction_draft_rejects_bad_amount() {
        let draft = TransactionDraft {
            amount: "not-a-number".into(),
            description: "lunch".into(),
            category: Uuid::nil().to_string(),
            ..TransactionDraft::default()
        };
        assert!(matches!(
            draft.parse(Uuid::nil()),
            Err(SubmitError::Invalid { field: "amount", .. })
        ));
    }

    #[test]
    fn transaction_draft_parses_valid_input() {
        let draft = TransactionDraft {
            kind: FlowKind::Income,
            amount: "1234.56".into(),
            description: "salary".into(),
            category: Uuid::nil().to_string(),
            date: "2024-01-31".into(),
        };
        let row = draft.parse(Uuid::nil()).unwrap();
        assert_eq!(row.amount, dec("1234.56"));
        assert_eq!(row.kind, FlowKind::Income);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }
}
