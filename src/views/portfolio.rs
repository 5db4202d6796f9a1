//! Portfolio dashboard: advisor-facing client management plus portfolio
//! aggregates. The client-facing variant of the screen renders from the same
//! state, scoped to the viewer's own records.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::{optional, parse_amount, required, SubmitError};
use crate::filter::Filter;
use crate::gateway::{Gateway, GatewayError};
use crate::records::{ClientRecord, NewClient, NewPortfolio, Portfolio, RiskProfile};

#[derive(Debug, Clone)]
pub struct ClientDraft {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub risk_profile: RiskProfile,
    pub initial_capital: String,
}

impl Default for ClientDraft {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            risk_profile: RiskProfile::Moderate,
            initial_capital: String::new(),
        }
    }
}

impl ClientDraft {
    fn parse(&self, advisor_id: Uuid) -> Result<NewClient, SubmitError> {
        Ok(NewClient {
            full_name: required("full_name", &self.full_name)?,
            email: required("email", &self.email)?,
            phone: optional(&self.phone),
            risk_profile: self.risk_profile,
            initial_capital: parse_amount("initial_capital", &self.initial_capital)?,
            ic_id: advisor_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PortfolioSummary {
    pub client_count: usize,
    pub total_value: Decimal,
    pub total_return: Decimal,
    /// Mean of the per-portfolio return percentages; 0 with no portfolios.
    pub avg_return_percentage: Decimal,
}

pub fn summarize(clients: &[ClientRecord], portfolios: &[Portfolio]) -> PortfolioSummary {
    let total_value: Decimal = portfolios.iter().map(|p| p.total_value).sum();
    let total_return: Decimal = portfolios.iter().map(|p| p.total_return).sum();

    let avg_return_percentage = if portfolios.is_empty() {
        Decimal::ZERO
    } else {
        let sum: Decimal = portfolios.iter().map(|p| p.return_percentage).sum();
        (sum / Decimal::from(portfolios.len() as i64)).round_dp(2)
    };

    PortfolioSummary {
        client_count: clients.len(),
        total_value,
        total_return,
        avg_return_percentage,
    }
}

#[derive(Default)]
pub struct PortfolioView {
    pub clients: Vec<ClientRecord>,
    pub portfolios: Vec<Portfolio>,
    pub draft: ClientDraft,
}

impl PortfolioView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load clients and portfolios concurrently; each read degrades to an
    /// empty list on failure.
    pub async fn refresh(&mut self, gateway: &Gateway, access_token: Option<&str>) {
        let (clients, portfolios) = futures::join!(
            fetch_clients(gateway, access_token),
            fetch_portfolios(gateway, access_token),
        );
        self.clients = clients;
        self.portfolios = portfolios;
    }

    pub fn summary(&self) -> PortfolioSummary {
        summarize(&self.clients, &self.portfolios)
    }

    /// Insert a new client, then create their initial portfolio seeded with
    /// the initial capital. The two writes are independent: a portfolio
    /// failure after a successful client insert is not rolled back.
    pub async fn add_client(
        &mut self,
        gateway: &Gateway,
        access_token: Option<&str>,
        advisor_id: Uuid,
    ) -> Result<(), SubmitError> {
        let client = self.draft.parse(advisor_id)?;
        let initial_capital = client.initial_capital;

        let created: Vec<ClientRecord> = gateway
            .insert_returning(access_token, "clients", &[client])
            .await?;

        if let Some(created) = created.first() {
            let portfolio = NewPortfolio::initial(created.id, initial_capital);
            if let Err(err) = gateway
                .insert(access_token, "portfolios", &[portfolio])
                .await
            {
                tracing::error!(
                    "client {} created but initial portfolio insert failed (no rollback): {}",
                    created.id,
                    err
                );
                return Err(err.into());
            }
        }

        self.draft = ClientDraft::default();
        self.refresh(gateway, access_token).await;
        Ok(())
    }
}

async fn fetch_clients(gateway: &Gateway, access_token: Option<&str>) -> Vec<ClientRecord> {
    let result: Result<Vec<ClientRecord>, GatewayError> = async {
        let filter = Filter::new("clients")?;
        gateway.select(access_token, &filter).await
    }
    .await;

    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!("failed to fetch clients: {}", err);
            Vec::new()
        }
    }
}

async fn fetch_portfolios(gateway: &Gateway, access_token: Option<&str>) -> Vec<Portfolio> {
    let result: Result<Vec<Portfolio>, GatewayError> = async {
        let filter = Filter::new("portfolios")?;
        gateway.select(access_token, &filter).await
    }
    .await;

    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::warn!("failed to fetch portfolios: {}", err);
            Vec::new()
        }
    }
}
