//! HTTP adapter over the hosted data gateway.
//!
//! The gateway is an external collaborator exposing auth endpoints
//! (`auth/v1/*`) and generic table endpoints (`rest/v1/{table}`). This module
//! owns request assembly, header conventions (public API key plus bearer
//! token) and error classification; everything above it works with typed
//! records.

pub mod auth;
pub mod error;

pub use auth::{AuthSession, SignUpOutcome};
pub use error::{AuthError, GatewayError};

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::GatewayConfig;
use crate::filter::Filter;
use error::ErrorBody;

pub struct Gateway {
    base: Url,
    anon_key: String,
    client: reqwest::Client,
}

impl Gateway {
    pub fn new(url: &str, anon_key: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let mut base = Url::parse(url).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;
        // Url::join treats a base without a trailing slash as a file path
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base,
            anon_key: anon_key.to_string(),
            client,
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(
            &config.url,
            &config.anon_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::InvalidUrl(e.to_string()))
    }

    pub(crate) fn anon_key(&self) -> &str {
        &self.anon_key
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    fn bearer(&self, access_token: Option<&str>) -> String {
        format!("Bearer {}", access_token.unwrap_or(&self.anon_key))
    }

    /// Read rows from a table. The filter supplies the table name, the
    /// where/order/limit query pairs, and any embedded columns.
    pub async fn select<T: DeserializeOwned>(
        &self,
        access_token: Option<&str>,
        filter: &Filter,
    ) -> Result<Vec<T>, GatewayError> {
        let url = self.endpoint(&format!("rest/v1/{}", filter.table()))?;
        let response = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, self.bearer(access_token))
            .query(&filter.to_query_pairs())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(classify_table_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// Insert rows, discarding the created representation.
    pub async fn insert<B: Serialize>(
        &self,
        access_token: Option<&str>,
        table: &str,
        rows: &[B],
    ) -> Result<(), GatewayError> {
        // Validates the table name
        Filter::new(table)?;

        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, self.bearer(access_token))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(classify_table_error(response).await);
        }

        Ok(())
    }

    /// Insert rows and return the created records, ids included.
    pub async fn insert_returning<B: Serialize, T: DeserializeOwned>(
        &self,
        access_token: Option<&str>,
        table: &str,
        rows: &[B],
    ) -> Result<Vec<T>, GatewayError> {
        Filter::new(table)?;

        let url = self.endpoint(&format!("rest/v1/{}", table))?;
        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, self.bearer(access_token))
            .header("Prefer", "return=representation")
            .json(rows)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(classify_table_error(response).await);
        }

        Ok(response.json().await?)
    }
}

/// Map a non-success table response into the error taxonomy. The
/// relation-missing class is recognized by the remote error code (`42P01`
/// from the database, `PGRST205` from the REST layer) or its message.
async fn classify_table_error(response: reqwest::Response) -> GatewayError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let body = ErrorBody::parse(&text);
    let message = body.best_message(&format!("status {}", status));

    let relation_missing = matches!(body.code.as_deref(), Some("42P01") | Some("PGRST205"))
        || message.contains("does not exist")
        || message.contains("Could not find the table");

    if relation_missing {
        GatewayError::RelationMissing(message)
    } else {
        GatewayError::Status {
            status,
            code: body.code,
            message,
        }
    }
}
