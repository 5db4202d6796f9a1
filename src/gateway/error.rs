use thiserror::Error;

/// Error body shape returned by the gateway's auth and table endpoints.
/// The two surfaces use different field names, so all are optional.
#[derive(Debug, Default, serde::Deserialize)]
pub(crate) struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub msg: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn best_message(&self, fallback: &str) -> String {
        self.message
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.error_description.clone())
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Gateway returned {status}: {message}")]
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Relation does not exist: {0}")]
    RelationMissing(String),

    #[error("Failed to decode gateway response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Filter(#[from] crate::filter::error::FilterError),

    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Whether this is the "table/relation not found" class of failure the
    /// trading view keys its sample-data fallback on.
    pub fn is_relation_missing(&self) -> bool {
        matches!(self, GatewayError::RelationMissing(_))
    }
}

/// Failures surfaced by the auth endpoints, mapped to the distinctions the
/// login surface cares about.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    AccountExists,

    #[error("Password rejected by the gateway: {0}")]
    WeakCredentials(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
