//! Auth endpoint calls: password sign-in, sign-up, sign-out, and refresh.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::error::ErrorBody;
use super::{AuthError, Gateway, GatewayError};
use crate::records::Session;

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: GatewayUser,
}

/// Tokens plus identity for an active session.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub user_id: Uuid,
    pub email: String,
}

impl AuthSession {
    pub fn session(&self) -> Session {
        Session {
            user_id: self.user_id,
            email: self.email.clone(),
        }
    }

    /// Whether the access token expires within `leeway_secs` from now.
    /// A session with no known expiry is treated as still valid.
    pub fn expires_within(&self, leeway_secs: i64) -> bool {
        match self.expires_at {
            Some(at) => at <= Utc::now() + Duration::seconds(leeway_secs),
            None => false,
        }
    }
}

/// Result of a sign-up call. The account is unusable until the user
/// completes the out-of-band email confirmation step, unless the gateway
/// has confirmation disabled and returned a session directly.
#[derive(Debug)]
pub struct SignUpOutcome {
    pub email: String,
    pub confirmation_required: bool,
}

impl Gateway {
    pub async fn password_sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let url = self.endpoint("auth/v1/token?grant_type=password")?;
        let response = self
            .http()
            .post(url)
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(GatewayError::from)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if status.as_u16() == 400 || status.as_u16() == 401 {
                return Err(AuthError::InvalidCredentials);
            }
            let body = ErrorBody::parse(&text);
            return Err(GatewayError::Status {
                status: status.as_u16(),
                code: body.code.clone(),
                message: body.best_message("sign-in failed"),
            }
            .into());
        }

        let token: TokenResponse = response.json().await.map_err(GatewayError::from)?;
        Ok(auth_session_from(token))
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome, AuthError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .http()
            .post(url)
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(GatewayError::from)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = ErrorBody::parse(&text);
            let message = body.best_message("sign-up failed");

            if message.contains("already registered") || message.contains("already exists") {
                return Err(AuthError::AccountExists);
            }
            if message.to_ascii_lowercase().contains("password") {
                return Err(AuthError::WeakCredentials(message));
            }
            return Err(GatewayError::Status {
                status: status.as_u16(),
                code: body.code,
                message,
            }
            .into());
        }

        // With email confirmation enabled the gateway returns the pending
        // user object; with it disabled it returns a full token response.
        let value: Value = response.json().await.map_err(GatewayError::from)?;
        let confirmation_required = value.get("access_token").is_none();

        Ok(SignUpOutcome {
            email: email.to_string(),
            confirmation_required,
        })
    }

    /// Invalidate the session remotely. Callers clear local state regardless
    /// of the outcome here.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), GatewayError> {
        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .http()
            .post(url)
            .header("apikey", self.anon_key())
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = ErrorBody::parse(&text);
            let message = body.best_message("sign-out failed");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                code: body.code,
                message,
            });
        }

        Ok(())
    }

    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let url = self.endpoint("auth/v1/token?grant_type=refresh_token")?;
        let response = self
            .http()
            .post(url)
            .header("apikey", self.anon_key())
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(GatewayError::from)?;

        let status = response.status();
        if !status.is_success() {
            // An expired or revoked refresh token means the stored session
            // is no longer usable
            if status.as_u16() == 400 || status.as_u16() == 401 {
                return Err(AuthError::InvalidCredentials);
            }
            let text = response.text().await.unwrap_or_default();
            let body = ErrorBody::parse(&text);
            let message = body.best_message("refresh failed");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                code: body.code,
                message,
            }
            .into());
        }

        let token: TokenResponse = response.json().await.map_err(GatewayError::from)?;
        Ok(auth_session_from(token))
    }
}

fn auth_session_from(token: TokenResponse) -> AuthSession {
    let expires_at = token
        .expires_in
        .map(|secs| Utc::now() + Duration::seconds(secs))
        .or_else(|| token_expiry(&token.access_token));

    AuthSession {
        email: token.user.email.clone().unwrap_or_default(),
        user_id: token.user.id,
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at,
    }
}

/// Read the `exp` claim from an access token without verifying the
/// signature. The client only consults the clock; verification is the
/// gateway's job.
pub(crate) fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    #[derive(Deserialize)]
    struct ExpClaims {
        exp: i64,
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data =
        jsonwebtoken::decode::<ExpClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .ok()?;
    DateTime::from_timestamp(data.claims.exp, 0)
}
