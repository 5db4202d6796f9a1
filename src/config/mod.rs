use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::records::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub gateway: GatewayConfig,
    pub session: SessionConfig,
    pub filter: FilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the hosted gateway, e.g. https://xyz.supabase.co
    pub url: String,
    /// Public (anonymous) API key sent with every request.
    pub anon_key: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Role assumed when neither role probe confirms, or a probe fails.
    ///
    /// The upstream behavior is to grant `ic` on any ambiguity, which means
    /// an error path yields the more privileged role. Kept as the default
    /// for compatibility, but surfaced here so deployments can review and
    /// override it (SESSION_DEFAULT_ROLE).
    pub default_role: Role,
    /// A persisted token expiring within this window is refreshed eagerly.
    pub refresh_leeway_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub max_limit: Option<i32>,
    pub debug_logging: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Gateway overrides
        if let Ok(v) = env::var("FINBOARD_GATEWAY_URL") {
            self.gateway.url = v;
        }
        if let Ok(v) = env::var("FINBOARD_GATEWAY_KEY") {
            self.gateway.anon_key = v;
        }
        if let Ok(v) = env::var("GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = v.parse().unwrap_or(self.gateway.timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_DEFAULT_ROLE") {
            self.session.default_role = v.parse().unwrap_or(self.session.default_role);
        }
        if let Ok(v) = env::var("SESSION_REFRESH_LEEWAY_SECS") {
            self.session.refresh_leeway_secs =
                v.parse().unwrap_or(self.session.refresh_leeway_secs);
        }

        // Filter overrides
        if let Ok(v) = env::var("FILTER_MAX_LIMIT") {
            self.filter.max_limit = v.parse().ok();
        }
        if let Ok(v) = env::var("FILTER_DEBUG_LOGGING") {
            self.filter.debug_logging = v.parse().unwrap_or(self.filter.debug_logging);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            gateway: GatewayConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
                timeout_secs: 30,
            },
            session: SessionConfig {
                default_role: Role::Ic,
                refresh_leeway_secs: 60,
            },
            filter: FilterConfig {
                max_limit: Some(1000),
                debug_logging: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            gateway: GatewayConfig {
                url: String::new(),
                anon_key: String::new(),
                timeout_secs: 15,
            },
            session: SessionConfig {
                default_role: Role::Ic,
                refresh_leeway_secs: 60,
            },
            filter: FilterConfig {
                max_limit: Some(500),
                debug_logging: false,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            gateway: GatewayConfig {
                url: String::new(),
                anon_key: String::new(),
                timeout_secs: 10,
            },
            session: SessionConfig {
                default_role: Role::Ic,
                refresh_leeway_secs: 120,
            },
            filter: FilterConfig {
                max_limit: Some(100),
                debug_logging: false,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
