//! OpenFGA connection settings
//!
//! Settings come from `OPENFGA_*` environment variables. Four of them are
//! required (`API_URL`, `STORE_ID`, `CLIENT_ID`, `CLIENT_SECRET`); when any is
//! missing or blank the process runs without a client and every decision uses
//! the fallback policy.

use std::time::Duration;

use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::{FgaError, Result};

pub const DEFAULT_TOKEN_ISSUER: &str = "auth.fga.dev";
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;

/// Raw OpenFGA configuration, as read from the environment
#[derive(Debug, Default, Deserialize)]
pub struct FgaConfig {
    pub api_url: Option<String>,
    pub store_id: Option<String>,
    pub authorization_model_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<SecretString>,
    pub api_token_issuer: Option<String>,
    pub api_audience: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// Validated settings for a reachable store
#[derive(Debug)]
pub struct FgaSettings {
    pub api_url: Url,
    pub store_id: String,
    pub authorization_model_id: Option<String>,
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_url: Url,
    pub audience: String,
    pub timeout: Duration,
}

impl FgaConfig {
    /// Load configuration from `OPENFGA_*` environment variables
    pub fn from_env() -> Result<Self> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("OPENFGA"))
            .build()
            .and_then(|c| c.try_deserialize::<FgaConfig>())
            .map_err(|e| {
                FgaError::Configuration(format!("failed to read OPENFGA_* settings: {}", e))
            })
    }

    /// Configuration with the four required values set
    pub fn new(
        api_url: impl Into<String>,
        store_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            api_url: Some(api_url.into()),
            store_id: Some(store_id.into()),
            client_id: Some(client_id.into()),
            client_secret: Some(SecretString::new(client_secret.into())),
            ..Self::default()
        }
    }

    pub fn with_authorization_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.authorization_model_id = Some(model_id.into());
        self
    }

    pub fn with_token_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.api_token_issuer = Some(issuer.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Deadline applied to every remote call
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }

    /// Whether all four required values are present and non-blank
    pub fn is_complete(&self) -> bool {
        present(&self.api_url).is_some()
            && present(&self.store_id).is_some()
            && present(&self.client_id).is_some()
            && self
                .client_secret
                .as_ref()
                .is_some_and(|s| !s.expose_secret().trim().is_empty())
    }

    /// Validate into settings.
    ///
    /// Returns `Ok(None)` when a required value is missing: that is a valid
    /// steady state, not an error. Values that are present but unusable
    /// (an unparsable URL) are a configuration error.
    pub fn settings(&self) -> Result<Option<FgaSettings>> {
        if !self.is_complete() {
            return Ok(None);
        }

        let (Some(api_url), Some(store_id), Some(client_id), Some(client_secret)) = (
            present(&self.api_url),
            present(&self.store_id),
            present(&self.client_id),
            self.client_secret.as_ref(),
        ) else {
            return Ok(None);
        };

        let base = api_url.trim_end_matches('/');
        let api_url = Url::parse(base).map_err(|e| {
            FgaError::Configuration(format!("invalid OPENFGA_API_URL {:?}: {}", base, e))
        })?;

        let issuer = present(&self.api_token_issuer).unwrap_or(DEFAULT_TOKEN_ISSUER);
        let issuer = if issuer.starts_with("http://") || issuer.starts_with("https://") {
            issuer.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", issuer.trim_end_matches('/'))
        };
        let token_url = Url::parse(&format!("{}/oauth/token", issuer)).map_err(|e| {
            FgaError::Configuration(format!("invalid OPENFGA_API_TOKEN_ISSUER {:?}: {}", issuer, e))
        })?;

        let audience = present(&self.api_audience)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/", base));

        Ok(Some(FgaSettings {
            api_url,
            store_id: store_id.to_string(),
            authorization_model_id: present(&self.authorization_model_id).map(str::to_string),
            client_id: client_id.to_string(),
            client_secret: SecretString::new(client_secret.expose_secret().trim().to_string()),
            token_url,
            audience,
            timeout: self.timeout(),
        }))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_are_not_an_error() {
        let config = FgaConfig {
            api_url: Some("http://localhost:8080".into()),
            store_id: Some("   ".into()),
            client_id: Some("id".into()),
            client_secret: Some(SecretString::new("secret".into())),
            ..FgaConfig::default()
        };
        assert!(!config.is_complete());
        assert!(config.settings().unwrap().is_none());
        assert!(FgaConfig::default().settings().unwrap().is_none());
    }

    #[test]
    fn test_defaults_are_derived_from_api_url() {
        let settings = FgaConfig::new("https://api.fga.example/", "store", "id", "secret")
            .settings()
            .unwrap()
            .unwrap();
        assert_eq!(settings.audience, "https://api.fga.example/");
        assert_eq!(settings.token_url.as_str(), "https://auth.fga.dev/oauth/token");
        assert_eq!(settings.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert!(settings.authorization_model_id.is_none());
    }

    #[test]
    fn test_blank_model_id_is_ignored() {
        let settings = FgaConfig::new("http://localhost:8080", "store", "id", "secret")
            .with_authorization_model_id("  ")
            .settings()
            .unwrap()
            .unwrap();
        assert!(settings.authorization_model_id.is_none());
    }

    #[test]
    fn test_unparsable_url_is_a_configuration_error() {
        let err = FgaConfig::new("not a url", "store", "id", "secret")
            .settings()
            .unwrap_err();
        assert!(matches!(err, FgaError::Configuration(_)));
    }

    #[test]
    fn test_secret_is_redacted_in_debug_output() {
        let config = FgaConfig::new("http://localhost:8080", "store", "id", "hunter2");
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
