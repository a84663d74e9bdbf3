//! OpenFGA HTTP API client
//!
//! Speaks the store-scoped endpoints of the OpenFGA HTTP API and handles the
//! client-credentials token exchange. Access tokens are cached until shortly
//! before they expire.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    client::TupleStoreClient,
    config::FgaSettings,
    error::{FgaError, Result},
    models::Tuple,
};

/// Tokens are refreshed this long before the issuer says they expire
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Assumed lifetime when the issuer omits `expires_in`
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(300);

/// Client for a single OpenFGA store
pub struct OpenFgaClient {
    http: reqwest::Client,
    api_url: String,
    store_id: String,
    authorization_model_id: Option<String>,
    credentials: ClientCredentials,
    token: Mutex<Option<CachedToken>>,
}

struct ClientCredentials {
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    audience: String,
}

struct CachedToken {
    access_token: SecretString,
    refresh_at: Instant,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'static str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    tuple_key: &'a Tuple,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_model_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct CheckResponse {
    allowed: bool,
}

#[derive(Serialize)]
struct TupleKeys<'a> {
    tuple_keys: [&'a Tuple; 1],
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    writes: Option<TupleKeys<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deletes: Option<TupleKeys<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authorization_model_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct ReadAuthorizationModelsResponse {
    #[serde(default)]
    authorization_models: Vec<AuthorizationModelRef>,
}

#[derive(Deserialize)]
struct AuthorizationModelRef {
    id: String,
}

/// Error body returned by the API
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl OpenFgaClient {
    /// Build a client from validated settings. No network traffic happens here.
    pub fn new(settings: FgaSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                FgaError::Internal(anyhow::anyhow!("failed to build HTTP client: {}", e))
            })?;

        let model_id = settings
            .authorization_model_id
            .as_deref()
            .unwrap_or("<store default>");
        info!(
            api_url = %settings.api_url,
            store_id = %settings.store_id,
            authorization_model_id = model_id,
            "Creating OpenFGA client"
        );

        Ok(Self {
            http,
            api_url: settings.api_url.as_str().trim_end_matches('/').to_string(),
            store_id: settings.store_id,
            authorization_model_id: settings.authorization_model_id,
            credentials: ClientCredentials {
                token_url: settings.token_url.to_string(),
                client_id: settings.client_id,
                client_secret: settings.client_secret,
                audience: settings.audience,
            },
            token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/stores/{}/{}", self.api_url, self.store_id, path.trim_start_matches('/'))
    }

    /// Current bearer token, exchanging client credentials when needed
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.access_token.expose_secret().clone());
            }
        }

        debug!(token_url = %self.credentials.token_url, "Exchanging client credentials");
        let response = self
            .http
            .post(&self.credentials.token_url)
            .json(&TokenRequest {
                client_id: &self.credentials.client_id,
                client_secret: self.credentials.client_secret.expose_secret(),
                audience: &self.credentials.audience,
                grant_type: "client_credentials",
            })
            .send()
            .await
            .map_err(|e| FgaError::Authentication(format!("token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FgaError::Authentication(format!(
                "token issuer returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FgaError::Authentication(format!("malformed token response: {}", e)))?;

        let lifetime = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let refresh_at = Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN);
        let access_token = token.access_token;
        *cached = Some(CachedToken {
            access_token: SecretString::new(access_token.clone()),
            refresh_at,
        });

        Ok(access_token)
    }

    /// Attach the bearer token and send
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.access_token().await?;
        Ok(request.bearer_auth(token).send().await?)
    }

    async fn post_write(&self, body: &WriteRequest<'_>) -> Result<Response> {
        self.send(self.http.post(self.url("write")).json(body)).await
    }

    fn model_id(&self) -> Option<&str> {
        self.authorization_model_id.as_deref()
    }
}

/// Turn a non-2xx response into a typed error
async fn error_from_response(response: Response) -> FgaError {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ApiErrorBody {
        code: String::new(),
        message: text,
    });

    match status {
        401 | 403 => FgaError::Authentication(format!("{} ({})", body.message, body.code)),
        _ => FgaError::Remote {
            status,
            code: body.code,
            message: body.message,
        },
    }
}

#[async_trait]
impl TupleStoreClient for OpenFgaClient {
    async fn check(&self, tuple: &Tuple) -> Result<bool> {
        let request = self.http.post(self.url("check")).json(&CheckRequest {
            tuple_key: tuple,
            authorization_model_id: self.model_id(),
        });

        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: CheckResponse = response.json().await?;
        debug!(tuple = %tuple, allowed = body.allowed, "OpenFGA check");
        Ok(body.allowed)
    }

    async fn write_tuple(&self, tuple: &Tuple) -> Result<()> {
        let response = self
            .post_write(&WriteRequest {
                writes: Some(TupleKeys { tuple_keys: [tuple] }),
                deletes: None,
                authorization_model_id: self.model_id(),
            })
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        match error_from_response(response).await {
            FgaError::Remote { message, .. } if message.contains("already exists") => {
                Err(FgaError::TupleAlreadyExists(tuple.to_string()))
            }
            FgaError::Remote { status, message, .. } => Err(FgaError::TupleWriteFailed(format!(
                "{} rejected with {}: {}",
                tuple, status, message
            ))),
            other => Err(other),
        }
    }

    async fn delete_tuple(&self, tuple: &Tuple) -> Result<()> {
        let response = self
            .post_write(&WriteRequest {
                writes: None,
                deletes: Some(TupleKeys { tuple_keys: [tuple] }),
                authorization_model_id: self.model_id(),
            })
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        match error_from_response(response).await {
            FgaError::Remote { message, .. } if message.contains("does not exist") => {
                Err(FgaError::TupleNotFound(tuple.to_string()))
            }
            FgaError::Remote { status, message, .. } => Err(FgaError::TupleDeleteFailed(format!(
                "{} rejected with {}: {}",
                tuple, status, message
            ))),
            other => Err(other),
        }
    }

    async fn read_authorization_models(&self) -> Result<Vec<String>> {
        let response = self.send(self.http.get(self.url("authorization-models"))).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: ReadAuthorizationModelsResponse = response.json().await?;
        Ok(body.authorization_models.into_iter().map(|m| m.id).collect())
    }
}
