//! # Backend Client
//!
//! The [`Backend`] handle and the HTTP plumbing every repository shares.
//!
//! ## Request Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET {url}/rest/v1/sales?select=...&created_at=gte....                 │
//! │      apikey: <anon key>                                                 │
//! │      Authorization: Bearer <session access token | anon key>           │
//! │                                                                         │
//! │  2xx  → JSON body decoded into wire rows                               │
//! │  else → {message, code, details, hint} → StoreError::Backend           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::AuthClient;
use crate::error::{StoreError, StoreResult};
use crate::query::Query;
use crate::repository::conversation::ConversationRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::stock::StockRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Backend connection settings.
///
/// ## Example
/// ```rust,ignore
/// let config = BackendConfig::new("https://xyz.supabase.co", "anon-key")?
///     .timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project base URL. Always ends with `/`.
    pub url: Url,

    /// Public (anon) API key, sent as `apikey` on every request.
    pub anon_key: String,

    /// Per-request timeout.
    /// Default: 30 seconds
    pub timeout: Duration,

    pub user_agent: String,
}

impl BackendConfig {
    /// ## Errors
    /// `InvalidConfig` for an unparseable or non-HTTP URL, or an empty key.
    pub fn new(url: &str, anon_key: impl Into<String>) -> StoreResult<Self> {
        let anon_key = anon_key.into();
        if anon_key.trim().is_empty() {
            return Err(StoreError::InvalidConfig("anon key is empty".to_string()));
        }

        let trimmed = url.trim();
        let mut url = Url::parse(trimmed)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StoreError::InvalidConfig(format!(
                "backend URL must be http or https: {trimmed}"
            )));
        }
        // Url::join drops the last segment unless the path ends with '/'
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Ok(BackendConfig {
            url,
            anon_key,
            timeout: Duration::from_secs(30),
            user_agent: format!("depot-console/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{url}/rest/v1/{path}`
    pub fn rest_url(&self, path: &str) -> StoreResult<Url> {
        Ok(self.url.join("rest/v1/")?.join(path)?)
    }

    /// `{url}/auth/v1/{path}`
    pub fn auth_url(&self, path: &str) -> StoreResult<Url> {
        Ok(self.url.join("auth/v1/")?.join(path)?)
    }
}

// =============================================================================
// Backend
// =============================================================================

/// Main backend handle providing repository access.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
///
/// ## Usage
/// ```rust,ignore
/// let sales = backend.sales().report(&query).await?;
/// let stock = backend.stock().summary().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Backend {
    rest: RestClient,
    auth: AuthClient,
}

impl Backend {
    /// Builds the HTTP client. No request is made until a repository is
    /// used.
    pub fn new(config: BackendConfig) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;

        info!(url = %config.url, timeout_secs = config.timeout.as_secs(), "Backend client ready");

        let config = Arc::new(config);
        let auth = AuthClient::new(http.clone(), Arc::clone(&config));
        let rest = RestClient {
            http,
            config,
            auth: auth.clone(),
        };
        Ok(Backend { rest, auth })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.rest.config
    }

    /// Identity operations and the current session.
    pub fn auth(&self) -> &AuthClient {
        &self.auth
    }

    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.rest.clone())
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.rest.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.rest.clone())
    }

    pub fn stock(&self) -> StockRepository {
        StockRepository::new(self.rest.clone())
    }

    pub fn conversations(&self) -> ConversationRepository {
        ConversationRepository::new(self.rest.clone())
    }
}

// =============================================================================
// REST Client
// =============================================================================

/// Shared plumbing for the `/rest/v1` data API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
    auth: AuthClient,
}

impl RestClient {
    async fn request(&self, method: Method, path: &str) -> StoreResult<RequestBuilder> {
        let url = self.config.rest_url(path)?;
        let bearer = match self.auth.access_token().await? {
            Some(token) => token,
            None => self.config.anon_key.clone(),
        };
        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer))
    }

    /// `GET /rest/v1/{table}` decoded as a list of rows.
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> StoreResult<Vec<T>> {
        debug!(table, params = ?query.pairs(), "Selecting rows");
        let response = self
            .request(Method::GET, table)
            .await?
            .query(query.pairs())
            .send()
            .await?;
        decode_json(response).await
    }

    /// `POST /rest/v1/{table}` returning the inserted rows with `select`
    /// columns.
    pub async fn insert<B, T>(&self, table: &str, body: &B, select: &str) -> StoreResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(table, "Inserting row");
        let response = self
            .request(Method::POST, table)
            .await?
            .query(&[("select", select)])
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        decode_json(response).await
    }

    /// `POST /rest/v1/{table}` without reading anything back.
    pub async fn insert_minimal<B>(&self, table: &str, body: &B) -> StoreResult<()>
    where
        B: Serialize + ?Sized,
    {
        debug!(table, "Inserting row");
        let response = self
            .request(Method::POST, table)
            .await?
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// `PATCH /rest/v1/{table}?{filter}` returning the updated rows.
    pub async fn update<B, T>(&self, table: &str, filter: &Query, body: &B) -> StoreResult<Vec<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(table, params = ?filter.pairs(), "Updating rows");
        let response = self
            .request(Method::PATCH, table)
            .await?
            .query(filter.pairs())
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        decode_json(response).await
    }

    /// `DELETE /rest/v1/{table}?{filter}`
    pub async fn delete(&self, table: &str, filter: &Query) -> StoreResult<()> {
        debug!(table, params = ?filter.pairs(), "Deleting rows");
        let response = self
            .request(Method::DELETE, table)
            .await?
            .query(filter.pairs())
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// `POST /rest/v1/rpc/{function}`
    pub async fn rpc<B, T>(&self, function: &str, body: &B) -> StoreResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(function, "Calling procedure");
        let path = format!("rpc/{function}");
        let response = self.request(Method::POST, &path).await?.json(body).send().await?;
        decode_json(response).await
    }
}

// =============================================================================
// Response Handling
// =============================================================================

/// Error body shapes of both APIs. PostgREST sends `message`/`code`;
/// GoTrue sends `error_description`, `msg` or `error`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error_description: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    code: Option<serde_json::Value>,
}

/// Builds the error for a non-2xx response body.
pub(crate) fn backend_error(status: u16, body: &str) -> StoreError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error_description)
        .or(parsed.msg)
        .or(parsed.error)
        .unwrap_or_else(|| {
            let text = body.trim();
            if text.is_empty() {
                format!("HTTP {status}")
            } else {
                text.to_string()
            }
        });
    let code = parsed.code.map(|code| match code {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    });

    warn!(status, %message, ?code, "Backend request failed");
    StoreError::Backend {
        status,
        message,
        code,
    }
}

pub(crate) async fn check_status(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(backend_error(status.as_u16(), &body))
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    // A void procedure answers 204 with no body
    let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    Ok(serde_json::from_slice(body)?)
}

// =============================================================================
// Unit Tests
// =============================================================================
