//! # Session Manager
//!
//! Signs the operator in against the identity API, keeps the access token
//! fresh and publishes session changes.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Session Flow                                   │
//! │                                                                         │
//! │  ┌────────────────┐                          ┌─────────────────┐        │
//! │  │  AuthClient    │                          │  /auth/v1       │        │
//! │  └───────┬────────┘                          └────────┬────────┘        │
//! │          │  1. token?grant_type=password              │                 │
//! │          │     {email, password}                      │                 │
//! │          │───────────────────────────────────────────►│                 │
//! │          │  2. access + refresh token, expires_in     │                 │
//! │          │◄───────────────────────────────────────────│                 │
//! │          │                                            │                 │
//! │          │  [Later: less than 5 minutes left]         │                 │
//! │          │                                            │                 │
//! │          │  3. token?grant_type=refresh_token         │                 │
//! │          │───────────────────────────────────────────►│                 │
//! │          │  4. new pair                               │                 │
//! │          │◄───────────────────────────────────────────│                 │
//! │          │                                            │                 │
//! │          │  5. logout (best effort), clear locally    │                 │
//! │          │───────────────────────────────────────────►│                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every transition is published on [`AuthClient::changes`] so the console
//! can persist or forget the session.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::client::{check_status, decode_json, BackendConfig};
use crate::error::{StoreError, StoreResult};

/// Margin before token expiration to trigger refresh (5 minutes)
const REFRESH_MARGIN_SECS: i64 = 300;

// =============================================================================
// Session
// =============================================================================

/// An authenticated operator session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Wall-clock expiry; sessions outlive the process.
    pub expires_at: DateTime<Utc>,
    pub user_id: String,
    pub email: Option<String>,
}

impl Session {
    /// Check if the token is expired or about to expire
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) >= self.expires_at
    }

    /// Check if the token is completely expired (no grace period)
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }

    /// Rebuilds a session from a token pair, reading user and expiry from
    /// the access token's claims. The signature is not checked here; the
    /// backend checks it on every request.
    pub fn from_tokens(access_token: &str, refresh_token: &str) -> StoreResult<Session> {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Claims>(
            access_token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )
        .map_err(|e| StoreError::AuthFailed(format!("Malformed access token: {e}")))?;

        let expires_at = Utc
            .timestamp_opt(data.claims.exp, 0)
            .single()
            .ok_or_else(|| StoreError::AuthFailed("Access token has no valid expiry".into()))?;

        Ok(Session {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at,
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }

    fn from_grant(grant: TokenGrant, now: DateTime<Utc>) -> StoreResult<Session> {
        let expires_at = match grant.expires_at {
            Some(at) => Utc.timestamp_opt(at, 0).single(),
            None => grant.expires_in.map(|secs| now + Duration::seconds(secs)),
        };
        let user = grant.user;

        match (expires_at, user) {
            (Some(expires_at), Some(user)) => Ok(Session {
                access_token: grant.access_token,
                refresh_token: grant.refresh_token,
                expires_at,
                user_id: user.id,
                email: user.email,
            }),
            _ => Session::from_tokens(&grant.access_token, &grant.refresh_token),
        }
    }
}

/// Session transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// No session has been established in this process yet.
    Initial,
    SignedIn(Session),
    Refreshed(Session),
    SignedOut,
}

impl SessionEvent {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionEvent::SignedIn(s) | SessionEvent::Refreshed(s) => Some(s),
            SessionEvent::Initial | SessionEvent::SignedOut => None,
        }
    }
}

/// The signed-in user as the identity API reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    user: Option<AuthUser>,
}

// =============================================================================
// Auth Client
// =============================================================================

/// Session manager shared by every repository of a [`Backend`](crate::Backend).
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    config: Arc<BackendConfig>,
    session: Arc<RwLock<Option<Session>>>,
    events: Arc<watch::Sender<SessionEvent>>,
}

impl AuthClient {
    pub(crate) fn new(http: reqwest::Client, config: Arc<BackendConfig>) -> Self {
        let (events, _) = watch::channel(SessionEvent::Initial);
        AuthClient {
            http,
            config,
            session: Arc::new(RwLock::new(None)),
            events: Arc::new(events),
        }
    }

    /// Email/password sign-in.
    ///
    /// ## Errors
    /// `Backend` with the identity API's message (e.g. "Invalid login
    /// credentials").
    pub async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let url = self.config.auth_url("token")?;
        let response = self
            .http
            .post(url)
            .query(&[("grant_type", "password")])
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let grant: TokenGrant = decode_json(response).await?;
        let session = Session::from_grant(grant, Utc::now())?;

        info!(
            user_id = %session.user_id,
            expires_in_secs = session.remaining_secs(Utc::now()),
            "Signed in"
        );
        *self.session.write().await = Some(session.clone());
        self.events.send_replace(SessionEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// Installs a previously persisted token pair.
    pub async fn set_session(&self, access_token: &str, refresh_token: &str) -> StoreResult<Session> {
        let session = Session::from_tokens(access_token, refresh_token)?;
        self.restore(session.clone()).await;
        Ok(session)
    }

    /// Installs a previously persisted session as-is.
    pub async fn restore(&self, session: Session) {
        debug!(user_id = %session.user_id, "Session restored");
        *self.session.write().await = Some(session.clone());
        self.events.send_replace(SessionEvent::SignedIn(session));
    }

    /// The current session, refreshed first when it is close to expiry.
    ///
    /// ## Flow
    /// 1. No session: `None`
    /// 2. Outside the refresh margin: cached session
    /// 3. Inside the margin: refresh; on failure keep the old session while
    ///    it is still valid, otherwise drop it
    pub async fn session(&self) -> StoreResult<Option<Session>> {
        {
            let guard = self.session.read().await;
            match guard.as_ref() {
                None => return Ok(None),
                Some(session) if !session.needs_refresh(Utc::now()) => {
                    return Ok(Some(session.clone()));
                }
                Some(_) => {}
            }
        }

        let mut guard = self.session.write().await;

        // Double-check after acquiring write lock
        let current = match guard.as_ref() {
            None => return Ok(None),
            Some(session) if !session.needs_refresh(Utc::now()) => {
                return Ok(Some(session.clone()));
            }
            Some(session) => session.clone(),
        };

        match self.do_refresh(&current.refresh_token).await {
            Ok(refreshed) => {
                info!(
                    user_id = %refreshed.user_id,
                    expires_in_secs = refreshed.remaining_secs(Utc::now()),
                    "Session refreshed"
                );
                *guard = Some(refreshed.clone());
                self.events.send_replace(SessionEvent::Refreshed(refreshed.clone()));
                Ok(Some(refreshed))
            }
            Err(e) if !current.is_expired(Utc::now()) => {
                warn!(error = %e, "Session refresh failed, using current token");
                Ok(Some(current))
            }
            Err(e) => {
                warn!(error = %e, "Session expired and could not be refreshed");
                *guard = None;
                self.events.send_replace(SessionEvent::SignedOut);
                Ok(None)
            }
        }
    }

    /// Access token for the `Authorization` header, if signed in.
    pub async fn access_token(&self) -> StoreResult<Option<String>> {
        Ok(self.session().await?.map(|s| s.access_token))
    }

    /// Current session without triggering refresh.
    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Session or `NotAuthenticated`.
    pub async fn require(&self) -> StoreResult<Session> {
        self.session().await?.ok_or(StoreError::NotAuthenticated)
    }

    /// `GET /auth/v1/user`
    pub async fn user(&self) -> StoreResult<AuthUser> {
        let session = self.require().await?;
        let response = self
            .http
            .get(self.config.auth_url("user")?)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        decode_json(response).await
    }

    /// Revokes the session server-side (best effort) and forgets it.
    pub async fn sign_out(&self) -> StoreResult<()> {
        let token = self
            .session
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone());

        if let Some(access_token) = token {
            if let Err(e) = self.do_revoke(&access_token).await {
                warn!(error = %e, "Failed to revoke session on server");
            }
        }

        *self.session.write().await = None;
        self.events.send_replace(SessionEvent::SignedOut);
        info!("Signed out");
        Ok(())
    }

    /// Stream of session transitions after this call.
    pub fn changes(&self) -> WatchStream<SessionEvent> {
        WatchStream::from_changes(self.events.subscribe())
    }

    async fn do_refresh(&self, refresh_token: &str) -> StoreResult<Session> {
        let url = self.config.auth_url("token")?;
        let response = self
            .http
            .post(url)
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.config.anon_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let grant: TokenGrant = decode_json(response)
            .await
            .map_err(|e| StoreError::AuthFailed(format!("Token refresh failed: {e}")))?;
        Session::from_grant(grant, Utc::now())
    }

    async fn do_revoke(&self, access_token: &str) -> StoreResult<()> {
        let response = self
            .http
            .post(self.config.auth_url("logout")?)
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
