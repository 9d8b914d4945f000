//! # Auth Commands

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use depot_core::validation;
use depot_store::Session;

use super::{Context, Reply};
use crate::error::ApiResult;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub email: Option<String>,
    pub expires_at: String,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        SessionResponse {
            user_id: session.user_id.clone(),
            email: session.email.clone(),
            expires_at: session.expires_at.to_rfc3339(),
        }
    }
}

pub async fn login(ctx: &Context, email: &str, password: &str) -> ApiResult<Reply> {
    debug!(email, "login command");
    validation::validate_email(email)?;

    let session = ctx.backend.auth().sign_in(email.trim(), password).await?;
    info!(user_id = %session.user_id, "Signed in");

    let minutes = session.remaining_secs(Utc::now()) / 60;
    Reply::new(
        format!(
            "Signed in as {} (session valid for {} min)",
            session.email.as_deref().unwrap_or(email),
            minutes
        ),
        &SessionResponse::from(&session),
    )
}

/// Signing out while signed out is not an error.
pub async fn logout(ctx: &Context) -> ApiResult<Reply> {
    debug!("logout command");
    if ctx.backend.auth().current().await.is_none() {
        return Ok(Reply::message("Not signed in"));
    }
    ctx.backend.auth().sign_out().await?;
    Ok(Reply::message("Signed out"))
}

pub async fn whoami(ctx: &Context) -> ApiResult<Reply> {
    debug!("whoami command");
    ctx.require_session().await?;
    let user = ctx.backend.auth().user().await?;
    Reply::new(
        format!("{} ({})", user.email.as_deref().unwrap_or("-"), user.id),
        &user,
    )
}
