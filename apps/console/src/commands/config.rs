//! # Config Command

use tracing::debug;

use super::{Context, Reply};
use crate::error::{ApiError, ApiResult};
use crate::state::ConsoleConfig;

/// Keeps the first characters of a key so the operator can tell keys
/// apart without printing them.
pub fn mask_key(key: &str) -> String {
    match key.char_indices().nth(6) {
        Some((cut, _)) => format!("{}…", &key[..cut]),
        None if key.is_empty() => String::new(),
        None => "…".to_string(),
    }
}

/// The effective configuration, key masked. Needs no session.
pub fn show(ctx: &Context) -> ApiResult<Reply> {
    debug!("config command");

    let mut shown: ConsoleConfig = ctx.config.clone();
    shown.backend.anon_key = mask_key(&shown.backend.anon_key);

    let mut text =
        toml::to_string_pretty(&shown).map_err(|e| ApiError::internal(e.to_string()))?;
    text.push_str(&format!("\n# report calendar: {}", ctx.zone()));
    Reply::new(text.trim_end(), &shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use httpmock::MockServer;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("eyJhbGciOiJIUzI1NiJ9"), "eyJhbG…");
        assert_eq!(mask_key("short"), "…");
        assert_eq!(mask_key(""), "");
    }

    #[tokio::test]
    async fn test_show_masks_key_without_session() {
        let server = MockServer::start_async().await;
        let mut ctx = test_support::context(&server, false).await;
        ctx.config.backend.anon_key = "eyJhbGciOiJIUzI1NiJ9".into();

        let reply = show(&ctx).unwrap();
        assert!(reply.text.contains("anon_key = \"eyJhbG…\""));
        assert!(!reply.text.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(reply.text.ends_with("# report calendar: +00:00"));
        assert_eq!(reply.json["display"]["currency_symbol"], "R$ ");
    }
}
