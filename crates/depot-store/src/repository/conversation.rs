//! # Conversation Repository
//!
//! Customer message threads. The console only needs the unread total for
//! the dashboard badge.

use tracing::warn;

use crate::client::RestClient;
use crate::error::StoreResult;
use crate::query::Query;
use crate::wire::UnreadRow;

#[derive(Debug, Clone)]
pub struct ConversationRepository {
    client: RestClient,
}

impl ConversationRepository {
    pub fn new(client: RestClient) -> Self {
        ConversationRepository { client }
    }

    /// Σ `unread_count` over all conversations.
    pub async fn unread_count(&self) -> StoreResult<i64> {
        let query = Query::select("unread_count");
        let rows: Vec<UnreadRow> = self.client.select("conversations", &query).await?;
        Ok(rows.iter().fold(0i64, |acc, r| acc.saturating_add(r.unread_count)))
    }

    /// Like [`unread_count`](Self::unread_count) but a failure counts as
    /// zero; the badge must never block the dashboard.
    pub async fn unread_count_or_zero(&self) -> i64 {
        match self.unread_count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Unread count unavailable");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{Backend, BackendConfig};
    use httpmock::prelude::*;

    fn backend(server: &MockServer) -> Backend {
        Backend::new(BackendConfig::new(&server.base_url(), "anon").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_unread_count_sums_rows() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/conversations");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!([
                        { "unread_count": 2 },
                        { "unread_count": null },
                        { "unread_count": 5 }
                    ]));
            })
            .await;

        assert_eq!(backend(&server).conversations().unread_count().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_unread_count_failure_is_zero() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/rest/v1/conversations");
                then.status(404)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!({ "message": "relation does not exist" }));
            })
            .await;

        let repo = backend(&server).conversations();
        assert!(repo.unread_count().await.is_err());
        assert_eq!(repo.unread_count_or_zero().await, 0);
    }
}
