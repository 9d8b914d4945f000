//! # Product Repository
//!
//! The product catalog. The depot sells two products (gas and water); the
//! catalog's `unit_price` is the default price on the sales screen.

use depot_core::Product;

use crate::client::RestClient;
use crate::error::StoreResult;
use crate::query::Query;
use crate::wire::ProductRow;

#[derive(Debug, Clone)]
pub struct ProductRepository {
    client: RestClient,
}

impl ProductRepository {
    pub fn new(client: RestClient) -> Self {
        ProductRepository { client }
    }

    /// All products sorted by name.
    pub async fn list(&self) -> StoreResult<Vec<Product>> {
        let query = Query::select("id,name,unit_price").order_asc("name");
        let rows: Vec<ProductRow> = self.client.select("products", &query).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::client::{Backend, BackendConfig};
    use depot_core::{Money, ProductKind};
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_list_maps_unit_price() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/rest/v1/products")
                    .query_param("select", "id,name,unit_price")
                    .query_param("order", "name.asc");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(serde_json::json!([
                        { "id": "p-agua", "name": "agua", "unit_price": 12 },
                        { "id": "p-gas", "name": "gas", "unit_price": "110.00" }
                    ]));
            })
            .await;

        let backend = Backend::new(BackendConfig::new(&server.base_url(), "anon").unwrap()).unwrap();
        let products = backend.products().list().await.unwrap();
        mock.assert_async().await;
        assert_eq!(products[0].kind(), Some(ProductKind::Water));
        assert_eq!(products[1].price, Money::from_cents(11000));
    }
}
