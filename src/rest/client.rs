//! HTTP client for the collaborator REST surface

use serde::Deserialize;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::types::{NewProduct, Product, ProductPatch};

/// `GET /health` response
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// `GET /ws/connections` response
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelStats {
    pub active_connections: u64,
}

/// Client for the collaborator REST API
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    resource: String,
}

impl ApiClient {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            resource: config.resource.clone(),
        }
    }

    /// Liveness probe
    pub async fn health(&self) -> SyncResult<HealthStatus> {
        let response = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        read_json(response).await
    }

    /// Bulk page of records for the initial load
    pub async fn list(&self, skip: usize, limit: usize) -> SyncResult<Vec<Product>> {
        let response = self
            .http
            .get(self.collection_url())
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        read_json(response).await
    }

    pub async fn get(&self, id: i64) -> SyncResult<Product> {
        let response = self
            .http
            .get(self.item_url(id))
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        read_json(response).await
    }

    /// Create a record; the server broadcasts the matching change event
    pub async fn create(&self, product: &NewProduct) -> SyncResult<Product> {
        product.validate()?;
        let response = self
            .http
            .post(self.collection_url())
            .json(product)
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        read_json(response).await
    }

    /// Update a record; the server broadcasts the matching change event
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> SyncResult<Product> {
        patch.validate()?;
        let response = self
            .http
            .put(self.item_url(id))
            .json(patch)
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        read_json(response).await
    }

    /// Delete a record; the server broadcasts the matching change event
    pub async fn delete(&self, id: i64) -> SyncResult<()> {
        let response = self
            .http
            .delete(self.item_url(id))
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_detail(response).await)
        }
    }

    /// Server-side name search
    pub async fn search(&self, name: &str) -> SyncResult<Vec<Product>> {
        let url = format!(
            "{}/{}/search/{}",
            self.base_url,
            self.resource,
            urlencoding::encode(name)
        );
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        read_json(response).await
    }

    /// Live channel count as the server reports it
    pub async fn active_connections(&self) -> SyncResult<u64> {
        let response = self
            .http
            .get(format!("{}/ws/connections", self.base_url))
            .send()
            .await
            .map_err(SyncError::from_reqwest)?;
        let stats: ChannelStats = read_json(response).await?;
        Ok(stats.active_connections)
    }

    fn collection_url(&self) -> String {
        format!("{}/{}/", self.base_url, self.resource)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/{}/{}", self.base_url, self.resource, id)
    }
}

/// Decode a success body, or map a failure to [`SyncError::Api`]
async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> SyncResult<T> {
    if !response.status().is_success() {
        return Err(error_detail(response).await);
    }
    response.json().await.map_err(SyncError::from_reqwest)
}

/// Prefer the server's JSON `detail` message, fall back on the canonical
/// status text
async fn error_detail(response: reqwest::Response) -> SyncError {
    #[derive(Deserialize)]
    struct Detail {
        detail: String,
    }

    let status = response.status();
    let detail = match response.json::<Detail>().await {
        Ok(body) => body.detail,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    };
    SyncError::Api {
        status: status.as_u16(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(&SyncConfig::default())
    }

    #[test]
    fn test_collection_url_keeps_trailing_slash() {
        assert_eq!(
            client().collection_url(),
            "http://localhost:8000/products/"
        );
    }

    #[test]
    fn test_item_url() {
        assert_eq!(client().item_url(42), "http://localhost:8000/products/42");
    }

    #[test]
    fn test_resource_segment_is_configurable() {
        let config = SyncConfig {
            resource: "articles".to_string(),
            ..SyncConfig::default()
        };
        let api = ApiClient::new(&config);
        assert_eq!(api.item_url(1), "http://localhost:8000/articles/1");
    }

    #[tokio::test]
    async fn test_create_validates_before_sending() {
        // A blank name fails locally; no server is listening and none is
        // needed.
        let result = client().create(&NewProduct::new("", 1, 1.0)).await;
        assert!(matches!(result, Err(SyncError::Invalid(_))));
    }
}
