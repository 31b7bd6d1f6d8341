use super::{Catalog, DeviceSummary, SearchResponse};
use crate::config::BuilderConfig;
use crate::error::CatalogError;
use async_trait::async_trait;
use tracing::info;

/// HTTP client for a Thingpedia catalog server.
#[derive(Debug, Clone)]
pub struct ThingpediaClient {
    http: reqwest::Client,
    base_url: String,
    locale: String,
    developer_key: Option<String>,
}

impl ThingpediaClient {
    pub fn new(base_url: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            locale: locale.into(),
            developer_key: None,
        }
    }

    pub fn from_config(config: &BuilderConfig) -> Self {
        let client = Self::new(&config.thingpedia_url, &config.locale);
        match &config.developer_key {
            Some(key) => client.with_developer_key(key),
            None => client,
        }
    }

    pub fn with_developer_key(mut self, key: impl Into<String>) -> Self {
        self.developer_key = Some(key.into());
        self
    }

    /// Replaces the underlying HTTP client, e.g. to set timeouts or proxies.
    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("locale", self.locale.clone())];
        if let Some(key) = &self.developer_key {
            params.push(("developer_key", key.clone()));
        }
        params
    }

    async fn get(
        &self,
        path: &str,
        extra: &[(&'static str, String)],
    ) -> Result<reqwest::Response, CatalogError> {
        let url = format!("{}/api/v3/{}", self.base_url, path);
        info!(url = %url, "catalog request");
        let response = self
            .http
            .get(&url)
            .query(&self.common_params())
            .query(extra)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Catalog for ThingpediaClient {
    async fn search_devices(&self, query: &str) -> Result<Vec<DeviceSummary>, CatalogError> {
        let body = self
            .get("devices/search", &[("q", query.to_string())])
            .await?
            .text()
            .await?;
        let response: SearchResponse = serde_json::from_str(&body)?;
        Ok(response.data)
    }

    async fn device_code(&self, kind: &str) -> Result<String, CatalogError> {
        let response = self.get(&format!("devices/code/{}", kind), &[]).await?;
        Ok(response.text().await?)
    }
}
