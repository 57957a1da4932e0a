use crate::config::toml_config::{HttpConfig, ProviderConfig};
use crate::domain::model::ProviderDocument;
use crate::domain::ports::RasterProvider;
use crate::utils::error::{RasterError, Result};
use crate::utils::validation::require_country_code;
use async_trait::async_trait;
use reqwest::Client;

const COUNTRY_QUERY_PARAM: &str = "iso3";

/// WorldPop REST client. One GET per call, no retries.
#[derive(Debug, Clone)]
pub struct WorldPopClient {
    client: Client,
    raster_endpoint: String,
    density_endpoint: String,
}

impl WorldPopClient {
    pub fn new(provider: &ProviderConfig, http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: http.build_client()?,
            raster_endpoint: provider.raster_endpoint.clone(),
            density_endpoint: provider.density_endpoint.clone(),
        })
    }

    async fn fetch_document(
        &self,
        endpoint: &str,
        country_code: &str,
        label: &str,
    ) -> Result<Option<ProviderDocument>> {
        let country_code = require_country_code(country_code)?;

        tracing::debug!("📡 Requesting {} for {}: {}", label, country_code, endpoint);
        let response = self
            .client
            .get(endpoint)
            .query(&[(COUNTRY_QUERY_PARAM, country_code)])
            .send()
            .await
            .map_err(|e| RasterError::fetch_failure(label, e))?;

        let status = response.status();
        tracing::debug!("📡 {} response status: {}", label, status);

        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("{} HTTP error: {} - {}", label, status, body);
            return Err(RasterError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        if !status.is_success() {
            tracing::warn!("{} returned non-2xx status: {}", label, status);
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| RasterError::fetch_failure(label, e))?;

        if body.trim().is_empty() {
            tracing::warn!("{} returned an empty body for {}", label, country_code);
            return Ok(None);
        }

        let document: ProviderDocument = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Error parsing {} response: {}", label, e);
            RasterError::fetch_failure(label, e)
        })?;

        tracing::debug!("✅ {} request successful for {}", label, country_code);
        Ok(Some(document))
    }
}

#[async_trait]
impl RasterProvider for WorldPopClient {
    async fn fetch_raster_metadata(&self, country_code: &str) -> Result<Option<ProviderDocument>> {
        self.fetch_document(&self.raster_endpoint, country_code, "WorldPop raster metadata")
            .await
    }

    async fn fetch_density_metadata(
        &self,
        country_code: &str,
    ) -> Result<Option<ProviderDocument>> {
        self.fetch_document(&self.density_endpoint, country_code, "WorldPop density metadata")
            .await
    }
}
