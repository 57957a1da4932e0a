use crate::config::toml_config::HttpConfig;
use crate::domain::ports::Downloader;
use crate::utils::error::{RasterError, Result};
use async_trait::async_trait;
use reqwest::Client;

#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(http: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: http.build_client()?,
        })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        tracing::info!("Downloading raster from URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RasterError::fetch_failure(format!("raster file {}", url), e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Raster download failed with status {} for {}", status, url);
            return Err(RasterError::DownloadFailure {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RasterError::fetch_failure(format!("raster file {}", url), e))?;

        if bytes.is_empty() {
            tracing::error!("Raster download returned an empty body for {}", url);
            return Err(RasterError::DownloadFailure {
                status: status.as_u16(),
            });
        }

        tracing::info!("Downloaded raster file. Size: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
