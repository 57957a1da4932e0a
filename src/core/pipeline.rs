use crate::core::{codec, navigator};
use crate::domain::model::{FileReference, PopulationImage, ProviderDocument};
use crate::domain::ports::{Downloader, RasterProvider};
use crate::utils::error::{RasterError, Result};
use crate::utils::validation::{require_country_code, require_http_url};

/// Country code → provider metadata → file reference → download → PNG.
pub struct RasterPipeline<P: RasterProvider, D: Downloader> {
    provider: P,
    downloader: D,
}

impl<P: RasterProvider, D: Downloader> RasterPipeline<P, D> {
    pub fn new(provider: P, downloader: D) -> Self {
        Self {
            provider,
            downloader,
        }
    }

    pub async fn fetch_raster_metadata(
        &self,
        country_code: &str,
    ) -> Result<Option<ProviderDocument>> {
        self.provider.fetch_raster_metadata(country_code).await
    }

    /// 空清單是合法結果（呼叫端自行決定是否視為 no content）
    pub async fn get_raster_file_list(&self, country_code: &str) -> Result<Vec<FileReference>> {
        let Some(document) = self.provider.fetch_raster_metadata(country_code).await? else {
            tracing::warn!("No raster metadata for {}", country_code);
            return Ok(Vec::new());
        };

        let references = navigator::extract_file_references(&document);
        if references.is_empty() {
            tracing::warn!("No files found in raster metadata for {}", country_code);
        } else {
            tracing::debug!("Found {} raster files for {}", references.len(), country_code);
        }
        Ok(references)
    }

    pub async fn get_population_images(&self, country_code: &str) -> Result<Vec<PopulationImage>> {
        let Some(document) = self.provider.fetch_density_metadata(country_code).await? else {
            tracing::warn!("No population density data found for {}", country_code);
            return Ok(Vec::new());
        };

        let images = navigator::extract_population_images(&document);
        tracing::info!("Found {} population images for {}", images.len(), country_code);
        Ok(images)
    }

    pub async fn get_raster_as_png(&self, country_code: &str) -> Result<Vec<u8>> {
        let country_code = require_country_code(country_code)?;

        let references = self.get_raster_file_list(country_code).await?;
        let Some(first) = references.first() else {
            return Err(RasterError::NoFilesFound {
                country_code: country_code.to_string(),
            });
        };

        let url = first
            .download_url()
            .ok_or(RasterError::MissingPathField)?
            .to_string();
        tracing::info!("Extracted raster URL for {}: {}", country_code, url);

        let raster = self.downloader.download(&url).await?;
        self.convert_bytes(raster).await
    }

    pub async fn download_and_convert(&self, url: &str) -> Result<Vec<u8>> {
        let url = require_http_url(url)?;
        let raster = self.downloader.download(url).await?;
        self.convert_bytes(raster).await
    }

    /// 解碼/編碼屬 CPU 密集，移到 blocking 執行緒
    pub async fn convert_bytes(&self, raster: Vec<u8>) -> Result<Vec<u8>> {
        tokio::task::spawn_blocking(move || codec::convert(&raster))
            .await
            .map_err(|e| RasterError::EncodeFailure {
                message: format!("conversion task failed: {}", e),
            })?
    }
}
