pub mod cors;
pub mod handlers;
pub mod routes;

pub use routes::build_router;

use crate::adapters::http::{HttpDownloader, WorldPopClient};
use crate::adapters::storage::InMemoryRepository;
use crate::config::AppConfig;
use crate::core::{GraphicService, LayerService, RasterPipeline};
use crate::domain::model::{GraphicRecord, Layer};
use crate::utils::error::Result;
use std::sync::Arc;

pub type WorldPopPipeline = RasterPipeline<WorldPopClient, HttpDownloader>;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<WorldPopPipeline>,
    pub layers: Arc<LayerService>,
    pub graphics: Arc<GraphicService>,
    pub default_country_code: String,
}

impl AppState {
    /// 以設定建立 provider client、downloader 與記憶體儲存庫
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider = WorldPopClient::new(&config.provider, &config.http)?;
        let downloader = HttpDownloader::new(&config.http)?;

        Ok(Self {
            pipeline: Arc::new(RasterPipeline::new(provider, downloader)),
            layers: Arc::new(LayerService::new(Arc::new(InMemoryRepository::<Layer>::new()))),
            graphics: Arc::new(GraphicService::new(Arc::new(
                InMemoryRepository::<GraphicRecord>::new(),
            ))),
            default_country_code: config.provider.default_country_code.clone(),
        })
    }
}

/// 啟動 HTTP 服務，Ctrl-C 時優雅關閉
pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = AppState::from_config(config)?;
    let router = build_router(state, &config.server)?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 city-raster listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("🛑 Shutdown signal received");
        })
        .await?;

    Ok(())
}
