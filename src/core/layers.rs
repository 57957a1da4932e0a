use crate::domain::model::Layer;
use crate::domain::ports::Repository;
use crate::utils::error::{RasterError, Result};
use chrono::Utc;
use std::sync::Arc;

const MAX_TYPE_LENGTH: usize = 50;

pub struct LayerService {
    repository: Arc<dyn Repository<Layer>>,
}

impl LayerService {
    pub fn new(repository: Arc<dyn Repository<Layer>>) -> Self {
        Self { repository }
    }

    /// 儲存新圖層；`features_json` 必須是合法 JSON
    pub async fn save_layer(&self, layer_type: &str, features_json: &str) -> Result<Layer> {
        let layer_type = layer_type.trim();
        if layer_type.is_empty() {
            return Err(RasterError::invalid_argument("layer type cannot be empty"));
        }
        if layer_type.chars().count() > MAX_TYPE_LENGTH {
            return Err(RasterError::invalid_argument(format!(
                "layer type cannot exceed {} characters",
                MAX_TYPE_LENGTH
            )));
        }
        if features_json.trim().is_empty() {
            return Err(RasterError::invalid_argument("features JSON cannot be empty"));
        }

        if let Err(e) = serde_json::from_str::<serde_json::Value>(features_json) {
            tracing::error!("Invalid layer JSON: {}", e);
            return Err(RasterError::invalid_argument(format!(
                "the provided JSON is not valid: {}",
                e
            )));
        }

        let saved = self
            .repository
            .save(Layer {
                id: None,
                layer_type: layer_type.to_string(),
                json: features_json.to_string(),
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            "Layer saved: id={:?}, type={}",
            saved.id,
            saved.layer_type
        );
        Ok(saved)
    }

    pub async fn list_layers(&self) -> Result<Vec<Layer>> {
        self.repository.find_all().await
    }

    pub async fn layers_by_type(&self, layer_type: &str) -> Result<Vec<Layer>> {
        self.repository
            .find_by_field("type", &serde_json::Value::from(layer_type))
            .await
    }

    /// 刪除成功回傳 true，不存在回傳 false
    pub async fn delete_layer(&self, id: u64) -> Result<bool> {
        if self.repository.exists_by_id(id).await? {
            self.repository.delete_by_id(id).await?;
            tracing::info!("Layer deleted: id={}", id);
            return Ok(true);
        }
        tracing::warn!("Attempt to delete missing layer: id={}", id);
        Ok(false)
    }
}
