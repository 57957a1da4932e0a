use crate::domain::model::{GraphicRecord, PopulationImage};
use crate::domain::ports::Repository;
use crate::utils::error::Result;
use std::sync::Arc;

pub struct GraphicService {
    repository: Arc<dyn Repository<GraphicRecord>>,
}

impl GraphicService {
    pub fn new(repository: Arc<dyn Repository<GraphicRecord>>) -> Self {
        Self { repository }
    }

    /// 每張人口影像存成一筆紀錄，全部使用同一個名稱
    pub async fn save_population_graphics(
        &self,
        name: &str,
        images: &[PopulationImage],
    ) -> Result<Vec<GraphicRecord>> {
        if images.is_empty() {
            tracing::warn!("No population images provided to save for name: {}", name);
            return Ok(Vec::new());
        }

        let records = images
            .iter()
            .map(|image| GraphicRecord::from_image(name, image))
            .collect();

        let saved = self.repository.save_all(records).await?;
        tracing::info!("Saved {} graphics with name: {}", saved.len(), name);
        Ok(saved)
    }

    pub async fn graphics_by_name(&self, name: &str) -> Result<Vec<GraphicRecord>> {
        self.repository
            .find_by_field("name", &serde_json::Value::from(name))
            .await
    }

    pub async fn delete_graphics_by_name(&self, name: &str) -> Result<usize> {
        let removed = self
            .repository
            .delete_by_field("name", &serde_json::Value::from(name))
            .await?;
        tracing::info!("Deleted {} graphics for name: {}", removed, name);
        Ok(removed)
    }

    pub async fn graphic_urls_by_year(&self, year: i32) -> Result<Vec<String>> {
        let records = self
            .repository
            .find_by_field("year", &serde_json::Value::from(year))
            .await?;
        Ok(records.into_iter().map(|record| record.url).collect())
    }
}
