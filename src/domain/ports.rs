use crate::domain::model::{GraphicRecord, Layer, ProviderDocument};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// External population-data service.
///
/// `Ok(None)` means the provider answered without usable data.
#[async_trait]
pub trait RasterProvider: Send + Sync {
    async fn fetch_raster_metadata(&self, country_code: &str) -> Result<Option<ProviderDocument>>;
    async fn fetch_density_metadata(&self, country_code: &str)
        -> Result<Option<ProviderDocument>>;
}

#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

pub trait Entity: Serialize + Clone + Send + Sync + 'static {
    fn id(&self) -> Option<u64>;
    fn assign_id(&mut self, id: u64);
}

impl Entity for Layer {
    fn id(&self) -> Option<u64> {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl Entity for GraphicRecord {
    fn id(&self) -> Option<u64> {
        self.id
    }

    fn assign_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

/// Generic storage interface. `field` names refer to the entity's
/// serialized form (e.g. `"type"`, `"name"`, `"year"`).
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn save(&self, item: T) -> Result<T>;
    async fn save_all(&self, items: Vec<T>) -> Result<Vec<T>> {
        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            saved.push(self.save(item).await?);
        }
        Ok(saved)
    }
    async fn find_all(&self) -> Result<Vec<T>>;
    async fn find_by_field(&self, field: &str, value: &serde_json::Value) -> Result<Vec<T>>;
    async fn delete_by_field(&self, field: &str, value: &serde_json::Value) -> Result<usize>;
    async fn delete_by_id(&self, id: u64) -> Result<bool>;
    async fn exists_by_id(&self, id: u64) -> Result<bool>;
}
