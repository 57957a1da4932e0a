use crate::domain::ports::{Entity, Repository};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

struct Table<T> {
    rows: Vec<T>,
    next_id: u64,
}

#[derive(Clone)]
pub struct InMemoryRepository<T> {
    table: Arc<Mutex<Table<T>>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                rows: Vec::new(),
                next_id: 1,
            })),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn field_matches<T: Entity>(item: &T, field: &str, value: &serde_json::Value) -> bool {
    serde_json::to_value(item)
        .ok()
        .and_then(|v| v.get(field).cloned())
        .is_some_and(|v| &v == value)
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn save(&self, mut item: T) -> Result<T> {
        let mut table = self.table.lock().await;

        match item.id() {
            Some(id) => {
                // 已有 id：覆蓋同 id 的資料列
                table.rows.retain(|row| row.id() != Some(id));
                table.next_id = table.next_id.max(id + 1);
            }
            None => {
                let id = table.next_id;
                table.next_id += 1;
                item.assign_id(id);
            }
        }

        table.rows.push(item.clone());
        Ok(item)
    }

    async fn find_all(&self) -> Result<Vec<T>> {
        let table = self.table.lock().await;
        Ok(table.rows.clone())
    }

    async fn find_by_field(&self, field: &str, value: &serde_json::Value) -> Result<Vec<T>> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .iter()
            .filter(|row| field_matches(*row, field, value))
            .cloned()
            .collect())
    }

    async fn delete_by_field(&self, field: &str, value: &serde_json::Value) -> Result<usize> {
        let mut table = self.table.lock().await;
        let before = table.rows.len();
        table.rows.retain(|row| !field_matches(row, field, value));
        Ok(before - table.rows.len())
    }

    async fn delete_by_id(&self, id: u64) -> Result<bool> {
        let mut table = self.table.lock().await;
        let before = table.rows.len();
        table.rows.retain(|row| row.id() != Some(id));
        Ok(table.rows.len() < before)
    }

    async fn exists_by_id(&self, id: u64) -> Result<bool> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().any(|row| row.id() == Some(id)))
    }
}
