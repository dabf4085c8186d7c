use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    db::ClothingStore,
    error::AppResult,
    models::{ClothingId, ClothingPatch, ClothingRecord, ConditionFilter, NewClothingItem},
};

/// In-process clothing store, kept in insertion order
#[derive(Clone, Default)]
pub struct MemoryClothingStore {
    records: Arc<RwLock<Vec<ClothingRecord>>>,
}

impl MemoryClothingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ClothingStore for MemoryClothingStore {
    async fn list(&self) -> AppResult<Vec<ClothingRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn get(&self, id: ClothingId) -> AppResult<Option<ClothingRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id.0).cloned())
    }

    async fn find_matching(&self, filter: &ConditionFilter) -> AppResult<Vec<ClothingRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| filter.matches(&r.weather_conditions))
            .cloned()
            .collect())
    }

    async fn create(&self, item: NewClothingItem) -> AppResult<ClothingRecord> {
        let record = ClothingRecord {
            id: ClothingId::new().0,
            name: item.name,
            weather_conditions: item.weather_conditions,
            created_at: Utc::now(),
        };

        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: ClothingId, patch: ClothingPatch) -> AppResult<u64> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id.0) {
            Some(record) => {
                patch.apply(record);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: ClothingId) -> AppResult<u64> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id.0);
        Ok((before - records.len()) as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
