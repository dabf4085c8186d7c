use crate::{
    error::AppResult,
    models::{ClothingId, ClothingPatch, ClothingRecord, ConditionFilter, NewClothingItem},
};

/// Persistence for clothing recommendations
///
/// Implementations own identifier assignment. `update` and `delete` report the
/// number of affected records so callers can tell a missing target apart from
/// a store failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ClothingStore: Send + Sync {
    /// All items, oldest first
    async fn list(&self) -> AppResult<Vec<ClothingRecord>>;

    async fn get(&self, id: ClothingId) -> AppResult<Option<ClothingRecord>>;

    /// Items whose `weather_conditions` intersect the filter tokens
    async fn find_matching(&self, filter: &ConditionFilter) -> AppResult<Vec<ClothingRecord>>;

    async fn create(&self, item: NewClothingItem) -> AppResult<ClothingRecord>;

    async fn update(&self, id: ClothingId, patch: ClothingPatch) -> AppResult<u64>;

    async fn delete(&self, id: ClothingId) -> AppResult<u64>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
