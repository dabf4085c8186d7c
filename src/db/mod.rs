pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use self::redis::{create_redis_client, Cache, CacheKey, CacheWriterHandle};
pub use memory::MemoryClothingStore;
pub use postgres::{create_pool, run_migrations, PgClothingStore};
pub use store::ClothingStore;
