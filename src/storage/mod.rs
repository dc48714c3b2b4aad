use std::sync::Arc;

use tracing::info;

use crate::config::StaticConfig;
use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;
pub mod traits;

pub use backend::SeaOrmStore;
pub use memory::{MemoryStore, StoreState};
pub use models::{DeletionRequest, InternalStats, StorageType, UrlRecord, UrlWithCorrelation};
pub use traits::Repository;

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// 配置了 database_url 时使用关系型存储，否则使用内存存储并先回放事件日志
    ///
    /// 任何初始化失败都直接返回，调用方不应带着不可用的存储继续启动。
    pub async fn create(config: &StaticConfig) -> Result<Arc<dyn Repository>> {
        if config.uses_database() {
            let store = SeaOrmStore::connect(&config.database).await?;
            return Ok(Arc::new(store));
        }

        let store = MemoryStore::open(&config.storage)?;
        let restored = store.restore_from_file()?;
        info!(
            "In-memory storage ready with {} events replayed from {}",
            restored,
            store.log_path().display()
        );
        Ok(Arc::new(store))
    }
}
