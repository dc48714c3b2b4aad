//! SeaORM storage backend
//!
//! Relational storage over SQLite, MySQL/MariaDB or PostgreSQL,
//! chosen from the connection string.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::errors::{LinkvaultError, Result};
use crate::storage::Repository;
use crate::storage::models::{
    DeletionRequest, InternalStats, StorageType, UrlRecord, UrlWithCorrelation,
};

pub use connection::{
    Backend, connect_generic, connect_sqlite, infer_backend_from_url, normalize_url,
    run_migrations,
};
pub use converters::{model_to_record, new_active_model};

/// 关系型存储；不持有进程内锁，并发控制交给数据库
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend: Backend,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStore {
    /// 建立连接池、检查连通性并执行迁移
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if config.database_url.trim().is_empty() {
            return Err(LinkvaultError::database_config("database_url 未设置"));
        }

        let backend = infer_backend_from_url(&config.database_url)?;
        let url = normalize_url(&config.database_url, backend);

        let db = match backend {
            Backend::Sqlite => connect_sqlite(&url, config).await?,
            Backend::Mysql | Backend::Postgres => connect_generic(&url, backend, config).await?,
        };

        db.ping().await.map_err(|e| {
            LinkvaultError::database_connection(format!("数据库连通性检查失败: {}", e))
        })?;
        run_migrations(&db).await?;

        info!("{} storage initialized", backend.as_ref().to_uppercase());
        Ok(Self {
            db,
            backend,
            retry_config: retry::RetryConfig::from(config),
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl Repository for SeaOrmStore {
    async fn save(&self, short_id: &str, original_url: &str, owner_id: &str) -> Result<()> {
        self.insert_url(short_id, original_url, owner_id).await
    }

    async fn save_batch(&self, urls: &[UrlWithCorrelation], owner_id: &str) -> Result<()> {
        self.insert_batch(urls, owner_id).await
    }

    async fn get(&self, short_id: &str) -> Result<Option<UrlRecord>> {
        self.find_url(short_id).await
    }

    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<UrlRecord>> {
        self.find_by_owner(owner_id).await
    }

    async fn delete_batch(&self, request: &DeletionRequest) -> Result<u64> {
        self.mark_deleted(request).await
    }

    async fn stats(&self) -> Result<InternalStats> {
        self.count_stats().await
    }

    fn get_type(&self) -> StorageType {
        StorageType::Database
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(|e| {
            LinkvaultError::database_connection(format!("{} 不可用: {}", self.backend, e))
        })
    }

    async fn close(&self) -> Result<()> {
        if let Err(e) = self.db.clone().close().await {
            warn!("Failed to close {} connection pool: {}", self.backend, e);
        }
        Ok(())
    }
}
