//! Write operations for SeaOrmStore

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DbErr, EntityTrait, QueryFilter, SqlErr, TransactionTrait};
use tracing::{debug, info};

use super::SeaOrmStore;
use super::converters::new_active_model;
use super::retry;
use crate::errors::{LinkvaultError, Result};
use crate::storage::models::{DeletionRequest, UrlWithCorrelation};

use migration::entities::short_url;

/// 唯一约束冲突统一映射为 AlreadyExists
fn map_insert_error(err: DbErr, short_id: &str) -> LinkvaultError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            LinkvaultError::already_exists(format!("短链接已存在: {}", short_id))
        }
        _ => LinkvaultError::database_operation(format!("写入短链接 {} 失败: {}", short_id, err)),
    }
}

impl SeaOrmStore {
    pub(super) async fn insert_url(
        &self,
        short_id: &str,
        original_url: &str,
        owner_id: &str,
    ) -> Result<()> {
        let db = &self.db;

        retry::with_retry(&format!("save({})", short_id), self.retry_config, || async {
            short_url::Entity::insert(new_active_model(short_id, original_url, owner_id))
                .exec_without_returning(db)
                .await
        })
        .await
        .map_err(|e| map_insert_error(e, short_id))?;

        debug!("Short URL saved: {}", short_id);
        Ok(())
    }

    /// 同一事务内逐条插入，任何一条失败整体回滚
    pub(super) async fn insert_batch(
        &self,
        urls: &[UrlWithCorrelation],
        owner_id: &str,
    ) -> Result<()> {
        if urls.is_empty() {
            return Ok(());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| LinkvaultError::database_operation(format!("开启事务失败: {}", e)))?;

        for url in urls {
            let model = new_active_model(&url.short_id, &url.original_url, owner_id);
            if let Err(e) = short_url::Entity::insert(model)
                .exec_without_returning(&txn)
                .await
            {
                let err = map_insert_error(e, &url.short_id);
                txn.rollback().await.map_err(|e| {
                    LinkvaultError::database_operation(format!("回滚事务失败: {}", e))
                })?;
                return Err(err);
            }
        }

        txn.commit()
            .await
            .map_err(|e| LinkvaultError::database_operation(format!("提交事务失败: {}", e)))?;

        info!("Batch of {} short URLs saved", urls.len());
        Ok(())
    }

    /// 软删除：只更新属于该用户且尚未删除的行
    pub(super) async fn mark_deleted(&self, request: &DeletionRequest) -> Result<u64> {
        if request.short_ids.is_empty() {
            return Ok(0);
        }

        let db = &self.db;
        let label = format!("delete_batch(owner={})", request.owner_id);

        let affected = retry::with_retry(&label, self.retry_config, || async {
            let txn = db.begin().await?;
            let result = short_url::Entity::update_many()
                .col_expr(short_url::Column::IsDeleted, Expr::value(true))
                .filter(short_url::Column::ShortUrl.is_in(request.short_ids.iter().cloned()))
                .filter(short_url::Column::UserId.eq(request.owner_id.as_str()))
                .filter(short_url::Column::IsDeleted.eq(false))
                .exec(&txn)
                .await?;
            txn.commit().await?;
            Ok(result.rows_affected)
        })
        .await
        .map_err(|e| LinkvaultError::database_operation(format!("删除短链接失败: {}", e)))?;

        debug!(
            "Soft-deleted {} of {} requested URLs for {}",
            affected,
            request.short_ids.len(),
            request.owner_id
        );
        Ok(affected)
    }
}
