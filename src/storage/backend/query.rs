//! Read-only operations for SeaOrmStore

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use super::converters::model_to_record;
use super::{SeaOrmStore, retry};
use crate::errors::{LinkvaultError, Result};
use crate::storage::models::{InternalStats, UrlRecord};

use migration::entities::short_url;

impl SeaOrmStore {
    pub(super) async fn find_url(&self, short_id: &str) -> Result<Option<UrlRecord>> {
        let db = &self.db;

        let model = retry::with_retry(&format!("get({})", short_id), self.retry_config, || async {
            short_url::Entity::find()
                .filter(short_url::Column::ShortUrl.eq(short_id))
                .one(db)
                .await
        })
        .await
        .map_err(|e| LinkvaultError::database_operation(format!("查询短链接失败: {}", e)))?;

        Ok(model.map(model_to_record))
    }

    pub(super) async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<UrlRecord>> {
        let db = &self.db;

        let models = retry::with_retry(
            &format!("get_by_owner({})", owner_id),
            self.retry_config,
            || async {
                short_url::Entity::find()
                    .filter(short_url::Column::UserId.eq(owner_id))
                    .filter(short_url::Column::IsDeleted.eq(false))
                    // 自增 id 即插入顺序，与内存后端一致
                    .order_by_asc(short_url::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| LinkvaultError::database_operation(format!("查询用户短链接失败: {}", e)))?;

        Ok(models.into_iter().map(model_to_record).collect())
    }

    pub(super) async fn count_stats(&self) -> Result<InternalStats> {
        let db = &self.db;

        let (urls, users) = retry::with_retry("stats", self.retry_config, || async {
            let urls = short_url::Entity::find()
                .filter(short_url::Column::IsDeleted.eq(false))
                .count(db)
                .await?;
            let users = short_url::Entity::find()
                .select_only()
                .column(short_url::Column::UserId)
                .filter(short_url::Column::IsDeleted.eq(false))
                .distinct()
                .count(db)
                .await?;
            Ok((urls, users))
        })
        .await
        .map_err(|e| LinkvaultError::database_operation(format!("统计查询失败: {}", e)))?;

        Ok(InternalStats { urls, users })
    }
}
