use async_trait::async_trait;

use crate::errors::Result;
use crate::storage::models::{DeletionRequest, InternalStats, StorageType, UrlRecord, UrlWithCorrelation};

/// 存储能力接口，内存存储与关系型存储各自实现
///
/// 所有错误都以返回值传递；重复写入统一为 `LinkvaultError::AlreadyExists`，
/// 与具体后端无关。
#[async_trait]
pub trait Repository: Send + Sync {
    /// 保存一条记录；短 ID 已存在时返回 `AlreadyExists`，不会覆盖
    async fn save(&self, short_id: &str, original_url: &str, owner_id: &str) -> Result<()>;

    /// 批量保存，全部成功或全部不生效
    async fn save_batch(&self, urls: &[UrlWithCorrelation], owner_id: &str) -> Result<()>;

    /// `None` 表示从未存在；`Some` 且 `deleted == true` 表示已删除
    async fn get(&self, short_id: &str) -> Result<Option<UrlRecord>>;

    /// 返回用户名下未删除的记录，按创建顺序
    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<UrlRecord>>;

    /// 软删除用户名下的记录，返回实际由未删除变为已删除的条数
    async fn delete_batch(&self, request: &DeletionRequest) -> Result<u64>;

    async fn stats(&self) -> Result<InternalStats>;

    fn get_type(&self) -> StorageType;

    /// 健康检查
    async fn ping(&self) -> Result<()>;

    /// 关闭前刷盘 / 释放资源
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
