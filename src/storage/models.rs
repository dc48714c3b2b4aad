use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// 一条短链接记录
///
/// `deleted` 为软删除标记：记录永远不会被物理删除，短 ID 也不会被释放。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub short_id: String,
    pub original_url: String,
    pub owner_id: String,
    #[serde(default)]
    pub deleted: bool,
}

impl UrlRecord {
    pub fn new(
        short_id: impl Into<String>,
        original_url: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            short_id: short_id.into(),
            original_url: original_url.into(),
            owner_id: owner_id.into(),
            deleted: false,
        }
    }
}

/// 批量缩短时的输入项，correlation_id 只用于把输出与客户端输入对应起来
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlWithCorrelation {
    pub short_id: String,
    pub original_url: String,
    pub correlation_id: String,
}

/// 删除请求，只作用于 owner_id 名下的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRequest {
    pub short_ids: Vec<String>,
    pub owner_id: String,
}

impl DeletionRequest {
    pub fn new(short_ids: Vec<String>, owner_id: impl Into<String>) -> Self {
        Self {
            short_ids,
            owner_id: owner_id.into(),
        }
    }
}

/// 内部统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalStats {
    /// 未删除的短链接数
    pub urls: u64,
    /// 拥有未删除短链接的用户数
    pub users: u64,
}

/// 存储后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageType {
    #[serde(rename = "inmemory")]
    #[strum(serialize = "inmemory")]
    InMemory,
    Database,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_type_strings() {
        assert_eq!(StorageType::InMemory.as_ref(), "inmemory");
        assert_eq!(StorageType::Database.to_string(), "database");
        assert_eq!(
            serde_json::to_string(&StorageType::InMemory).unwrap(),
            "\"inmemory\""
        );
    }

    #[test]
    fn test_new_record_is_live() {
        let record = UrlRecord::new("a1b2c3d4", "https://example.com", "user-1");
        assert!(!record.deleted);
        assert_eq!(record.owner_id, "user-1");
    }
}
