//! Link service
//!
//! Glue between callers (CLI today, any handler layer later) and the
//! repository: validation, short ID derivation, URL rendering and
//! handing deletions to the pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::deletion::DeletionQueue;
use crate::errors::{LinkvaultError, Result};
use crate::storage::{DeletionRequest, InternalStats, Repository, StorageType, UrlWithCorrelation};
use crate::utils::{generate_id, validate_url};

/// 单条缩短的结果，两种情况都带短链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenOutcome {
    Created(String),
    /// URL 之前已被缩短过
    Existing(String),
}

impl ShortenOutcome {
    pub fn short_url(&self) -> &str {
        match self {
            ShortenOutcome::Created(url) | ShortenOutcome::Existing(url) => url,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, ShortenOutcome::Created(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchShortenItem {
    pub correlation_id: String,
    pub original_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchShortenResult {
    pub correlation_id: String,
    pub short_url: String,
}

/// 短 ID 解析结果；从未存在的 ID 以 `NotFound` 错误返回
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    /// 已被软删除
    Gone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUrl {
    pub short_url: String,
    pub original_url: String,
}

#[derive(Clone)]
pub struct LinkService {
    repository: Arc<dyn Repository>,
    deletions: DeletionQueue,
    base_url: String,
}

impl LinkService {
    pub fn new(
        repository: Arc<dyn Repository>,
        deletions: DeletionQueue,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            repository,
            deletions,
            base_url,
        }
    }

    pub fn storage_type(&self) -> StorageType {
        self.repository.get_type()
    }

    /// `{base_url}/{short_id}`
    pub fn short_url(&self, short_id: &str) -> String {
        format!("{}/{}", self.base_url, short_id)
    }

    pub async fn shorten(&self, original_url: &str, owner_id: &str) -> Result<ShortenOutcome> {
        let url = validate_url(original_url)?;
        require_owner(owner_id)?;

        let short_id = generate_id(url);
        match self.repository.save(&short_id, url, owner_id).await {
            Ok(()) => {
                info!("Shortened {} -> {}", url, short_id);
                Ok(ShortenOutcome::Created(self.short_url(&short_id)))
            }
            Err(e) if e.is_already_exists() => {
                debug!("URL already shortened as {}", short_id);
                Ok(ShortenOutcome::Existing(self.short_url(&short_id)))
            }
            Err(e) => Err(e),
        }
    }

    /// 批量缩短，按输入顺序返回并回显 correlation_id
    ///
    /// 同一批次内重复的 URL 只写一次；任何一条已存在时整批不生效。
    pub async fn shorten_batch(
        &self,
        items: &[BatchShortenItem],
        owner_id: &str,
    ) -> Result<Vec<BatchShortenResult>> {
        if items.is_empty() {
            return Err(LinkvaultError::validation("批量请求不能为空"));
        }
        require_owner(owner_id)?;

        let mut results = Vec::with_capacity(items.len());
        let mut to_save = Vec::with_capacity(items.len());
        let mut seen = HashSet::with_capacity(items.len());

        for item in items {
            let url = validate_url(&item.original_url).map_err(|e| {
                LinkvaultError::validation(format!(
                    "correlation_id {}: {}",
                    item.correlation_id,
                    e.message()
                ))
            })?;
            let short_id = generate_id(url);

            results.push(BatchShortenResult {
                correlation_id: item.correlation_id.clone(),
                short_url: self.short_url(&short_id),
            });
            if seen.insert(short_id.clone()) {
                to_save.push(UrlWithCorrelation {
                    short_id,
                    original_url: url.to_string(),
                    correlation_id: item.correlation_id.clone(),
                });
            }
        }

        self.repository.save_batch(&to_save, owner_id).await?;
        info!("Shortened batch of {} URLs for {}", to_save.len(), owner_id);
        Ok(results)
    }

    pub async fn resolve(&self, short_id: &str) -> Result<Resolution> {
        match self.repository.get(short_id).await? {
            Some(record) if record.deleted => Ok(Resolution::Gone),
            Some(record) => Ok(Resolution::Found(record.original_url)),
            None => Err(LinkvaultError::not_found(format!(
                "短链接不存在: {}",
                short_id
            ))),
        }
    }

    pub async fn user_urls(&self, owner_id: &str) -> Result<Vec<UserUrl>> {
        require_owner(owner_id)?;
        let records = self.repository.get_by_owner(owner_id).await?;
        Ok(records
            .into_iter()
            .map(|record| UserUrl {
                short_url: self.short_url(&record.short_id),
                original_url: record.original_url,
            })
            .collect())
    }

    /// 只负责入队，实际删除由删除管道异步完成
    pub fn delete_urls(&self, short_ids: Vec<String>, owner_id: &str) -> Result<()> {
        require_owner(owner_id)?;
        if short_ids.is_empty() {
            return Err(LinkvaultError::validation("待删除的短链接列表为空"));
        }

        let count = short_ids.len();
        self.deletions
            .enqueue(DeletionRequest::new(short_ids, owner_id))?;
        debug!("Queued deletion of {} URLs for {}", count, owner_id);
        Ok(())
    }

    pub async fn stats(&self) -> Result<InternalStats> {
        self.repository.stats().await
    }

    pub async fn ping(&self) -> Result<()> {
        self.repository.ping().await
    }
}

fn require_owner(owner_id: &str) -> Result<()> {
    if owner_id.trim().is_empty() {
        return Err(LinkvaultError::validation("用户 ID 不能为空"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_outcome_accessors() {
        let created = ShortenOutcome::Created("http://localhost:8080/a1b2c3d4".into());
        let existing = ShortenOutcome::Existing("http://localhost:8080/a1b2c3d4".into());
        assert!(created.is_created());
        assert!(!existing.is_created());
        assert_eq!(created.short_url(), existing.short_url());
    }

    #[test]
    fn test_require_owner() {
        assert!(require_owner("user-1").is_ok());
        assert!(require_owner("  ").is_err());
    }
}
