//! In-memory storage backend
//!
//! 所有状态（记录表、用户索引、事件日志）放在同一把互斥锁后面，
//! 保证日志行的顺序与内存修改的顺序一致。

mod event_log;
mod restore;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::config::{DurabilityPolicy, StorageConfig};
use crate::errors::{LinkvaultError, Result};
use crate::storage::Repository;
use crate::storage::models::{
    DeletionRequest, InternalStats, StorageType, UrlRecord, UrlWithCorrelation,
};

pub use event_log::{EventLog, EventReader, EventRecord, read_events};

/// 内存存储的运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Ready,
    /// 回放日志中，不再向日志追加事件
    Restoring,
}

struct MemoryState {
    records: HashMap<String, UrlRecord>,
    /// owner -> 短 ID（插入顺序）
    by_owner: HashMap<String, Vec<String>>,
    log: EventLog,
    state: StoreState,
}

impl MemoryState {
    fn new(log: EventLog) -> Self {
        Self {
            records: HashMap::new(),
            by_owner: HashMap::new(),
            log,
            state: StoreState::Ready,
        }
    }

    fn insert(&mut self, record: UrlRecord) -> Result<()> {
        if self.records.contains_key(&record.short_id) {
            return Err(LinkvaultError::already_exists(format!(
                "短链接已存在: {}",
                record.short_id
            )));
        }

        self.by_owner
            .entry(record.owner_id.clone())
            .or_default()
            .push(record.short_id.clone());
        self.records.insert(record.short_id.clone(), record);
        Ok(())
    }

    /// 撤销最近一次 insert
    fn undo_insert(&mut self, short_id: &str) {
        if let Some(record) = self.records.remove(short_id)
            && let Some(ids) = self.by_owner.get_mut(&record.owner_id)
        {
            if let Some(pos) = ids.iter().rposition(|id| id == short_id) {
                ids.remove(pos);
            }
            if ids.is_empty() {
                self.by_owner.remove(&record.owner_id);
            }
        }
    }

    /// 为已生效的修改分配序号并写日志
    ///
    /// 回放期间只推进序号。写入失败时按持久化策略处理：
    /// best_effort 记录警告后视为成功，strict 回退序号并返回错误，
    /// 由调用方撤销内存修改。
    fn record_events(
        &mut self,
        records: &[&UrlRecord],
        durability: DurabilityPolicy,
    ) -> Result<()> {
        let before = self.log.current_sequence();
        let events: Vec<EventRecord> = records
            .iter()
            .map(|record| EventRecord::from_record(self.log.next_sequence(), record))
            .collect();

        if self.state == StoreState::Restoring {
            return Ok(());
        }

        match self.log.append_all(&events) {
            Ok(()) => Ok(()),
            Err(e) => match durability {
                DurabilityPolicy::BestEffort => {
                    warn!(
                        "Failed to append {} event(s) to log, keeping in-memory change: {}",
                        events.len(),
                        e
                    );
                    Ok(())
                }
                DurabilityPolicy::Strict => {
                    self.log.set_sequence(before);
                    Err(e)
                }
            },
        }
    }

    fn apply_save(&mut self, record: UrlRecord, durability: DurabilityPolicy) -> Result<()> {
        self.insert(record.clone())?;

        if let Err(e) = self.record_events(&[&record], durability) {
            self.undo_insert(&record.short_id);
            return Err(e);
        }
        Ok(())
    }

    fn live_records_of(&self, owner_id: &str) -> Vec<UrlRecord> {
        self.by_owner
            .get(owner_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.records.get(id))
                    .filter(|record| !record.deleted)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// 内存存储后端，由事件日志提供崩溃恢复
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
    durability: DurabilityPolicy,
    log_path: PathBuf,
}

impl MemoryStore {
    /// 分配内存结构并以追加模式打开事件日志
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let log = EventLog::open(&config.file_storage_path)?;
        info!(
            "In-memory storage initialized (event log: {}, durability: {})",
            config.file_storage_path, config.durability
        );
        Ok(Self::with_log(log, config.durability))
    }

    /// 使用已构造的事件日志创建存储
    pub fn with_log(log: EventLog, durability: DurabilityPolicy) -> Self {
        let log_path = log.path().to_path_buf();
        Self {
            inner: Mutex::new(MemoryState::new(log)),
            durability,
            log_path,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn durability(&self) -> DurabilityPolicy {
        self.durability
    }

    pub fn state(&self) -> StoreState {
        self.inner.lock().state
    }

    /// 当前日志序号
    pub fn sequence(&self) -> u64 {
        self.inner.lock().log.current_sequence()
    }

    /// 当前记录数（含已删除）
    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全量快照，按短 ID 排序
    pub fn snapshot(&self) -> Vec<UrlRecord> {
        let state = self.inner.lock();
        let mut records: Vec<UrlRecord> = state.records.values().cloned().collect();
        records.sort_by(|a, b| a.short_id.cmp(&b.short_id));
        records
    }
}

#[async_trait]
impl Repository for MemoryStore {
    async fn save(&self, short_id: &str, original_url: &str, owner_id: &str) -> Result<()> {
        let record = UrlRecord::new(short_id, original_url, owner_id);
        self.inner.lock().apply_save(record, self.durability)?;
        debug!("Short URL saved in memory: {}", short_id);
        Ok(())
    }

    async fn save_batch(&self, urls: &[UrlWithCorrelation], owner_id: &str) -> Result<()> {
        if urls.is_empty() {
            return Ok(());
        }

        let mut state = self.inner.lock();

        // 先整体校验，任何冲突都不落地
        let mut seen = HashSet::with_capacity(urls.len());
        for url in urls {
            if state.records.contains_key(&url.short_id) || !seen.insert(url.short_id.as_str()) {
                return Err(LinkvaultError::already_exists(format!(
                    "短链接已存在: {} (correlation_id: {})",
                    url.short_id, url.correlation_id
                )));
            }
        }

        let records: Vec<UrlRecord> = urls
            .iter()
            .map(|url| UrlRecord::new(&url.short_id, &url.original_url, owner_id))
            .collect();
        for record in &records {
            state.insert(record.clone())?;
        }

        let refs: Vec<&UrlRecord> = records.iter().collect();
        if let Err(e) = state.record_events(&refs, self.durability) {
            for record in records.iter().rev() {
                state.undo_insert(&record.short_id);
            }
            return Err(e);
        }

        debug!("Batch of {} short URLs saved in memory", records.len());
        Ok(())
    }

    async fn get(&self, short_id: &str) -> Result<Option<UrlRecord>> {
        Ok(self.inner.lock().records.get(short_id).cloned())
    }

    async fn get_by_owner(&self, owner_id: &str) -> Result<Vec<UrlRecord>> {
        Ok(self.inner.lock().live_records_of(owner_id))
    }

    async fn delete_batch(&self, request: &DeletionRequest) -> Result<u64> {
        let mut state = self.inner.lock();

        let mut transitioned = Vec::new();
        for short_id in &request.short_ids {
            if let Some(record) = state.records.get_mut(short_id)
                && record.owner_id == request.owner_id
                && !record.deleted
            {
                record.deleted = true;
                transitioned.push(record.clone());
            }
        }

        let refs: Vec<&UrlRecord> = transitioned.iter().collect();
        if let Err(e) = state.record_events(&refs, self.durability) {
            for record in &transitioned {
                if let Some(stored) = state.records.get_mut(&record.short_id) {
                    stored.deleted = false;
                }
            }
            return Err(e);
        }

        Ok(transitioned.len() as u64)
    }

    async fn stats(&self) -> Result<InternalStats> {
        let state = self.inner.lock();
        let mut owners = HashSet::new();
        let mut urls = 0u64;
        for record in state.records.values().filter(|r| !r.deleted) {
            urls += 1;
            owners.insert(record.owner_id.as_str());
        }
        Ok(InternalStats {
            urls,
            users: owners.len() as u64,
        })
    }

    fn get_type(&self) -> StorageType {
        StorageType::InMemory
    }

    async fn ping(&self) -> Result<()> {
        std::fs::metadata(&self.log_path).map(|_| ()).map_err(|e| {
            LinkvaultError::file_operation(format!(
                "事件日志不可访问 {}: {}",
                self.log_path.display(),
                e
            ))
        })
    }

    async fn close(&self) -> Result<()> {
        self.inner.lock().log.sync()?;
        info!("In-memory storage closed, event log synced");
        Ok(())
    }
}
