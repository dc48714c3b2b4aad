//! 启动时从事件日志回放内存状态

use tracing::{debug, info, warn};

use super::{EventRecord, MemoryState, MemoryStore, StoreState, read_events};
use crate::errors::{LinkvaultError, Result};

impl MemoryStore {
    /// 回放事件日志，返回成功处理的事件数
    ///
    /// 格式错误的行记录日志后跳过；读取失败（IO）直接返回错误。
    /// 回放结束后序号置为 max(处理行数, 见到的最大序号)。
    pub fn restore_from_file(&self) -> Result<usize> {
        let mut state = self.inner.lock();
        state.state = StoreState::Restoring;
        let result = replay(&mut state, self);
        state.state = StoreState::Ready;
        result
    }
}

fn replay(state: &mut MemoryState, store: &MemoryStore) -> Result<usize> {
    let path = store.log_path();
    info!("Restoring in-memory storage from {}", path.display());

    let mut processed = 0usize;
    let mut skipped = 0usize;
    let mut highest = 0u64;

    for (line_no, item) in read_events(path)? {
        let event = match item {
            Ok(event) => event,
            Err(LinkvaultError::Serialization(msg)) => {
                warn!("Skipping malformed event at line {}: {}", line_no, msg);
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        processed += 1;
        highest = highest.max(event.sequence);
        apply_event(state, event, line_no);
    }

    let sequence = (processed as u64).max(highest);
    state.log.set_sequence(sequence);

    info!(
        "Restore finished: {} events applied, {} malformed lines skipped, sequence = {}",
        processed, skipped, sequence
    );
    Ok(processed)
}

fn apply_event(state: &mut MemoryState, event: EventRecord, line_no: usize) {
    if !event.deleted {
        let short_id = event.short_url.clone();
        if let Err(e) = state.insert(event.into_record()) {
            debug!("Event at line {} for {} ignored: {}", line_no, short_id, e);
        }
        return;
    }

    match state.records.get_mut(&event.short_url) {
        Some(record) if record.owner_id == event.owner_id => {
            record.deleted = true;
        }
        Some(record) => {
            warn!(
                "Deletion event at line {} for {} has owner {}, record belongs to {}; ignored",
                line_no, event.short_url, event.owner_id, record.owner_id
            );
        }
        None => {
            // 创建事件丢失时仍保留删除状态，短 ID 保持占用
            let _ = state.insert(event.into_record());
        }
    }
}
