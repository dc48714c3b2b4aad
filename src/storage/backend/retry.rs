//! 瞬时数据库错误的退避重试
//!
//! 只对连接类错误和锁冲突（死锁、锁等待超时、SQLite BUSY）重试，
//! 唯一约束冲突等业务错误立即返回。

use std::future::Future;
use std::ops::Deref;
use std::time::Duration;

use rand::RngExt;
use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// MySQL 1213/1205, PostgreSQL 40001/40P01, SQLite 5/6
const RETRYABLE_CODES: &[&str] = &["1213", "1205", "40001", "40P01", "5", "6"];

const RETRYABLE_MESSAGES: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "database is locked",
    "serialization failure",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 错误是否值得重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime) | DbErr::Query(runtime) => is_transient(runtime),
        _ => false,
    }
}

fn is_transient(err: &RuntimeErr) -> bool {
    let message = match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            let code = sqlx_err
                .deref()
                .as_database_error()
                .and_then(|db_err| db_err.code());
            if let Some(code) = code {
                let code: &str = &code;
                return RETRYABLE_CODES.contains(&code);
            }
            sqlx_err.to_string()
        }
        RuntimeErr::Internal(msg) => msg.clone(),
        #[allow(unreachable_patterns)]
        _ => return false,
    };

    let message = message.to_lowercase();
    RETRYABLE_MESSAGES.iter().any(|needle| message.contains(needle))
}

/// 第 attempt 次重试前的等待时间：指数增长、封顶，再加 0~25% 抖动
fn backoff_delay(attempt: u32, config: RetryConfig) -> Duration {
    let exp = config
        .base_delay_ms
        .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp.min(config.max_delay_ms);
    let jitter = rand::rng().random_range(0..=capped / 4);
    Duration::from_millis(capped.saturating_add(jitter))
}

/// 执行操作，遇到可重试错误时按退避策略重试
pub async fn with_retry<T, F, Fut>(label: &str, config: RetryConfig, mut op: F) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0u32;
    loop {
        let err = match op().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", label, attempt);
                }
                return Ok(value);
            }
            Err(err) => err,
        };

        if attempt >= config.max_retries || !is_retryable_error(&err) {
            return Err(err);
        }

        attempt += 1;
        let delay = backoff_delay(attempt, config);
        warn!(
            "{} failed ({}), retry {}/{} in {:?}",
            label, err, attempt, config.max_retries, delay
        );
        tokio::time::sleep(delay).await;
    }
}
