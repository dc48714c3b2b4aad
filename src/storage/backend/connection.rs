use std::str::FromStr;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, SqlxSqliteConnector};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{LinkvaultError, Result};
use migration::{Migrator, MigratorTrait};

/// 支持的关系型后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Mysql,
    Postgres,
}

/// 从连接串推断后端类型
pub fn infer_backend_from_url(database_url: &str) -> Result<Backend> {
    let url = database_url.trim();
    if url.starts_with("sqlite:")
        || url.ends_with(".db")
        || url.ends_with(".sqlite")
        || url == ":memory:"
    {
        Ok(Backend::Sqlite)
    } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
        Ok(Backend::Mysql)
    } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok(Backend::Postgres)
    } else {
        Err(LinkvaultError::database_config(format!(
            "无法识别的数据库连接串: {} (支持 sqlite://, mysql://, mariadb://, postgres://)",
            database_url
        )))
    }
}

/// 把裸文件路径和 mariadb:// 改写成驱动认识的形式
pub fn normalize_url(database_url: &str, backend: Backend) -> String {
    let url = database_url.trim();
    match backend {
        Backend::Sqlite if url == ":memory:" => "sqlite::memory:".to_string(),
        Backend::Sqlite if !url.starts_with("sqlite:") => format!("sqlite://{}", url),
        Backend::Mysql if url.starts_with("mariadb://") => {
            format!("mysql://{}", &url["mariadb://".len()..])
        }
        _ => url.to_string(),
    }
}

/// SQLite：不存在时自动建库，开启 WAL
pub async fn connect_sqlite(database_url: &str, config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let opt = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| LinkvaultError::database_config(format!("SQLite 连接串无效: {}", e)))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.pool_size.max(1))
        .acquire_timeout(Duration::from_secs(config.timeout))
        .connect_with(opt)
        .await
        .map_err(|e| {
            LinkvaultError::database_connection(format!("无法连接 SQLite 数据库: {}", e))
        })?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// MySQL / PostgreSQL
pub async fn connect_generic(
    database_url: &str,
    backend: Backend,
    config: &DatabaseConfig,
) -> Result<DatabaseConnection> {
    let timeout = Duration::from_secs(config.timeout);
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(config.pool_size)
        .min_connections(config.pool_size.min(2))
        .connect_timeout(timeout)
        .acquire_timeout(timeout)
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(false);

    Database::connect(opt).await.map_err(|e| {
        LinkvaultError::database_connection(format!("无法连接 {} 数据库: {}", backend, e))
    })
}

/// 应用未执行的迁移（幂等）
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    Migrator::up(db, None)
        .await
        .map_err(|e| LinkvaultError::database_operation(format!("数据库迁移失败: {}", e)))?;

    info!("Database migrations applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend() {
        assert_eq!(infer_backend_from_url("sqlite://data.db").unwrap(), Backend::Sqlite);
        assert_eq!(infer_backend_from_url("links.db").unwrap(), Backend::Sqlite);
        assert_eq!(infer_backend_from_url(":memory:").unwrap(), Backend::Sqlite);
        assert_eq!(
            infer_backend_from_url("mariadb://u:p@localhost/links").unwrap(),
            Backend::Mysql
        );
        assert_eq!(
            infer_backend_from_url("postgresql://localhost/links").unwrap(),
            Backend::Postgres
        );
    }

    #[test]
    fn test_infer_backend_rejects_unknown_scheme() {
        let err = infer_backend_from_url("redis://localhost").unwrap_err();
        assert!(matches!(err, LinkvaultError::DatabaseConfig(_)));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("links.db", Backend::Sqlite), "sqlite://links.db");
        assert_eq!(normalize_url(":memory:", Backend::Sqlite), "sqlite::memory:");
        assert_eq!(
            normalize_url("sqlite://x.db?mode=rwc", Backend::Sqlite),
            "sqlite://x.db?mode=rwc"
        );
        assert_eq!(
            normalize_url("mariadb://u@h/db", Backend::Mysql),
            "mysql://u@h/db"
        );
    }
}
