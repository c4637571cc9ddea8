//! # 数据库模块
//!
//! 数据库连接和迁移管理

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::{GatewayError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{ldebug, lerror, linfo, lwarn};

/// 初始化数据库连接
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let url = config.get_connection_url()?;
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "db_connecting",
        "正在连接数据库",
        url = %url.split('?').next().unwrap_or(&url)
    );

    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.max_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);

    // 内存库每个连接各自独立，只保留一个
    if config.is_memory_database() {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options)
        .await
        .map_err(|e| GatewayError::database_with_source("数据库连接失败", e))?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "db_connected",
        "数据库连接成功"
    );
    Ok(db)
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> std::result::Result<(), DbErr> {
    ldebug!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "migrations_start",
        "开始运行数据库迁移"
    );

    match ::migration::Migrator::up(db, None).await {
        Ok(()) => {
            linfo!(
                "system",
                LogStage::Startup,
                LogComponent::Database,
                "migrations_done",
                "数据库迁移完成"
            );
            Ok(())
        }
        Err(e) => {
            lerror!(
                "system",
                LogStage::Startup,
                LogComponent::Database,
                "migrations_failed",
                &format!("数据库迁移失败: {e}")
            );
            Err(e)
        }
    }
}

/// 检查是否有待应用的迁移
pub async fn check_database_status(db: &DatabaseConnection) -> std::result::Result<usize, DbErr> {
    let pending = ::migration::Migrator::get_pending_migrations(db).await?;
    if !pending.is_empty() {
        lwarn!(
            "system",
            LogStage::Startup,
            LogComponent::Database,
            "pending_migrations",
            &format!("有 {} 个待应用的迁移", pending.len())
        );
    }
    Ok(pending.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_database_migrates_cleanly() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        let db = init_database(&config).await.unwrap();
        tokio_test::assert_ok!(run_migrations(&db).await);
        assert_eq!(check_database_status(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_is_database_error() {
        let config = DatabaseConfig {
            url: "postgres://nowhere/none".to_string(),
            ..DatabaseConfig::default()
        };
        let Err(err) = init_database(&config).await else {
            panic!("非 SQLite 地址不应连接成功");
        };
        assert!(matches!(err, GatewayError::Database { .. }));
    }
}
