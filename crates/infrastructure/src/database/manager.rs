use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use machinatrack_config::DatabaseConfig;
use machinatrack_domain::{
    CalibrationLogRepository, ConsumableRepository, EquipmentRepository, MaintenanceTaskRepository,
    MetrologyToolRepository,
};
use machinatrack_errors::TrackResult;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::migrations::run_migrations;
use super::sqlite::{
    SqliteCalibrationLogRepository, SqliteConsumableRepository, SqliteEquipmentRepository,
    SqliteMaintenanceTaskRepository, SqliteMetrologyToolRepository,
};

/// 数据库管理器：持有连接池并充当仓储工厂
#[derive(Clone)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

impl DatabaseManager {
    /// 按配置建立连接池，启用外键约束；文件数据库使用 WAL 模式
    pub async fn new(config: &DatabaseConfig) -> TrackResult<Self> {
        debug!(url = %config.url, "Connecting to SQLite database");

        let in_memory = is_in_memory(&config.url);
        let mut connect_options = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .foreign_keys(true);
        if !in_memory {
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        }

        // 内存数据库每个连接都是独立的库，只能保留单个常驻连接
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .min_connections(config.min_connections)
                .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
                .max_lifetime(Duration::from_secs(1800))
        };

        let pool = pool_options
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .connect_with(connect_options)
            .await?;

        info!("Database connection pool ready");
        Ok(Self { pool })
    }

    /// 内存数据库，已完成迁移
    pub async fn in_memory() -> TrackResult<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        let manager = Self::new(&config).await?;
        manager.migrate().await?;
        Ok(manager)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> TrackResult<()> {
        run_migrations(&self.pool).await
    }

    pub async fn health_check(&self) -> TrackResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub fn equipment_repository(&self) -> Arc<dyn EquipmentRepository> {
        Arc::new(SqliteEquipmentRepository::new(self.pool.clone()))
    }

    pub fn consumable_repository(&self) -> Arc<dyn ConsumableRepository> {
        Arc::new(SqliteConsumableRepository::new(self.pool.clone()))
    }

    pub fn maintenance_task_repository(&self) -> Arc<dyn MaintenanceTaskRepository> {
        Arc::new(SqliteMaintenanceTaskRepository::new(self.pool.clone()))
    }

    pub fn metrology_tool_repository(&self) -> Arc<dyn MetrologyToolRepository> {
        Arc::new(SqliteMetrologyToolRepository::new(self.pool.clone()))
    }

    pub fn calibration_log_repository(&self) -> Arc<dyn CalibrationLogRepository> {
        Arc::new(SqliteCalibrationLogRepository::new(self.pool.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:shop?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://machinatrack.db"));
    }

    #[tokio::test]
    async fn test_in_memory_manager() {
        let db_manager = DatabaseManager::in_memory().await.unwrap();
        assert!(db_manager.health_check().await.is_ok());

        let _equipment = db_manager.equipment_repository();
        let _tasks = db_manager.maintenance_task_repository();

        // 迁移可重复执行
        db_manager.migrate().await.unwrap();
        db_manager.close().await;
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            ..Default::default()
        };

        let db_manager = DatabaseManager::new(&config).await.unwrap();
        db_manager.migrate().await.unwrap();
        assert!(path.exists());
        db_manager.close().await;
    }
}
