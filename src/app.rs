use std::sync::Arc;

use anyhow::{Context, Result};
use machinatrack_api::{create_app, AppState};
use machinatrack_config::AppConfig;
use machinatrack_domain::SystemClock;
use machinatrack_infrastructure::{init_metrics, DatabaseManager};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{info, warn};

/// 主应用程序
pub struct Application {
    config: AppConfig,
    database: DatabaseManager,
    prometheus: Option<PrometheusHandle>,
}

impl Application {
    /// 建立数据库连接并完成迁移，按配置安装指标记录器
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序");

        // 记录器必须先于 MetricsCollector 创建，否则计数器句柄为空操作
        let prometheus = if config.observability.metrics_enabled {
            Some(init_metrics()?)
        } else {
            None
        };

        let database = connect_and_migrate(&config).await?;

        Ok(Self {
            config,
            database,
            prometheus,
        })
    }

    /// 运行API服务器，直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let bind_address = self.config.api.bind_address.clone();
        info!("启动API服务器: {bind_address}");

        let state = AppState::new(
            self.database.clone(),
            self.config.clone(),
            Arc::new(SystemClock),
            self.prometheus.clone(),
        );
        let app = create_app(state);

        let listener = TcpListener::bind(&bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;

        info!("API服务器启动在 http://{bind_address}");

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                if shutdown_rx.recv().await.is_err() {
                    warn!("关闭信号通道已关闭");
                }
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        self.database.close().await;
        info!("API服务器已停止");
        Ok(())
    }
}

/// 建立连接池并创建表结构
pub async fn connect_and_migrate(config: &AppConfig) -> Result<DatabaseManager> {
    let database = DatabaseManager::new(&config.database)
        .await
        .with_context(|| format!("连接数据库失败: {}", config.database.url))?;
    database.migrate().await.context("数据库迁移失败")?;
    Ok(database)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shutdown::ShutdownManager;
    use std::time::Duration;

    fn file_config(dir: &tempfile::TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = format!("sqlite://{}", dir.path().join("shop.db").display());
        config.api.bind_address = "127.0.0.1:0".to_string();
        config.observability.metrics_enabled = false;
        config
    }

    #[tokio::test]
    async fn test_connect_and_migrate_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);

        let database = connect_and_migrate(&config).await.unwrap();
        database.health_check().await.unwrap();
        assert!(dir.path().join("shop.db").exists());

        // 重复迁移是幂等的
        database.migrate().await.unwrap();
        database.close().await;
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_signal() {
        let dir = tempfile::tempdir().unwrap();
        let app = Application::new(file_config(&dir)).await.unwrap();
        assert!(app.prometheus.is_none());

        let shutdown = ShutdownManager::new();
        let rx = shutdown.subscribe().await;
        let handle = tokio::spawn(async move { app.run(rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.shutdown().await;

        let result = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("server did not stop in time")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_fails_on_invalid_bind_address() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = file_config(&dir);
        config.api.bind_address = "256.0.0.1:80".to_string();
        let app = Application {
            database: connect_and_migrate(&config).await.unwrap(),
            config,
            prometheus: None,
        };

        let shutdown = ShutdownManager::new();
        let err = app.run(shutdown.subscribe().await).await.unwrap_err();
        assert!(err.to_string().contains("绑定地址失败"));
    }
}
