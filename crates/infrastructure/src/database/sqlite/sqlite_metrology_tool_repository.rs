use async_trait::async_trait;
use chrono::{DateTime, Utc};
use machinatrack_domain::{
    CalibrationLog, MetrologyTool, MetrologyToolFilter, MetrologyToolRepository, ToolStatus,
};
use machinatrack_errors::{TrackError, TrackResult};
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument, warn};

use crate::database::sqlite::sqlite_calibration_log_repository::SqliteCalibrationLogRepository;
use crate::error_handling::RepositoryErrorHelpers;
use crate::repo_context;

const ENTITY: &str = "量具";

pub struct SqliteMetrologyToolRepository {
    pool: SqlitePool,
}

impl SqliteMetrologyToolRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_tool(row: &sqlx::sqlite::SqliteRow) -> TrackResult<MetrologyTool> {
        Ok(MetrologyTool {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            tool_type: row.try_get("tool_type")?,
            serial_number: row.try_get("serial_number")?,
            location: row.try_get("location")?,
            calibration_interval_days: row.try_get("calibration_interval_days")?,
            last_calibration_date: row.try_get("last_calibration_date")?,
            next_calibration_date: row.try_get("next_calibration_date")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn write_update<'e, E>(executor: E, tool: &MetrologyTool) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE metrology_tools
            SET name = ?, tool_type = ?, serial_number = ?, location = ?,
                calibration_interval_days = ?, last_calibration_date = ?,
                next_calibration_date = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&tool.name)
        .bind(&tool.tool_type)
        .bind(&tool.serial_number)
        .bind(&tool.location)
        .bind(tool.calibration_interval_days)
        .bind(tool.last_calibration_date)
        .bind(tool.next_calibration_date)
        .bind(tool.status)
        .bind(tool.updated_at)
        .bind(&tool.id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl MetrologyToolRepository for SqliteMetrologyToolRepository {
    #[instrument(skip(self, tool), fields(tool_id = %tool.id))]
    async fn create(&self, tool: &MetrologyTool) -> TrackResult<MetrologyTool> {
        sqlx::query(
            r#"
            INSERT INTO metrology_tools (id, name, tool_type, serial_number, location,
                                         calibration_interval_days, last_calibration_date,
                                         next_calibration_date, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tool.id)
        .bind(&tool.name)
        .bind(&tool.tool_type)
        .bind(&tool.serial_number)
        .bind(&tool.location)
        .bind(tool.calibration_interval_days)
        .bind(tool.last_calibration_date)
        .bind(tool.next_calibration_date)
        .bind(tool.status)
        .bind(tool.created_at)
        .bind(tool.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Create, ENTITY, &tool.id), e))?;
        Ok(tool.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<MetrologyTool>> {
        let row = sqlx::query("SELECT * FROM metrology_tools WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Read, ENTITY, id), e))?;
        row.as_ref().map(Self::row_to_tool).transpose()
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &MetrologyToolFilter) -> TrackResult<Vec<MetrologyTool>> {
        let mut sql = String::from("SELECT * FROM metrology_tools WHERE 1 = 1");
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.due_before.is_some() {
            sql.push_str(" AND next_calibration_date IS NOT NULL AND next_calibration_date <= ?");
        }
        sql.push_str(" ORDER BY name ASC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(due_before) = filter.due_before {
            query = query.bind(due_before);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Query, ENTITY), e))?;
        rows.iter().map(Self::row_to_tool).collect()
    }

    #[instrument(skip(self, tool), fields(tool_id = %tool.id))]
    async fn update(&self, tool: &MetrologyTool) -> TrackResult<MetrologyTool> {
        let affected = Self::write_update(&self.pool, tool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Update, ENTITY, &tool.id), e))?;
        if affected == 0 {
            return Err(TrackError::not_found(ENTITY, tool.id.clone()));
        }
        Ok(tool.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> TrackResult<bool> {
        let result = sqlx::query("DELETE FROM metrology_tools WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Delete, ENTITY, id), e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, current), fields(tool_id = %current.id))]
    async fn update_status(
        &self,
        current: &MetrologyTool,
        status: ToolStatus,
        updated_at: DateTime<Utc>,
    ) -> TrackResult<MetrologyTool> {
        let result = sqlx::query(
            r#"
            UPDATE metrology_tools SET status = ?, updated_at = ?
            WHERE id = ? AND status = ?
              AND last_calibration_date IS ? AND next_calibration_date IS ?
            "#,
        )
        .bind(status)
        .bind(updated_at)
        .bind(&current.id)
        .bind(current.status)
        .bind(current.last_calibration_date)
        .bind(current.next_calibration_date)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Update, ENTITY, &current.id), e))?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(&current.id).await? {
                Some(stored) => {
                    warn!(expected = %current.status, actual = %stored.status, "量具已被并发修改");
                    Err(TrackError::conflict(format!(
                        "量具 {} 已被并发修改，当前状态 {}",
                        current.id, stored.status
                    )))
                }
                None => Err(TrackError::not_found(ENTITY, current.id.clone())),
            };
        }

        let mut saved = current.clone();
        saved.status = status;
        saved.updated_at = updated_at;
        Ok(saved)
    }

    #[instrument(skip(self, tool, log), fields(tool_id = %tool.id, log_id = %log.id))]
    async fn record_calibration(
        &self,
        tool: &MetrologyTool,
        log: &CalibrationLog,
    ) -> TrackResult<(MetrologyTool, CalibrationLog)> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryErrorHelpers::database_error(repo_context!(Transaction, ENTITY, &tool.id), e)
        })?;

        let affected = Self::write_update(&mut *tx, tool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Update, ENTITY, &tool.id), e))?;
        if affected == 0 {
            tx.rollback().await?;
            return Err(TrackError::not_found(ENTITY, tool.id.clone()));
        }

        SqliteCalibrationLogRepository::insert(&mut *tx, log)
            .await
            .map_err(|e| {
                RepositoryErrorHelpers::database_error(repo_context!(Create, "校准记录", &log.id), e)
            })?;

        tx.commit().await.map_err(|e| {
            RepositoryErrorHelpers::database_error(repo_context!(Transaction, ENTITY, &tool.id), e)
        })?;
        debug!("校准记录与量具状态已提交");
        Ok((tool.clone(), log.clone()))
    }
}
