use async_trait::async_trait;
use machinatrack_domain::{CalibrationLog, CalibrationLogRepository};
use machinatrack_errors::TrackResult;
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::error_handling::RepositoryErrorHelpers;
use crate::repo_context;

const ENTITY: &str = "校准记录";

/// 校准记录只追加，没有更新与删除
pub struct SqliteCalibrationLogRepository {
    pool: SqlitePool,
}

impl SqliteCalibrationLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) async fn insert<'e, E>(executor: E, log: &CalibrationLog) -> Result<(), sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO calibration_logs (id, tool_id, calibration_date, performed_by, result,
                                          notes, next_due_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.tool_id)
        .bind(log.calibration_date)
        .bind(&log.performed_by)
        .bind(log.result)
        .bind(&log.notes)
        .bind(log.next_due_date)
        .bind(log.created_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    fn row_to_log(row: &sqlx::sqlite::SqliteRow) -> TrackResult<CalibrationLog> {
        Ok(CalibrationLog {
            id: row.try_get("id")?,
            tool_id: row.try_get("tool_id")?,
            calibration_date: row.try_get("calibration_date")?,
            performed_by: row.try_get("performed_by")?,
            result: row.try_get("result")?,
            notes: row.try_get("notes")?,
            next_due_date: row.try_get("next_due_date")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl CalibrationLogRepository for SqliteCalibrationLogRepository {
    #[instrument(skip(self, log), fields(log_id = %log.id, tool_id = %log.tool_id))]
    async fn create(&self, log: &CalibrationLog) -> TrackResult<CalibrationLog> {
        Self::insert(&self.pool, log)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Create, ENTITY, &log.id), e))?;
        Ok(log.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<CalibrationLog>> {
        let row = sqlx::query("SELECT * FROM calibration_logs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Read, ENTITY, id), e))?;
        row.as_ref().map(Self::row_to_log).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_tool(&self, tool_id: &str) -> TrackResult<Vec<CalibrationLog>> {
        let rows = sqlx::query(
            "SELECT * FROM calibration_logs WHERE tool_id = ? ORDER BY calibration_date DESC, created_at DESC",
        )
        .bind(tool_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Query, ENTITY), e))?;
        rows.iter().map(Self::row_to_log).collect()
    }
}
