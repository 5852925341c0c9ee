use async_trait::async_trait;
use machinatrack_domain::{
    MaintenanceTask, MaintenanceTaskFilter, MaintenanceTaskRepository, TaskUpdateOutcome,
};
use machinatrack_errors::{TrackError, TrackResult};
use sqlx::{Row, Sqlite, SqlitePool};
use tracing::{debug, instrument, warn};

use crate::database::mapping::MappingHelpers;
use crate::error_handling::RepositoryErrorHelpers;
use crate::repo_context;

const ENTITY: &str = "保养任务";

const INSERT_SQL: &str = r#"
    INSERT INTO maintenance_tasks (id, equipment_id, description, frequency_days,
                                   last_performed_date, next_due_date, assigned_to, status,
                                   parts_used, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub struct SqliteMaintenanceTaskRepository {
    pool: SqlitePool,
}

impl SqliteMaintenanceTaskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> TrackResult<MaintenanceTask> {
        Ok(MaintenanceTask {
            id: row.try_get("id")?,
            equipment_id: row.try_get("equipment_id")?,
            description: row.try_get("description")?,
            frequency_days: row.try_get("frequency_days")?,
            last_performed_date: row.try_get("last_performed_date")?,
            next_due_date: row.try_get("next_due_date")?,
            assigned_to: row.try_get("assigned_to")?,
            status: row.try_get("status")?,
            parts_used: MappingHelpers::parse_parts_used_sqlite(row, "parts_used")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn insert_query(
        task: &MaintenanceTask,
        parts_used: String,
    ) -> sqlx::query::Query<'_, Sqlite, sqlx::sqlite::SqliteArguments<'_>> {
        sqlx::query(INSERT_SQL)
            .bind(&task.id)
            .bind(&task.equipment_id)
            .bind(&task.description)
            .bind(task.frequency_days)
            .bind(task.last_performed_date)
            .bind(task.next_due_date)
            .bind(&task.assigned_to)
            .bind(task.status)
            .bind(parts_used)
            .bind(task.created_at)
            .bind(task.updated_at)
    }
}

#[async_trait]
impl MaintenanceTaskRepository for SqliteMaintenanceTaskRepository {
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn create(&self, task: &MaintenanceTask) -> TrackResult<MaintenanceTask> {
        let parts_used = MappingHelpers::encode_parts_used(&task.parts_used)?;
        Self::insert_query(task, parts_used)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Create, ENTITY, &task.id), e))?;
        Ok(task.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<MaintenanceTask>> {
        let row = sqlx::query("SELECT * FROM maintenance_tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Read, ENTITY, id), e))?;
        row.as_ref().map(Self::row_to_task).transpose()
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &MaintenanceTaskFilter) -> TrackResult<Vec<MaintenanceTask>> {
        let mut sql = String::from("SELECT * FROM maintenance_tasks WHERE 1 = 1");
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.equipment_id.is_some() {
            sql.push_str(" AND equipment_id = ?");
        }
        if filter.due_before.is_some() {
            sql.push_str(" AND next_due_date IS NOT NULL AND next_due_date <= ?");
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(equipment_id) = &filter.equipment_id {
            query = query.bind(equipment_id);
        }
        if let Some(due_before) = filter.due_before {
            query = query.bind(due_before);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Query, ENTITY), e))?;
        rows.iter().map(Self::row_to_task).collect()
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn update(&self, task: &MaintenanceTask) -> TrackResult<MaintenanceTask> {
        let parts_used = MappingHelpers::encode_parts_used(&task.parts_used)?;
        let result = sqlx::query(
            r#"
            UPDATE maintenance_tasks
            SET description = ?, frequency_days = ?, last_performed_date = ?, next_due_date = ?,
                assigned_to = ?, status = ?, parts_used = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.description)
        .bind(task.frequency_days)
        .bind(task.last_performed_date)
        .bind(task.next_due_date)
        .bind(&task.assigned_to)
        .bind(task.status)
        .bind(parts_used)
        .bind(task.updated_at)
        .bind(&task.id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Update, ENTITY, &task.id), e))?;

        if result.rows_affected() == 0 {
            return Err(TrackError::not_found(ENTITY, task.id.clone()));
        }
        Ok(task.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> TrackResult<bool> {
        let result = sqlx::query("DELETE FROM maintenance_tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Delete, ENTITY, id), e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn count_by_equipment(&self, equipment_id: &str) -> TrackResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_tasks WHERE equipment_id = ?")
                .bind(equipment_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Query, ENTITY), e))?;
        Ok(count)
    }

    #[instrument(skip(self, task, next_occurrence), fields(task_id = %task.id, spawn = next_occurrence.is_some()))]
    async fn apply_update(
        &self,
        current: &MaintenanceTask,
        task: &MaintenanceTask,
        next_occurrence: Option<&MaintenanceTask>,
    ) -> TrackResult<TaskUpdateOutcome> {
        let parts_used = MappingHelpers::encode_parts_used(&task.parts_used)?;
        let next_parts = next_occurrence
            .map(|next| MappingHelpers::encode_parts_used(&next.parts_used))
            .transpose()?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            RepositoryErrorHelpers::database_error(repo_context!(Transaction, ENTITY, &task.id), e)
        })?;

        let result = sqlx::query(
            r#"
            UPDATE maintenance_tasks
            SET description = ?, frequency_days = ?, last_performed_date = ?, next_due_date = ?,
                assigned_to = ?, status = ?, parts_used = ?, updated_at = ?
            WHERE id = ? AND status = ? AND updated_at = ?
            "#,
        )
        .bind(&task.description)
        .bind(task.frequency_days)
        .bind(task.last_performed_date)
        .bind(task.next_due_date)
        .bind(&task.assigned_to)
        .bind(task.status)
        .bind(parts_used)
        .bind(task.updated_at)
        .bind(&task.id)
        .bind(current.status)
        .bind(current.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Update, ENTITY, &task.id), e))?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return match self.find_by_id(&task.id).await? {
                Some(stored) => {
                    warn!(
                        expected = %current.status,
                        actual = %stored.status,
                        stored_updated_at = %stored.updated_at,
                        "保养任务已被并发修改"
                    );
                    Err(TrackError::conflict(format!(
                        "保养任务 {} 已被并发修改，当前状态 {}",
                        task.id, stored.status
                    )))
                }
                None => Err(TrackError::not_found(ENTITY, task.id.clone())),
            };
        }

        if let (Some(next), Some(next_parts)) = (next_occurrence, next_parts) {
            // 失败时 tx 被丢弃，状态更新一并回滚
            Self::insert_query(next, next_parts)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    warn!(next_task_id = %next.id, error = %e, "下一次保养任务写入失败，回滚");
                    TrackError::RecurrenceScheduling(e.to_string())
                })?;
        }

        tx.commit().await.map_err(|e| {
            RepositoryErrorHelpers::database_error(repo_context!(Transaction, ENTITY, &task.id), e)
        })?;
        debug!("保养任务更新已提交");

        Ok(TaskUpdateOutcome::new(
            current.status,
            task.clone(),
            next_occurrence.cloned(),
        ))
    }
}
