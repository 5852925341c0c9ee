use async_trait::async_trait;
use machinatrack_domain::{Equipment, EquipmentFilter, EquipmentRepository};
use machinatrack_errors::TrackResult;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use crate::error_handling::RepositoryErrorHelpers;
use crate::repo_context;

const ENTITY: &str = "设备";

pub struct SqliteEquipmentRepository {
    pool: SqlitePool,
}

impl SqliteEquipmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_equipment(row: &sqlx::sqlite::SqliteRow) -> TrackResult<Equipment> {
        Ok(Equipment {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            manufacturer: row.try_get("manufacturer")?,
            model: row.try_get("model")?,
            serial_number: row.try_get("serial_number")?,
            location: row.try_get("location")?,
            purchase_date: row.try_get("purchase_date")?,
            status: row.try_get("status")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl EquipmentRepository for SqliteEquipmentRepository {
    #[instrument(skip(self, equipment), fields(equipment_id = %equipment.id))]
    async fn create(&self, equipment: &Equipment) -> TrackResult<Equipment> {
        sqlx::query(
            r#"
            INSERT INTO equipment (id, name, manufacturer, model, serial_number, location,
                                   purchase_date, status, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&equipment.id)
        .bind(&equipment.name)
        .bind(&equipment.manufacturer)
        .bind(&equipment.model)
        .bind(&equipment.serial_number)
        .bind(&equipment.location)
        .bind(equipment.purchase_date)
        .bind(equipment.status)
        .bind(&equipment.notes)
        .bind(equipment.created_at)
        .bind(equipment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RepositoryErrorHelpers::database_error(repo_context!(Create, ENTITY, &equipment.id), e)
        })?;

        debug!("设备已写入数据库");
        Ok(equipment.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<Equipment>> {
        let row = sqlx::query("SELECT * FROM equipment WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Read, ENTITY, id), e))?;
        row.as_ref().map(Self::row_to_equipment).transpose()
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &EquipmentFilter) -> TrackResult<Vec<Equipment>> {
        let mut sql = String::from("SELECT * FROM equipment WHERE 1 = 1");
        if filter.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if filter.name_pattern.is_some() {
            sql.push_str(" AND name LIKE ?");
        }
        sql.push_str(" ORDER BY name ASC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(pattern) = &filter.name_pattern {
            query = query.bind(format!("%{pattern}%"));
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Query, ENTITY), e))?;
        rows.iter().map(Self::row_to_equipment).collect()
    }

    #[instrument(skip(self, equipment), fields(equipment_id = %equipment.id))]
    async fn update(&self, equipment: &Equipment) -> TrackResult<Equipment> {
        let result = sqlx::query(
            r#"
            UPDATE equipment
            SET name = ?, manufacturer = ?, model = ?, serial_number = ?, location = ?,
                purchase_date = ?, status = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&equipment.name)
        .bind(&equipment.manufacturer)
        .bind(&equipment.model)
        .bind(&equipment.serial_number)
        .bind(&equipment.location)
        .bind(equipment.purchase_date)
        .bind(equipment.status)
        .bind(&equipment.notes)
        .bind(equipment.updated_at)
        .bind(&equipment.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RepositoryErrorHelpers::database_error(repo_context!(Update, ENTITY, &equipment.id), e)
        })?;

        if result.rows_affected() == 0 {
            return Err(machinatrack_errors::TrackError::not_found(ENTITY, equipment.id.clone()));
        }
        Ok(equipment.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> TrackResult<bool> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Delete, ENTITY, id), e))?;
        Ok(result.rows_affected() > 0)
    }
}
