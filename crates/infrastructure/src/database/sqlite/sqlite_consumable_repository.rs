use async_trait::async_trait;
use chrono::{DateTime, Utc};
use machinatrack_domain::{
    Consumable, ConsumableFilter, ConsumableRepository, MAX_STOCK_QUANTITY,
};
use machinatrack_errors::{TrackError, TrackResult};
use sqlx::{Row, SqlitePool};
use tracing::instrument;

use crate::error_handling::RepositoryErrorHelpers;
use crate::repo_context;

const ENTITY: &str = "耗材";

pub struct SqliteConsumableRepository {
    pool: SqlitePool,
}

impl SqliteConsumableRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_consumable(row: &sqlx::sqlite::SqliteRow) -> TrackResult<Consumable> {
        Ok(Consumable {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            quantity: row.try_get("quantity")?,
            min_quantity: row.try_get("min_quantity")?,
            unit: row.try_get("unit")?,
            location: row.try_get("location")?,
            supplier: row.try_get("supplier")?,
            part_number: row.try_get("part_number")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[async_trait]
impl ConsumableRepository for SqliteConsumableRepository {
    #[instrument(skip(self, consumable), fields(consumable_id = %consumable.id))]
    async fn create(&self, consumable: &Consumable) -> TrackResult<Consumable> {
        sqlx::query(
            r#"
            INSERT INTO consumables (id, name, category, quantity, min_quantity, unit, location,
                                     supplier, part_number, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&consumable.id)
        .bind(&consumable.name)
        .bind(&consumable.category)
        .bind(consumable.quantity)
        .bind(consumable.min_quantity)
        .bind(&consumable.unit)
        .bind(&consumable.location)
        .bind(&consumable.supplier)
        .bind(&consumable.part_number)
        .bind(consumable.created_at)
        .bind(consumable.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RepositoryErrorHelpers::database_error(repo_context!(Create, ENTITY, &consumable.id), e)
        })?;
        Ok(consumable.clone())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> TrackResult<Option<Consumable>> {
        let row = sqlx::query("SELECT * FROM consumables WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Read, ENTITY, id), e))?;
        row.as_ref().map(Self::row_to_consumable).transpose()
    }

    #[instrument(skip(self, filter))]
    async fn list(&self, filter: &ConsumableFilter) -> TrackResult<Vec<Consumable>> {
        let mut sql = String::from("SELECT * FROM consumables WHERE 1 = 1");
        if filter.category.is_some() {
            sql.push_str(" AND category = ?");
        }
        if filter.low_stock_only {
            sql.push_str(" AND quantity <= min_quantity");
        }
        sql.push_str(" ORDER BY name ASC");

        let mut query = sqlx::query(&sql);
        if let Some(category) = &filter.category {
            query = query.bind(category);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Query, ENTITY), e))?;
        rows.iter().map(Self::row_to_consumable).collect()
    }

    #[instrument(skip(self, consumable), fields(consumable_id = %consumable.id))]
    async fn update(&self, consumable: &Consumable) -> TrackResult<Consumable> {
        let result = sqlx::query(
            r#"
            UPDATE consumables
            SET name = ?, category = ?, quantity = ?, min_quantity = ?, unit = ?, location = ?,
                supplier = ?, part_number = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&consumable.name)
        .bind(&consumable.category)
        .bind(consumable.quantity)
        .bind(consumable.min_quantity)
        .bind(&consumable.unit)
        .bind(&consumable.location)
        .bind(&consumable.supplier)
        .bind(&consumable.part_number)
        .bind(consumable.updated_at)
        .bind(&consumable.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            RepositoryErrorHelpers::database_error(repo_context!(Update, ENTITY, &consumable.id), e)
        })?;

        if result.rows_affected() == 0 {
            return Err(TrackError::not_found(ENTITY, consumable.id.clone()));
        }
        Ok(consumable.clone())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> TrackResult<bool> {
        let result = sqlx::query("DELETE FROM consumables WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Delete, ENTITY, id), e))?;
        Ok(result.rows_affected() > 0)
    }

    /// 单条 UPDATE 完成增减，由条件保证结果落在 `0..=MAX_STOCK_QUANTITY`
    #[instrument(skip(self, updated_at))]
    async fn adjust_quantity(
        &self,
        id: &str,
        delta: i32,
        updated_at: DateTime<Utc>,
    ) -> TrackResult<Consumable> {
        let result = sqlx::query(
            r#"
            UPDATE consumables
            SET quantity = quantity + ?, updated_at = ?
            WHERE id = ? AND quantity + ? BETWEEN 0 AND ?
            "#,
        )
        .bind(delta)
        .bind(updated_at)
        .bind(id)
        .bind(delta)
        .bind(MAX_STOCK_QUANTITY)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryErrorHelpers::database_error(repo_context!(Update, ENTITY, id), e))?;

        if result.rows_affected() == 0 {
            let current = self
                .find_by_id(id)
                .await?
                .ok_or_else(|| TrackError::not_found(ENTITY, id))?;
            // 条件未命中只可能是越界，由实体给出具体原因
            current.adjusted_quantity(delta)?;
            return Err(TrackError::conflict(format!("耗材 {id} 的库存已被并发修改")));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| TrackError::not_found(ENTITY, id))
    }
}
