//! Shared database mapping utilities
//!
//! `parts_used` is stored as a JSON array in a TEXT column.

use machinatrack_domain::PartUsed;
use machinatrack_errors::{TrackError, TrackResult};
use sqlx::Row;

pub struct MappingHelpers;

impl MappingHelpers {
    pub fn parse_parts_used_sqlite(
        row: &sqlx::sqlite::SqliteRow,
        field_name: &str,
    ) -> TrackResult<Vec<PartUsed>> {
        match row.try_get::<Option<String>, _>(field_name)? {
            Some(json_str) if !json_str.trim().is_empty() => serde_json::from_str(&json_str)
                .map_err(|e| TrackError::Serialization(format!("解析使用配件失败: {e}"))),
            _ => Ok(Vec::new()),
        }
    }

    pub fn encode_parts_used(parts: &[PartUsed]) -> TrackResult<String> {
        Ok(serde_json::to_string(parts)?)
    }
}
