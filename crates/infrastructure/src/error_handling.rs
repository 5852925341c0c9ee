//! Error handling for repository operations with rich context
//!
//! Converts `sqlx` errors into `TrackError` while keeping the entity and
//! operation that failed, and logs them once at the point of failure.

use machinatrack_errors::TrackError;
use sqlx::Error as SqlxError;
use std::fmt;
use tracing::error;

/// Operation context for repository operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryOperation {
    Create,
    Read,
    Update,
    Delete,
    Query,
    Transaction,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryOperation::Create => write!(f, "创建"),
            RepositoryOperation::Read => write!(f, "查询"),
            RepositoryOperation::Update => write!(f, "更新"),
            RepositoryOperation::Delete => write!(f, "删除"),
            RepositoryOperation::Query => write!(f, "列表查询"),
            RepositoryOperation::Transaction => write!(f, "事务提交"),
        }
    }
}

/// Context information for a repository operation
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub operation: RepositoryOperation,
    pub entity: &'static str,
    pub entity_id: Option<String>,
}

impl OperationContext {
    pub fn new(operation: RepositoryOperation, entity: &'static str) -> Self {
        Self {
            operation,
            entity,
            entity_id: None,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn entity_description(&self) -> String {
        match &self.entity_id {
            Some(id) => format!("{} (ID: {})", self.entity, id),
            None => self.entity.to_string(),
        }
    }
}

/// Shorthand for building an [`OperationContext`]
#[macro_export]
macro_rules! repo_context {
    ($op:ident, $entity:expr) => {
        $crate::error_handling::OperationContext::new(
            $crate::error_handling::RepositoryOperation::$op,
            $entity,
        )
    };
    ($op:ident, $entity:expr, $id:expr) => {
        $crate::error_handling::OperationContext::new(
            $crate::error_handling::RepositoryOperation::$op,
            $entity,
        )
        .with_id($id)
    };
}

pub struct RepositoryErrorHelpers;

impl RepositoryErrorHelpers {
    /// Map a sqlx error to `TrackError`, classifying constraint violations
    pub fn database_error(context: OperationContext, error: SqlxError) -> TrackError {
        let entity_desc = context.entity_description();
        let operation_desc = context.operation;

        let converted = match &error {
            SqlxError::Database(db_error) if db_error.is_unique_violation() => {
                TrackError::conflict(format!("{operation_desc}{entity_desc}时发生唯一约束冲突"))
            }
            SqlxError::Database(db_error) if db_error.is_foreign_key_violation() => {
                TrackError::validation_error(format!(
                    "{operation_desc}{entity_desc}时引用的记录不存在"
                ))
            }
            SqlxError::Database(db_error) => TrackError::database_error(format!(
                "{operation_desc}{entity_desc}时发生数据库错误: {db_error}"
            )),
            SqlxError::PoolClosed => {
                TrackError::database_error(format!("{operation_desc}{entity_desc}时数据库连接池已关闭"))
            }
            SqlxError::PoolTimedOut => {
                TrackError::database_error(format!("{operation_desc}{entity_desc}时数据库连接池超时"))
            }
            SqlxError::ColumnDecode { .. } | SqlxError::Decode(_) => TrackError::Serialization(
                format!("{operation_desc}{entity_desc}时数据解码失败: {error}"),
            ),
            _ => TrackError::database_error(format!(
                "{operation_desc}{entity_desc}时发生未知数据库错误: {error}"
            )),
        };

        error!(
            operation = %context.operation,
            entity = context.entity,
            entity_id = ?context.entity_id,
            error = %error,
            "{}",
            converted
        );
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_description() {
        let ctx = repo_context!(Update, "设备", "eq-1");
        assert_eq!(ctx.entity_description(), "设备 (ID: eq-1)");
        assert_eq!(repo_context!(Query, "耗材").entity_description(), "耗材");
    }

    #[test]
    fn test_pool_errors_are_database_errors() {
        let err = RepositoryErrorHelpers::database_error(
            repo_context!(Read, "量具", "t-1"),
            SqlxError::PoolTimedOut,
        );
        assert!(matches!(err, TrackError::DatabaseOperation(_)));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("量具 (ID: t-1)"));
    }
}
