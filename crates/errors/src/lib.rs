use thiserror::Error;


/// 资产追踪系统统一错误类型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackError {
    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),
    #[error("{entity}未找到: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("数据验证失败: {0}")]
    ValidationError(String),
    #[error("无效的状态转换: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
    #[error("下一次保养任务生成失败: {0}")]
    RecurrenceScheduling(String),
    #[error("资源冲突: {0}")]
    Conflict(String),
    #[error("权限不足: {0}")]
    Permission(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type TrackResult<T> = Result<T, TrackError>;

impl TrackError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn not_found<S: Into<String>>(entity: &'static str, id: S) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::ValidationError(msg.into())
    }
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackError::NotFound { .. })
    }
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrackError::DatabaseOperation(_)
                | TrackError::RecurrenceScheduling(_)
                | TrackError::Conflict(_)
        )
    }
    pub fn user_message(&self) -> &str {
        match self {
            TrackError::NotFound { .. } => "请求的资源不存在",
            TrackError::ValidationError(_) => "输入数据验证失败",
            TrackError::InvalidTransition { .. } => "当前状态不允许此操作",
            TrackError::Conflict(_) => "资源状态已变更，请刷新后重试",
            TrackError::Permission(_) => "您没有执行此操作的权限",
            TrackError::RecurrenceScheduling(_) => "保养计划生成失败，本次更新未生效",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<sqlx::Error> for TrackError {
    fn from(err: sqlx::Error) -> Self {
        TrackError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        TrackError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for TrackError {
    fn from(err: anyhow::Error) -> Self {
        TrackError::Internal(err.to_string())
    }
}
