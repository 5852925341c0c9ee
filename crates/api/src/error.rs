use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use machinatrack_errors::TrackError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("业务错误: {0}")]
    Track(#[from] TrackError),

    #[error("验证错误: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("认证错误: {0}")]
    Authentication(#[from] crate::auth::AuthError),

}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type, suggestions) = match &self {
            ApiError::Track(TrackError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                format!("{entity} {id} 不存在"),
                "NOT_FOUND".to_string(),
                vec![
                    "请检查资源ID是否正确".to_string(),
                    "使用对应的列表接口查看所有可用资源".to_string(),
                ],
            ),
            ApiError::Track(TrackError::ValidationError(msg)) => (
                StatusCode::BAD_REQUEST,
                format!("数据验证失败: {msg}"),
                "VALIDATION_ERROR".to_string(),
                vec!["请检查请求参数是否符合要求".to_string()],
            ),
            ApiError::Track(TrackError::InvalidTransition { from, to }) => (
                StatusCode::CONFLICT,
                format!("保养任务不能从 {from} 转换为 {to}"),
                "INVALID_TRANSITION".to_string(),
                vec![
                    "已完成或已跳过的任务不能再修改状态".to_string(),
                    "如需重新执行，请新建保养任务".to_string(),
                ],
            ),
            ApiError::Track(TrackError::Conflict(msg)) => (
                StatusCode::CONFLICT,
                format!("资源冲突: {msg}"),
                "CONFLICT".to_string(),
                vec![
                    "请求的操作与当前资源状态冲突".to_string(),
                    "请刷新资源状态后重试".to_string(),
                ],
            ),
            ApiError::Track(TrackError::Permission(msg)) => (
                StatusCode::FORBIDDEN,
                format!("权限不足: {msg}"),
                "FORBIDDEN".to_string(),
                vec!["请联系管理员获取相应权限".to_string()],
            ),
            ApiError::Track(TrackError::RecurrenceScheduling(msg)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("下一次保养任务生成失败，本次状态更新已回滚: {msg}"),
                "RECURRENCE_SCHEDULING_ERROR".to_string(),
                vec![
                    "任务状态未发生变化，可以直接重试".to_string(),
                    "查看 GET /health 检查数据库状态".to_string(),
                ],
            ),
            ApiError::Track(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                err.user_message().to_string(),
                "INTERNAL_ERROR".to_string(),
                vec![
                    "系统遇到内部错误，请稍后重试".to_string(),
                    "如果问题持续存在，请联系系统管理员".to_string(),
                    "查看 GET /health 检查系统状态".to_string(),
                ],
            ),
            ApiError::Validation(errors) => {
                let mut error_details: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .map(|(field, errors)| {
                        let messages: Vec<String> = errors
                            .iter()
                            .map(|e| {
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            })
                            .collect();
                        format!("{}: {}", field, messages.join(", "))
                    })
                    .collect();
                error_details.sort();

                (
                    StatusCode::BAD_REQUEST,
                    format!("请求参数验证失败: {}", error_details.join("; ")),
                    "VALIDATION_ERROR".to_string(),
                    vec!["请检查请求参数是否符合要求".to_string()],
                )
            }
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {msg}"),
                "BAD_REQUEST".to_string(),
                vec![
                    "请检查请求格式和参数".to_string(),
                    "确保Content-Type正确设置".to_string(),
                ],
            ),
            ApiError::Authentication(auth_error) => (
                StatusCode::UNAUTHORIZED,
                auth_error.to_string(),
                "AUTHENTICATION_ERROR".to_string(),
                vec![
                    "请在请求头中携带角色信息".to_string(),
                    "可用角色: admin, manager, operator, viewer".to_string(),
                ],
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "请求处理失败");
        }

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_error_conversion() {
        let api_error: ApiError = TrackError::not_found("设备", "mill-1").into();
        match api_error {
            ApiError::Track(TrackError::NotFound { entity, id }) => {
                assert_eq!(entity, "设备");
                assert_eq!(id, "mill-1");
            }
            _ => panic!("Expected TrackError::NotFound"),
        }
    }

    #[test]
    fn test_status_mapping() {
        let cases = vec![
            (ApiError::from(TrackError::not_found("设备", "x")), StatusCode::NOT_FOUND),
            (
                ApiError::from(TrackError::validation_error("bad")),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(TrackError::invalid_transition("completed", "pending")),
                StatusCode::CONFLICT,
            ),
            (ApiError::from(TrackError::conflict("stale")), StatusCode::CONFLICT),
            (
                ApiError::from(TrackError::Permission("no".to_string())),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::from(TrackError::database_error("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(crate::auth::AuthError::MissingRole),
                StatusCode::UNAUTHORIZED,
            ),
            (ApiError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_api_error_from_validation_errors() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("name", validator::ValidationError::new("length"));

        let api_error: ApiError = errors.into();
        assert!(matches!(api_error, ApiError::Validation(_)));
        assert_eq!(api_error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::BadRequest("缺少字段".to_string()).to_string(),
            "请求参数错误: 缺少字段"
        );
        assert_eq!(
            ApiError::from(crate::auth::AuthError::MissingRole).to_string(),
            "认证错误: 缺少角色请求头"
        );
    }
}
