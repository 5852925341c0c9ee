//! 请求体校验
//!
//! 每类资源的请求 DTO 放在子模块中，用 `validator` 声明字段约束，
//! 校验通过后再转换为领域层的类型化输入。

pub mod equipment;
pub mod inventory;
pub mod maintenance;
pub mod metrology;

use std::borrow::Cow;

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use chrono::NaiveDate;
use machinatrack_domain::parse_date_lenient;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::{ApiError, ApiResult};

/// 反序列化并校验 JSON 请求体，两类失败都转换为统一的错误响应
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// 接受 `YYYY-MM-DD` 或 ISO-8601 时间戳
pub fn validate_date(raw: &str) -> Result<(), ValidationError> {
    if parse_date_lenient(raw).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_date")
            .with_message(Cow::Owned(format!("无法识别的日期: {raw}"))))
    }
}

pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message(Cow::Borrowed("不能为空")))
    } else {
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str, field: &str) -> ApiResult<NaiveDate> {
    parse_date_lenient(raw).ok_or_else(|| ApiError::BadRequest(format!("{field} 日期格式无效: {raw}")))
}

pub(crate) fn parse_optional_date(raw: Option<&str>, field: &str) -> ApiResult<Option<NaiveDate>> {
    raw.map(|value| parse_date(value, field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date_formats() {
        assert!(validate_date("2024-03-31").is_ok());
        assert!(validate_date("2024-03-31T08:00:00Z").is_ok());
        assert!(validate_date("31/03/2024").is_err());
        assert!(validate_date("").is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Haas VF-2").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date(None, "next_due_date").unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2024-01-01"), "next_due_date").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert!(parse_optional_date(Some("soon"), "next_due_date").is_err());
    }
}
