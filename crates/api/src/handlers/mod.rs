pub mod consumables;
pub mod dashboard;
pub mod equipment;
pub mod health;
pub mod maintenance;
pub mod metrics;
pub mod metrology;
pub mod status;

use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{ApiError, ApiResult};
use crate::validation::parse_date;

/// 解析查询参数中的枚举值，空字符串视为未指定
pub(crate) fn parse_query_enum<T>(raw: Option<&str>, field: &str) -> ApiResult<Option<T>>
where
    T: FromStr<Err = String>,
{
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|e| ApiError::BadRequest(format!("{field}: {e}"))),
        None => Ok(None),
    }
}

pub(crate) fn parse_query_date(raw: Option<&str>, field: &str) -> ApiResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date(value, field).map(Some),
        None => Ok(None),
    }
}
