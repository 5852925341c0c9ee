use machinatrack_domain::{
    CalibrationResult, MetrologyToolPatch, NewCalibrationLog, NewMetrologyTool, ToolStatus,
};
use serde::Deserialize;
use validator::Validate;

use super::{parse_date, parse_optional_date, validate_date, validate_not_blank};
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMetrologyToolRequest {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 100))]
    pub tool_type: Option<String>,
    #[validate(length(max = 255))]
    pub serial_number: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(range(min = 0, max = 3650, message = "校准周期必须在0-3650天之间"))]
    pub calibration_interval_days: Option<i32>,
    #[validate(custom(function = "validate_date"))]
    pub last_calibration_date: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub next_calibration_date: Option<String>,
    pub status: Option<ToolStatus>,
}

impl CreateMetrologyToolRequest {
    pub fn into_domain(self) -> ApiResult<NewMetrologyTool> {
        Ok(NewMetrologyTool {
            last_calibration_date: parse_optional_date(
                self.last_calibration_date.as_deref(),
                "last_calibration_date",
            )?,
            next_calibration_date: parse_optional_date(
                self.next_calibration_date.as_deref(),
                "next_calibration_date",
            )?,
            name: self.name.trim().to_string(),
            tool_type: self.tool_type,
            serial_number: self.serial_number,
            location: self.location,
            calibration_interval_days: self.calibration_interval_days,
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMetrologyToolRequest {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 100))]
    pub tool_type: Option<String>,
    #[validate(length(max = 255))]
    pub serial_number: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(range(min = 0, max = 3650, message = "校准周期必须在0-3650天之间"))]
    pub calibration_interval_days: Option<i32>,
    #[validate(custom(function = "validate_date"))]
    pub last_calibration_date: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub next_calibration_date: Option<String>,
    pub status: Option<ToolStatus>,
}

impl UpdateMetrologyToolRequest {
    pub fn into_domain(self) -> ApiResult<MetrologyToolPatch> {
        Ok(MetrologyToolPatch {
            last_calibration_date: parse_optional_date(
                self.last_calibration_date.as_deref(),
                "last_calibration_date",
            )?,
            next_calibration_date: parse_optional_date(
                self.next_calibration_date.as_deref(),
                "next_calibration_date",
            )?,
            name: self.name.map(|name| name.trim().to_string()),
            tool_type: self.tool_type,
            serial_number: self.serial_number,
            location: self.location,
            calibration_interval_days: self.calibration_interval_days,
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordCalibrationRequest {
    #[validate(custom(function = "validate_date"))]
    pub calibration_date: String,
    /// 缺省时使用请求头中的操作者
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub performed_by: Option<String>,
    pub result: CalibrationResult,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub next_due_date: Option<String>,
}

impl RecordCalibrationRequest {
    pub fn into_domain(self, actor: Option<&str>) -> ApiResult<NewCalibrationLog> {
        let performed_by = self
            .performed_by
            .map(|name| name.trim().to_string())
            .or_else(|| actor.map(str::to_string))
            .ok_or_else(|| ApiError::BadRequest("performed_by 不能为空".to_string()))?;

        Ok(NewCalibrationLog {
            calibration_date: parse_date(&self.calibration_date, "calibration_date")?,
            next_due_date: parse_optional_date(self.next_due_date.as_deref(), "next_due_date")?,
            performed_by,
            result: self.result,
            notes: self.notes,
        })
    }
}
