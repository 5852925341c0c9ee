use machinatrack_domain::{MaintenanceStatus, MaintenanceTaskUpdate, NewMaintenanceTask, PartUsed};
use serde::Deserialize;
use validator::Validate;

use super::{parse_optional_date, validate_date, validate_not_blank};
use crate::error::ApiResult;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PartUsedRequest {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(range(min = 1, message = "备件数量必须大于0"))]
    pub quantity: u32,
}

impl From<PartUsedRequest> for PartUsed {
    fn from(part: PartUsedRequest) -> Self {
        PartUsed {
            name: part.name.trim().to_string(),
            quantity: part.quantity,
        }
    }
}

fn into_parts(parts: Option<Vec<PartUsedRequest>>) -> Option<Vec<PartUsed>> {
    parts.map(|parts| parts.into_iter().map(PartUsed::from).collect())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateMaintenanceTaskRequest {
    #[validate(length(min = 1, max = 64), custom(function = "validate_not_blank"))]
    pub equipment_id: String,
    #[validate(
        length(min = 1, max = 2000, message = "保养内容长度必须在1-2000之间"),
        custom(function = "validate_not_blank")
    )]
    pub description: String,
    #[validate(range(min = 0, max = 3650, message = "保养周期必须在0-3650天之间"))]
    pub frequency_days: Option<i32>,
    #[validate(custom(function = "validate_date"))]
    pub last_performed_date: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub next_due_date: Option<String>,
    #[validate(length(max = 255))]
    pub assigned_to: Option<String>,
    pub status: Option<MaintenanceStatus>,
    #[validate(nested)]
    pub parts_used: Option<Vec<PartUsedRequest>>,
}

impl CreateMaintenanceTaskRequest {
    pub fn into_domain(self) -> ApiResult<NewMaintenanceTask> {
        Ok(NewMaintenanceTask {
            last_performed_date: parse_optional_date(
                self.last_performed_date.as_deref(),
                "last_performed_date",
            )?,
            next_due_date: parse_optional_date(self.next_due_date.as_deref(), "next_due_date")?,
            equipment_id: self.equipment_id.trim().to_string(),
            description: self.description.trim().to_string(),
            frequency_days: self.frequency_days,
            assigned_to: self.assigned_to,
            status: self.status.unwrap_or_default(),
            parts_used: into_parts(self.parts_used).unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateMaintenanceTaskRequest {
    #[validate(
        length(min = 1, max = 2000, message = "保养内容长度必须在1-2000之间"),
        custom(function = "validate_not_blank")
    )]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 3650, message = "保养周期必须在0-3650天之间"))]
    pub frequency_days: Option<i32>,
    #[validate(custom(function = "validate_date"))]
    pub last_performed_date: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub next_due_date: Option<String>,
    #[validate(length(max = 255))]
    pub assigned_to: Option<String>,
    pub status: Option<MaintenanceStatus>,
    #[validate(nested)]
    pub parts_used: Option<Vec<PartUsedRequest>>,
}

impl UpdateMaintenanceTaskRequest {
    pub fn into_domain(self) -> ApiResult<MaintenanceTaskUpdate> {
        Ok(MaintenanceTaskUpdate {
            last_performed_date: parse_optional_date(
                self.last_performed_date.as_deref(),
                "last_performed_date",
            )?,
            next_due_date: parse_optional_date(self.next_due_date.as_deref(), "next_due_date")?,
            description: self.description.map(|d| d.trim().to_string()),
            frequency_days: self.frequency_days,
            assigned_to: self.assigned_to,
            status: self.status,
            parts_used: into_parts(self.parts_used),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_completion_payload_converts() {
        let request: UpdateMaintenanceTaskRequest = serde_json::from_value(serde_json::json!({
            "status": "completed",
            "last_performed_date": "2024-01-01T09:30:00Z",
            "parts_used": [{ "name": "Way wiper", "quantity": 2 }]
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let update = request.into_domain().unwrap();
        assert_eq!(update.status, Some(MaintenanceStatus::Completed));
        assert_eq!(update.last_performed_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(update.parts_used.unwrap()[0].quantity, 2);
    }

    #[test]
    fn test_zero_part_quantity_is_rejected() {
        let request: UpdateMaintenanceTaskRequest = serde_json::from_value(serde_json::json!({
            "parts_used": [{ "name": "Way wiper", "quantity": 0 }]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_negative_frequency_is_rejected() {
        let request: CreateMaintenanceTaskRequest = serde_json::from_value(serde_json::json!({
            "equipment_id": "mill-1",
            "description": "Grease ball screws",
            "frequency_days": -30
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_status_fails_to_deserialize() {
        let result = serde_json::from_value::<UpdateMaintenanceTaskRequest>(serde_json::json!({
            "status": "done"
        }));
        assert!(result.is_err());
    }
}
