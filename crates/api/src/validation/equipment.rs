use machinatrack_domain::{EquipmentPatch, EquipmentStatus, NewEquipment};
use serde::Deserialize;
use validator::Validate;

use super::{parse_optional_date, validate_date, validate_not_blank};
use crate::error::ApiResult;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEquipmentRequest {
    #[validate(
        length(min = 1, max = 255, message = "设备名称长度必须在1-255之间"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,
    #[validate(length(max = 255))]
    pub manufacturer: Option<String>,
    #[validate(length(max = 255))]
    pub model: Option<String>,
    #[validate(length(max = 255))]
    pub serial_number: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub purchase_date: Option<String>,
    pub status: Option<EquipmentStatus>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

impl CreateEquipmentRequest {
    pub fn into_domain(self) -> ApiResult<NewEquipment> {
        Ok(NewEquipment {
            purchase_date: parse_optional_date(self.purchase_date.as_deref(), "purchase_date")?,
            name: self.name.trim().to_string(),
            manufacturer: self.manufacturer,
            model: self.model,
            serial_number: self.serial_number,
            location: self.location,
            status: self.status,
            notes: self.notes,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEquipmentRequest {
    #[validate(
        length(min = 1, max = 255, message = "设备名称长度必须在1-255之间"),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 255))]
    pub manufacturer: Option<String>,
    #[validate(length(max = 255))]
    pub model: Option<String>,
    #[validate(length(max = 255))]
    pub serial_number: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub purchase_date: Option<String>,
    pub status: Option<EquipmentStatus>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

impl UpdateEquipmentRequest {
    pub fn into_domain(self) -> ApiResult<EquipmentPatch> {
        Ok(EquipmentPatch {
            purchase_date: parse_optional_date(self.purchase_date.as_deref(), "purchase_date")?,
            name: self.name.map(|name| name.trim().to_string()),
            manufacturer: self.manufacturer,
            model: self.model,
            serial_number: self.serial_number,
            location: self.location,
            status: self.status,
            notes: self.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_name_is_rejected() {
        let request: CreateEquipmentRequest =
            serde_json::from_value(serde_json::json!({ "name": "   " })).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_converts_dates() {
        let request: CreateEquipmentRequest = serde_json::from_value(serde_json::json!({
            "name": " Mazak QTN-200 ",
            "purchase_date": "2019-06-01T00:00:00Z",
            "status": "repair"
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let draft = request.into_domain().unwrap();
        assert_eq!(draft.name, "Mazak QTN-200");
        assert_eq!(draft.purchase_date, chrono::NaiveDate::from_ymd_opt(2019, 6, 1));
        assert_eq!(draft.status, Some(EquipmentStatus::Repair));
    }

    #[test]
    fn test_empty_update_is_valid() {
        let request = UpdateEquipmentRequest::default();
        assert!(request.validate().is_ok());
        assert_eq!(request.into_domain().unwrap(), EquipmentPatch::default());
    }
}
