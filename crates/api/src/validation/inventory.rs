use machinatrack_domain::{ConsumablePatch, NewConsumable};
use serde::Deserialize;
use validator::Validate;

use super::validate_not_blank;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateConsumableRequest {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub category: String,
    #[validate(range(min = 0, max = 1_000_000_000, message = "库存数量需在 0 到 1000000000 之间"))]
    pub quantity: i32,
    #[validate(range(min = 0, max = 1_000_000_000, message = "最低库存需在 0 到 1000000000 之间"))]
    #[serde(default)]
    pub min_quantity: i32,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    #[validate(length(max = 100))]
    pub part_number: Option<String>,
}

impl From<CreateConsumableRequest> for NewConsumable {
    fn from(request: CreateConsumableRequest) -> Self {
        NewConsumable {
            name: request.name.trim().to_string(),
            category: request.category.trim().to_string(),
            quantity: request.quantity,
            min_quantity: request.min_quantity,
            unit: request.unit,
            location: request.location,
            supplier: request.supplier,
            part_number: request.part_number,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateConsumableRequest {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub category: Option<String>,
    #[validate(range(min = 0, max = 1_000_000_000, message = "库存数量需在 0 到 1000000000 之间"))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0, max = 1_000_000_000, message = "最低库存需在 0 到 1000000000 之间"))]
    pub min_quantity: Option<i32>,
    #[validate(length(max = 50))]
    pub unit: Option<String>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    #[validate(length(max = 100))]
    pub part_number: Option<String>,
}

impl From<UpdateConsumableRequest> for ConsumablePatch {
    fn from(request: UpdateConsumableRequest) -> Self {
        ConsumablePatch {
            name: request.name.map(|name| name.trim().to_string()),
            category: request.category.map(|category| category.trim().to_string()),
            quantity: request.quantity,
            min_quantity: request.min_quantity,
            unit: request.unit,
            location: request.location,
            supplier: request.supplier,
            part_number: request.part_number,
        }
    }
}

/// 领用为负数，入库为正数
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdjustQuantityRequest {
    #[validate(range(min = -100000, max = 100000))]
    pub delta: i32,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}
