//! Test data builders for creating test entities
//!
//! Builders start from plausible shop-floor defaults; override only what a
//! test cares about.

use chrono::{NaiveDate, Utc};
use machinatrack_domain::{
    Consumable, Equipment, EquipmentStatus, MaintenanceStatus, MaintenanceTask, MetrologyTool,
    NewConsumable, NewEquipment, NewMaintenanceTask, NewMetrologyTool, PartUsed, ToolStatus,
};

/// Builder for creating test Equipment entities
pub struct EquipmentBuilder {
    equipment: Equipment,
}

impl EquipmentBuilder {
    pub fn new() -> Self {
        Self {
            equipment: Equipment::new(
                NewEquipment {
                    name: "Haas VF-2".to_string(),
                    manufacturer: Some("Haas".to_string()),
                    model: Some("VF-2".to_string()),
                    location: Some("Bay 1".to_string()),
                    ..Default::default()
                },
                Utc::now(),
            ),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.equipment.id = id.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.equipment.name = name.to_string();
        self
    }

    pub fn with_status(mut self, status: EquipmentStatus) -> Self {
        self.equipment.status = status;
        self
    }

    pub fn build(self) -> Equipment {
        self.equipment
    }
}

impl Default for EquipmentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test Consumable entities
pub struct ConsumableBuilder {
    consumable: Consumable,
}

impl ConsumableBuilder {
    pub fn new() -> Self {
        Self {
            consumable: Consumable::new(
                NewConsumable {
                    name: "CNMG 120408 insert".to_string(),
                    category: "inserts".to_string(),
                    quantity: 20,
                    min_quantity: 5,
                    unit: Some("pcs".to_string()),
                    ..Default::default()
                },
                Utc::now(),
            ),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.consumable.id = id.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.consumable.name = name.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.consumable.category = category.to_string();
        self
    }

    pub fn with_stock(mut self, quantity: i32, min_quantity: i32) -> Self {
        self.consumable.quantity = quantity;
        self.consumable.min_quantity = min_quantity;
        self
    }

    pub fn build(self) -> Consumable {
        self.consumable
    }
}

impl Default for ConsumableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test MaintenanceTask entities
pub struct MaintenanceTaskBuilder {
    task: MaintenanceTask,
}

impl MaintenanceTaskBuilder {
    pub fn new() -> Self {
        Self {
            task: MaintenanceTask::new(
                NewMaintenanceTask {
                    equipment_id: "equipment-1".to_string(),
                    description: "Check way lube level".to_string(),
                    ..Default::default()
                },
                Utc::now(),
            ),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.task.id = id.to_string();
        self
    }

    pub fn for_equipment(mut self, equipment_id: &str) -> Self {
        self.task.equipment_id = equipment_id.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.task.description = description.to_string();
        self
    }

    pub fn with_frequency_days(mut self, days: i32) -> Self {
        self.task.frequency_days = Some(days);
        self
    }

    pub fn with_status(mut self, status: MaintenanceStatus) -> Self {
        self.task.status = status;
        self
    }

    pub fn with_next_due_date(mut self, date: NaiveDate) -> Self {
        self.task.next_due_date = Some(date);
        self
    }

    pub fn with_last_performed_date(mut self, date: NaiveDate) -> Self {
        self.task.last_performed_date = Some(date);
        self
    }

    pub fn assigned_to(mut self, who: &str) -> Self {
        self.task.assigned_to = Some(who.to_string());
        self
    }

    pub fn with_part(mut self, name: &str, quantity: u32) -> Self {
        self.task.parts_used.push(PartUsed {
            name: name.to_string(),
            quantity,
        });
        self
    }

    pub fn build(self) -> MaintenanceTask {
        self.task
    }
}

impl Default for MaintenanceTaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating test MetrologyTool entities
pub struct MetrologyToolBuilder {
    tool: MetrologyTool,
}

impl MetrologyToolBuilder {
    pub fn new() -> Self {
        Self {
            tool: MetrologyTool::new(
                NewMetrologyTool {
                    name: "Mitutoyo 0-25mm micrometer".to_string(),
                    tool_type: Some("micrometer".to_string()),
                    calibration_interval_days: Some(365),
                    status: Some(ToolStatus::Calibrated),
                    ..Default::default()
                },
                Utc::now(),
            ),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.tool.id = id.to_string();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.tool.name = name.to_string();
        self
    }

    pub fn with_interval_days(mut self, days: i32) -> Self {
        self.tool.calibration_interval_days = Some(days);
        self
    }

    pub fn without_interval(mut self) -> Self {
        self.tool.calibration_interval_days = None;
        self
    }

    pub fn with_next_calibration(mut self, date: NaiveDate) -> Self {
        self.tool.next_calibration_date = Some(date);
        self
    }

    pub fn with_status(mut self, status: ToolStatus) -> Self {
        self.tool.status = status;
        self
    }

    pub fn build(self) -> MetrologyTool {
        self.tool
    }
}

impl Default for MetrologyToolBuilder {
    fn default() -> Self {
        Self::new()
    }
}
