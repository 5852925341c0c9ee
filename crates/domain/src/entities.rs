use chrono::{DateTime, NaiveDate, Utc};
use machinatrack_errors::{TrackError, TrackResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// 设备
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: EquipmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    #[default]
    Operational,
    Maintenance,
    Repair,
    Retired,
}

impl EquipmentStatus {
    pub const ALL: [EquipmentStatus; 4] = [
        EquipmentStatus::Operational,
        EquipmentStatus::Maintenance,
        EquipmentStatus::Repair,
        EquipmentStatus::Retired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Operational => "operational",
            EquipmentStatus::Maintenance => "maintenance",
            EquipmentStatus::Repair => "repair",
            EquipmentStatus::Retired => "retired",
        }
    }
}

impl std::str::FromStr for EquipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operational" => Ok(EquipmentStatus::Operational),
            "maintenance" => Ok(EquipmentStatus::Maintenance),
            "repair" => Ok(EquipmentStatus::Repair),
            "retired" => Ok(EquipmentStatus::Retired),
            _ => Err(format!("Invalid equipment status: {s}")),
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewEquipment {
    pub name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: Option<EquipmentStatus>,
    pub notes: Option<String>,
}

/// 设备局部更新，`None` 表示保持原值
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EquipmentPatch {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub status: Option<EquipmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EquipmentFilter {
    pub status: Option<EquipmentStatus>,
    pub name_pattern: Option<String>,
}

impl Equipment {
    pub fn new(draft: NewEquipment, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: draft.name,
            manufacturer: draft.manufacturer,
            model: draft.model,
            serial_number: draft.serial_number,
            location: draft.location,
            purchase_date: draft.purchase_date,
            status: draft.status.unwrap_or_default(),
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_patch(&mut self, patch: EquipmentPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if patch.manufacturer.is_some() {
            self.manufacturer = patch.manufacturer;
        }
        if patch.model.is_some() {
            self.model = patch.model;
        }
        if patch.serial_number.is_some() {
            self.serial_number = patch.serial_number;
        }
        if patch.location.is_some() {
            self.location = patch.location;
        }
        if patch.purchase_date.is_some() {
            self.purchase_date = patch.purchase_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if patch.notes.is_some() {
            self.notes = patch.notes;
        }
        self.updated_at = now;
    }

    pub fn matches(&self, filter: &EquipmentFilter) -> bool {
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        if let Some(pattern) = &filter.name_pattern {
            if !self.name.to_lowercase().contains(&pattern.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// 耗材 / 刀具库存
// ---------------------------------------------------------------------------

/// 单个耗材的库存上限，出入库后的数量也不能超过它
pub const MAX_STOCK_QUANTITY: i32 = 1_000_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consumable {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub min_quantity: i32,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub part_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewConsumable {
    pub name: String,
    pub category: String,
    pub quantity: i32,
    pub min_quantity: i32,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub part_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConsumablePatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<i32>,
    pub min_quantity: Option<i32>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub part_number: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConsumableFilter {
    pub category: Option<String>,
    pub low_stock_only: bool,
}

impl Consumable {
    pub fn new(draft: NewConsumable, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: draft.name,
            category: draft.category,
            quantity: draft.quantity,
            min_quantity: draft.min_quantity,
            unit: draft.unit,
            location: draft.location,
            supplier: draft.supplier,
            part_number: draft.part_number,
            created_at: now,
            updated_at: now,
        }
    }

    /// 库存不高于最低库存即需补货
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }

    /// 出入库后的数量，必须落在 `0..=MAX_STOCK_QUANTITY`
    pub fn adjusted_quantity(&self, delta: i32) -> TrackResult<i32> {
        let quantity = i64::from(self.quantity) + i64::from(delta);
        if quantity < 0 {
            return Err(TrackError::validation_error(format!(
                "库存数量不能为负数: 当前 {}，调整 {delta}",
                self.quantity
            )));
        }
        if quantity > i64::from(MAX_STOCK_QUANTITY) {
            return Err(TrackError::validation_error(format!(
                "库存数量不能超过 {MAX_STOCK_QUANTITY}: 当前 {}，调整 {delta}",
                self.quantity
            )));
        }
        Ok(quantity as i32)
    }

    pub fn apply_patch(&mut self, patch: ConsumablePatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        if let Some(min_quantity) = patch.min_quantity {
            self.min_quantity = min_quantity;
        }
        if patch.unit.is_some() {
            self.unit = patch.unit;
        }
        if patch.location.is_some() {
            self.location = patch.location;
        }
        if patch.supplier.is_some() {
            self.supplier = patch.supplier;
        }
        if patch.part_number.is_some() {
            self.part_number = patch.part_number;
        }
        self.updated_at = now;
    }

    pub fn matches(&self, filter: &ConsumableFilter) -> bool {
        if let Some(category) = &filter.category {
            if &self.category != category {
                return false;
            }
        }
        !filter.low_stock_only || self.is_low_stock()
    }
}

// ---------------------------------------------------------------------------
// 保养任务
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceTask {
    pub id: String,
    pub equipment_id: String,
    pub description: String,
    /// 周期天数；为空或不大于0表示一次性任务
    pub frequency_days: Option<i32>,
    pub last_performed_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub status: MaintenanceStatus,
    pub parts_used: Vec<PartUsed>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Overdue,
    Skipped,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "pending",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Overdue => "overdue",
            MaintenanceStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MaintenanceStatus::Completed | MaintenanceStatus::Skipped)
    }
}

impl std::str::FromStr for MaintenanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MaintenanceStatus::Pending),
            "in_progress" => Ok(MaintenanceStatus::InProgress),
            "completed" => Ok(MaintenanceStatus::Completed),
            "overdue" => Ok(MaintenanceStatus::Overdue),
            "skipped" => Ok(MaintenanceStatus::Skipped),
            _ => Err(format!("Invalid maintenance status: {s}")),
        }
    }
}

impl std::fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartUsed {
    pub name: String,
    pub quantity: u32,
}

/// 新建保养任务草稿（由接口创建或由周期规则生成）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewMaintenanceTask {
    pub equipment_id: String,
    pub description: String,
    pub frequency_days: Option<i32>,
    pub last_performed_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub status: MaintenanceStatus,
    pub parts_used: Vec<PartUsed>,
}

/// 已校验的保养任务更新
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceTaskUpdate {
    pub description: Option<String>,
    pub frequency_days: Option<i32>,
    pub last_performed_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    pub status: Option<MaintenanceStatus>,
    pub parts_used: Option<Vec<PartUsed>>,
}

#[derive(Debug, Clone, Default)]
pub struct MaintenanceTaskFilter {
    pub status: Option<MaintenanceStatus>,
    pub equipment_id: Option<String>,
    /// 仅返回下次到期日不晚于该日期的任务
    pub due_before: Option<NaiveDate>,
}

impl MaintenanceTask {
    pub fn new(draft: NewMaintenanceTask, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            equipment_id: draft.equipment_id,
            description: draft.description,
            frequency_days: draft.frequency_days,
            last_performed_date: draft.last_performed_date,
            next_due_date: draft.next_due_date,
            assigned_to: draft.assigned_to,
            status: draft.status,
            parts_used: draft.parts_used,
            created_at: now,
            updated_at: now,
        }
    }

    /// 周期大于0时返回周期天数
    pub fn recurrence_interval(&self) -> Option<i32> {
        self.frequency_days.filter(|days| *days > 0)
    }

    /// 合并更新字段，不做状态合法性检查
    pub fn apply_update(&mut self, update: &MaintenanceTaskUpdate, now: DateTime<Utc>) {
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if update.frequency_days.is_some() {
            self.frequency_days = update.frequency_days;
        }
        if update.last_performed_date.is_some() {
            self.last_performed_date = update.last_performed_date;
        }
        if update.next_due_date.is_some() {
            self.next_due_date = update.next_due_date;
        }
        if update.assigned_to.is_some() {
            self.assigned_to = update.assigned_to.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(parts) = &update.parts_used {
            self.parts_used = parts.clone();
        }
        self.updated_at = now;
    }

    pub fn matches(&self, filter: &MaintenanceTaskFilter) -> bool {
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        if let Some(equipment_id) = &filter.equipment_id {
            if &self.equipment_id != equipment_id {
                return false;
            }
        }
        if let Some(due_before) = filter.due_before {
            match self.next_due_date {
                Some(due) if due <= due_before => {}
                _ => return false,
            }
        }
        true
    }
}

// ---------------------------------------------------------------------------
// 量具与校准
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetrologyTool {
    pub id: String,
    pub name: String,
    pub tool_type: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub calibration_interval_days: Option<i32>,
    pub last_calibration_date: Option<NaiveDate>,
    pub next_calibration_date: Option<NaiveDate>,
    pub status: ToolStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Calibrated,
    DueCalibration,
    OutOfService,
    AwaitingCalibration,
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Calibrated => "calibrated",
            ToolStatus::DueCalibration => "due_calibration",
            ToolStatus::OutOfService => "out_of_service",
            ToolStatus::AwaitingCalibration => "awaiting_calibration",
        }
    }
}

impl std::str::FromStr for ToolStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calibrated" => Ok(ToolStatus::Calibrated),
            "due_calibration" => Ok(ToolStatus::DueCalibration),
            "out_of_service" => Ok(ToolStatus::OutOfService),
            "awaiting_calibration" => Ok(ToolStatus::AwaitingCalibration),
            _ => Err(format!("Invalid tool status: {s}")),
        }
    }
}

impl std::fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewMetrologyTool {
    pub name: String,
    pub tool_type: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub calibration_interval_days: Option<i32>,
    pub last_calibration_date: Option<NaiveDate>,
    pub next_calibration_date: Option<NaiveDate>,
    pub status: Option<ToolStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetrologyToolPatch {
    pub name: Option<String>,
    pub tool_type: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub calibration_interval_days: Option<i32>,
    pub last_calibration_date: Option<NaiveDate>,
    pub next_calibration_date: Option<NaiveDate>,
    pub status: Option<ToolStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct MetrologyToolFilter {
    pub status: Option<ToolStatus>,
    pub due_before: Option<NaiveDate>,
}

impl MetrologyTool {
    /// 未指定状态时，有下次校准日期视为已校准，否则待校准
    pub fn new(draft: NewMetrologyTool, now: DateTime<Utc>) -> Self {
        let status = draft.status.unwrap_or(if draft.next_calibration_date.is_some() {
            ToolStatus::Calibrated
        } else {
            ToolStatus::AwaitingCalibration
        });
        Self {
            id: new_id(),
            name: draft.name,
            tool_type: draft.tool_type,
            serial_number: draft.serial_number,
            location: draft.location,
            calibration_interval_days: draft.calibration_interval_days,
            last_calibration_date: draft.last_calibration_date,
            next_calibration_date: draft.next_calibration_date,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_patch(&mut self, patch: MetrologyToolPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if patch.tool_type.is_some() {
            self.tool_type = patch.tool_type;
        }
        if patch.serial_number.is_some() {
            self.serial_number = patch.serial_number;
        }
        if patch.location.is_some() {
            self.location = patch.location;
        }
        if patch.calibration_interval_days.is_some() {
            self.calibration_interval_days = patch.calibration_interval_days;
        }
        if patch.last_calibration_date.is_some() {
            self.last_calibration_date = patch.last_calibration_date;
        }
        if patch.next_calibration_date.is_some() {
            self.next_calibration_date = patch.next_calibration_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = now;
    }

    pub fn matches(&self, filter: &MetrologyToolFilter) -> bool {
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        if let Some(due_before) = filter.due_before {
            match self.next_calibration_date {
                Some(due) if due <= due_before => {}
                _ => return false,
            }
        }
        true
    }
}

/// 校准记录，只追加不修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationLog {
    pub id: String,
    pub tool_id: String,
    pub calibration_date: NaiveDate,
    pub performed_by: String,
    pub result: CalibrationResult,
    pub notes: Option<String>,
    pub next_due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationResult {
    Pass,
    Fail,
    Adjusted,
}

impl CalibrationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationResult::Pass => "pass",
            CalibrationResult::Fail => "fail",
            CalibrationResult::Adjusted => "adjusted",
        }
    }

    pub fn is_usable(&self) -> bool {
        !matches!(self, CalibrationResult::Fail)
    }
}

impl std::str::FromStr for CalibrationResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(CalibrationResult::Pass),
            "fail" => Ok(CalibrationResult::Fail),
            "adjusted" => Ok(CalibrationResult::Adjusted),
            _ => Err(format!("Invalid calibration result: {s}")),
        }
    }
}

impl std::fmt::Display for CalibrationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCalibrationLog {
    pub calibration_date: NaiveDate,
    pub performed_by: String,
    pub result: CalibrationResult,
    pub notes: Option<String>,
    pub next_due_date: Option<NaiveDate>,
}

impl CalibrationLog {
    pub fn new(tool_id: &str, entry: NewCalibrationLog, now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            tool_id: tool_id.to_string(),
            calibration_date: entry.calibration_date,
            performed_by: entry.performed_by,
            result: entry.result,
            notes: entry.notes,
            next_due_date: entry.next_due_date,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn consumable(quantity: i32, min_quantity: i32) -> Consumable {
        Consumable::new(
            NewConsumable {
                name: "CNMG 120408 insert".to_string(),
                category: "inserts".to_string(),
                quantity,
                min_quantity,
                ..Default::default()
            },
            now(),
        )
    }

    #[test]
    fn test_low_stock_flag() {
        assert!(consumable(3, 5).is_low_stock());
        assert!(consumable(5, 5).is_low_stock());
        assert!(!consumable(6, 5).is_low_stock());
    }

    #[test]
    fn test_adjusted_quantity_bounds() {
        let stock = consumable(10, 5);
        assert_eq!(stock.adjusted_quantity(-10).unwrap(), 0);
        assert!(stock.adjusted_quantity(-11).is_err());

        let full = consumable(MAX_STOCK_QUANTITY - 10, 5);
        assert_eq!(full.adjusted_quantity(10).unwrap(), MAX_STOCK_QUANTITY);
        assert!(full.adjusted_quantity(11).is_err());
        assert!(consumable(i32::MAX - 10, 5).adjusted_quantity(100).is_err());
    }

    #[test]
    fn test_consumable_filter() {
        let low = consumable(1, 5);
        let ok = consumable(10, 5);
        let filter = ConsumableFilter {
            category: Some("inserts".to_string()),
            low_stock_only: true,
        };
        assert!(low.matches(&filter));
        assert!(!ok.matches(&filter));
        assert!(ok.matches(&ConsumableFilter::default()));
    }

    #[test]
    fn test_status_string_forms() {
        for status in [
            MaintenanceStatus::Pending,
            MaintenanceStatus::InProgress,
            MaintenanceStatus::Completed,
            MaintenanceStatus::Overdue,
            MaintenanceStatus::Skipped,
        ] {
            assert_eq!(status.as_str().parse::<MaintenanceStatus>().unwrap(), status);
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        assert!("done".parse::<MaintenanceStatus>().is_err());
        assert_eq!(ToolStatus::DueCalibration.to_string(), "due_calibration");
        assert_eq!(
            "awaiting_calibration".parse::<ToolStatus>().unwrap(),
            ToolStatus::AwaitingCalibration
        );
        assert_eq!("adjusted".parse::<CalibrationResult>().unwrap(), CalibrationResult::Adjusted);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(MaintenanceStatus::Completed.is_terminal());
        assert!(MaintenanceStatus::Skipped.is_terminal());
        assert!(!MaintenanceStatus::Overdue.is_terminal());
        assert!(!MaintenanceStatus::Pending.is_terminal());
    }

    #[test]
    fn test_maintenance_task_apply_update_keeps_unset_fields() {
        let mut task = MaintenanceTask::new(
            NewMaintenanceTask {
                equipment_id: "eq-1".to_string(),
                description: "Change spindle coolant".to_string(),
                frequency_days: Some(30),
                assigned_to: Some("lee".to_string()),
                ..Default::default()
            },
            now(),
        );
        let update = MaintenanceTaskUpdate {
            status: Some(MaintenanceStatus::InProgress),
            ..Default::default()
        };
        task.apply_update(&update, now());

        assert_eq!(task.status, MaintenanceStatus::InProgress);
        assert_eq!(task.frequency_days, Some(30));
        assert_eq!(task.assigned_to.as_deref(), Some("lee"));
    }

    #[test]
    fn test_maintenance_filter_due_before() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let task = MaintenanceTask::new(
            NewMaintenanceTask {
                equipment_id: "eq-1".to_string(),
                description: "Lube way oil".to_string(),
                next_due_date: Some(due),
                ..Default::default()
            },
            now(),
        );
        let before = MaintenanceTaskFilter {
            due_before: Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            ..Default::default()
        };
        let too_early = MaintenanceTaskFilter {
            due_before: Some(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()),
            ..Default::default()
        };
        assert!(task.matches(&before));
        assert!(!task.matches(&too_early));
    }

    #[test]
    fn test_recurrence_interval_ignores_non_positive() {
        let mut task = MaintenanceTask::new(NewMaintenanceTask::default(), now());
        assert_eq!(task.recurrence_interval(), None);
        task.frequency_days = Some(0);
        assert_eq!(task.recurrence_interval(), None);
        task.frequency_days = Some(-5);
        assert_eq!(task.recurrence_interval(), None);
        task.frequency_days = Some(14);
        assert_eq!(task.recurrence_interval(), Some(14));
    }

    #[test]
    fn test_new_tool_default_status() {
        let scheduled = MetrologyTool::new(
            NewMetrologyTool {
                name: "Micrometer 0-25".to_string(),
                next_calibration_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                ..Default::default()
            },
            now(),
        );
        let unscheduled = MetrologyTool::new(
            NewMetrologyTool {
                name: "Height gauge".to_string(),
                ..Default::default()
            },
            now(),
        );
        assert_eq!(scheduled.status, ToolStatus::Calibrated);
        assert_eq!(unscheduled.status, ToolStatus::AwaitingCalibration);
        assert_ne!(scheduled.id, unscheduled.id);
    }
}
