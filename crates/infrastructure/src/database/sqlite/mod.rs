pub mod sqlite_calibration_log_repository;
pub mod sqlite_consumable_repository;
pub mod sqlite_equipment_repository;
pub mod sqlite_maintenance_task_repository;
pub mod sqlite_metrology_tool_repository;

pub use sqlite_calibration_log_repository::SqliteCalibrationLogRepository;
pub use sqlite_consumable_repository::SqliteConsumableRepository;
pub use sqlite_equipment_repository::SqliteEquipmentRepository;
pub use sqlite_maintenance_task_repository::SqliteMaintenanceTaskRepository;
pub use sqlite_metrology_tool_repository::SqliteMetrologyToolRepository;
