pub mod manager;
pub mod mapping;
pub mod migrations;
pub mod sqlite;

pub use manager::DatabaseManager;
pub use migrations::run_migrations;
pub use sqlite::{
    SqliteCalibrationLogRepository, SqliteConsumableRepository, SqliteEquipmentRepository,
    SqliteMaintenanceTaskRepository, SqliteMetrologyToolRepository,
};
