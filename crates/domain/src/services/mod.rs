//! # 应用服务
//!
//! 每个服务对应一类资产的业务用例，组合仓储、时钟与周期/分类规则。
//!
//! - 服务本身不保存可变状态，所有状态都在仓储中
//! - 依赖（仓储、时钟、预警天数）通过构造函数注入
//! - 需要原子性的多步写入交给仓储的事务方法完成
//!
//! ```rust,ignore
//! let maintenance = MaintenanceService::new(task_repo, equipment_repo, Arc::new(SystemClock), 7);
//! let outcome = maintenance.update(&task_id, update).await?;
//! if let Some(next) = outcome.next_task {
//!     println!("下一次保养: {:?}", next.next_due_date);
//! }
//! ```

mod dashboard;
mod equipment;
mod inventory;
mod maintenance;
mod metrology;
mod status;

pub use dashboard::{DashboardService, DashboardSummary};
pub use equipment::EquipmentService;
pub use inventory::InventoryService;
pub use maintenance::{MaintenanceService, TaskDueEntry};
pub use metrology::{MetrologyService, ToolDueEntry};
pub use status::{StatusChange, StatusRefreshReport, StatusService};
