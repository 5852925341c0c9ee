//! # MachinaTrack 领域层
//!
//! 资产实体、仓储抽象以及少量带时间语义的业务规则：
//! 保养任务的周期性生成、到期分类、状态流转和角色权限矩阵。
//! 持久化、时钟均通过参数或构造函数注入，本层不持有跨调用的状态。

pub mod clock;
pub mod due;
pub mod entities;
pub mod lifecycle;
pub mod permissions;
pub mod recurrence;
pub mod repositories;
pub mod services;
pub mod sqlx_impls;

pub use clock::{Clock, FixedClock, SystemClock};
pub use due::{classify, classify_str, parse_date_lenient, DueState, DEFAULT_LEAD_DAYS};
pub use entities::*;
pub use lifecycle::{recommend_task_status, recommend_tool_status, validate_transition};
pub use machinatrack_errors::{TrackError, TrackResult};
pub use permissions::{Permission, Role};
pub use recurrence::{next_due_from, schedule_next_occurrence};
pub use repositories::*;
