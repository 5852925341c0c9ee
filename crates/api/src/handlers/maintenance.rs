use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use machinatrack_domain::{MaintenanceTaskFilter, Permission};
use serde::Deserialize;
use tracing::info;

use super::{parse_query_date, parse_query_enum};
use crate::{
    auth::Actor,
    error::ApiResult,
    response::{created, deleted, success},
    routes::AppState,
    validation::{
        maintenance::{CreateMaintenanceTaskRequest, UpdateMaintenanceTaskRequest},
        ValidatedJson,
    },
};

/// 保养任务查询参数
#[derive(Debug, Deserialize)]
pub struct TaskQueryParams {
    pub status: Option<String>,
    pub equipment_id: Option<String>,
    pub due_before: Option<String>,
}

impl TaskQueryParams {
    fn into_filter(self) -> ApiResult<MaintenanceTaskFilter> {
        Ok(MaintenanceTaskFilter {
            status: parse_query_enum(self.status.as_deref(), "status")?,
            equipment_id: self.equipment_id.filter(|id| !id.trim().is_empty()),
            due_before: parse_query_date(self.due_before.as_deref(), "due_before")?,
        })
    }
}

/// 获取保养任务列表
pub async fn list_tasks(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<TaskQueryParams>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MaintenanceRead)?;
    let filter = params.into_filter()?;
    let tasks = state.maintenance_service.list(&filter).await?;
    Ok(success(tasks))
}

/// 创建保养任务
pub async fn create_task(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateMaintenanceTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MaintenanceWrite)?;
    let task = state
        .maintenance_service
        .create(request.into_domain()?)
        .await?;
    info!(user = actor.name(), task_id = %task.id, equipment_id = %task.equipment_id, "保养任务已创建");
    Ok(created(task))
}

/// 获取单个保养任务
pub async fn get_task(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MaintenanceRead)?;
    let task = state.maintenance_service.get(&id).await?;
    Ok(success(task))
}

/// 更新保养任务
///
/// 首次标记为完成且设置了保养周期时，响应中的 `next_task` 为新生成的待办任务。
pub async fn update_task(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateMaintenanceTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MaintenanceWrite)?;
    let outcome = state
        .maintenance_service
        .update(&id, request.into_domain()?)
        .await?;

    if outcome.completed_now() {
        state
            .metrics
            .record_task_completed(outcome.next_task.is_some());
        info!(user = actor.name(), task_id = %id, "保养任务已完成");
    }
    Ok(success(outcome))
}

/// 删除保养任务
pub async fn delete_task(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MaintenanceDelete)?;
    state.maintenance_service.delete(&id).await?;
    Ok(deleted(format!("保养任务 {id} 已删除")))
}

/// 未结束保养任务的到期概览
pub async fn list_due_tasks(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MaintenanceRead)?;
    let entries = state.maintenance_service.due_overview().await?;
    Ok(success(entries))
}
