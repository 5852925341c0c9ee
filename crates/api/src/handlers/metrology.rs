use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use machinatrack_domain::{MetrologyToolFilter, Permission};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{parse_query_date, parse_query_enum};
use crate::{
    auth::Actor,
    error::ApiResult,
    response::{created, deleted, success},
    routes::AppState,
    validation::{
        metrology::{
            CreateMetrologyToolRequest, RecordCalibrationRequest, UpdateMetrologyToolRequest,
        },
        ValidatedJson,
    },
};

/// 量具查询参数
#[derive(Debug, Deserialize)]
pub struct ToolQueryParams {
    pub status: Option<String>,
    pub due_before: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CalibrationRecorded {
    pub tool: machinatrack_domain::MetrologyTool,
    pub log: machinatrack_domain::CalibrationLog,
}

/// 获取量具列表
pub async fn list_tools(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<ToolQueryParams>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MetrologyRead)?;
    let filter = MetrologyToolFilter {
        status: parse_query_enum(params.status.as_deref(), "status")?,
        due_before: parse_query_date(params.due_before.as_deref(), "due_before")?,
    };
    let tools = state.metrology_service.list_tools(&filter).await?;
    Ok(success(tools))
}

/// 登记量具
pub async fn create_tool(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateMetrologyToolRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MetrologyWrite)?;
    let tool = state
        .metrology_service
        .create_tool(request.into_domain()?)
        .await?;
    Ok(created(tool))
}

/// 获取单个量具
pub async fn get_tool(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MetrologyRead)?;
    let tool = state.metrology_service.get_tool(&id).await?;
    Ok(success(tool))
}

/// 更新量具
pub async fn update_tool(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateMetrologyToolRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MetrologyWrite)?;
    let tool = state
        .metrology_service
        .update_tool(&id, request.into_domain()?)
        .await?;
    Ok(success(tool))
}

/// 删除量具，已有校准记录时返回冲突
pub async fn delete_tool(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MetrologyDelete)?;
    state.metrology_service.delete_tool(&id).await?;
    Ok(deleted(format!("量具 {id} 已删除")))
}

/// 校准历史，最新的在前
pub async fn list_calibrations(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MetrologyRead)?;
    let logs = state.metrology_service.calibration_history(&id).await?;
    Ok(success(logs))
}

/// 记录一次校准并同步更新量具状态
pub async fn record_calibration(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<RecordCalibrationRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::CalibrationRecord)?;
    let entry = request.into_domain(actor.user.as_deref())?;
    let (tool, log) = state.metrology_service.record_calibration(&id, entry).await?;

    state.metrics.record_calibration(log.result.as_str());
    info!(user = actor.name(), tool_id = %id, result = %log.result, "校准记录已提交");
    Ok(created(CalibrationRecorded { tool, log }))
}

/// 量具校准到期概览
pub async fn list_due_tools(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::MetrologyRead)?;
    let entries = state.metrology_service.due_overview().await?;
    Ok(success(entries))
}
