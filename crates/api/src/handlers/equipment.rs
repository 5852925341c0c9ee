use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use machinatrack_domain::{EquipmentFilter, Permission};
use serde::Deserialize;
use tracing::info;

use super::parse_query_enum;
use crate::{
    auth::Actor,
    error::ApiResult,
    response::{created, deleted, success},
    routes::AppState,
    validation::{
        equipment::{CreateEquipmentRequest, UpdateEquipmentRequest},
        ValidatedJson,
    },
};

/// 设备查询参数
#[derive(Debug, Deserialize)]
pub struct EquipmentQueryParams {
    pub status: Option<String>,
    pub name: Option<String>,
}

impl EquipmentQueryParams {
    fn into_filter(self) -> ApiResult<EquipmentFilter> {
        Ok(EquipmentFilter {
            status: parse_query_enum(self.status.as_deref(), "status")?,
            name_pattern: self.name.filter(|name| !name.trim().is_empty()),
        })
    }
}

/// 获取设备列表
pub async fn list_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<EquipmentQueryParams>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::EquipmentRead)?;
    let filter = params.into_filter()?;
    let equipment = state.equipment_service.list(&filter).await?;
    Ok(success(equipment))
}

/// 登记设备
pub async fn create_equipment(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateEquipmentRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::EquipmentWrite)?;
    let equipment = state
        .equipment_service
        .create(request.into_domain()?)
        .await?;
    info!(user = actor.name(), equipment_id = %equipment.id, "设备已登记");
    Ok(created(equipment))
}

/// 获取单个设备
pub async fn get_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::EquipmentRead)?;
    let equipment = state.equipment_service.get(&id).await?;
    Ok(success(equipment))
}

/// 更新设备
pub async fn update_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateEquipmentRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::EquipmentWrite)?;
    let equipment = state
        .equipment_service
        .update(&id, request.into_domain()?)
        .await?;
    Ok(success(equipment))
}

/// 删除设备，仍有关联保养任务时返回冲突
pub async fn delete_equipment(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::EquipmentDelete)?;
    state.equipment_service.delete(&id).await?;
    info!(user = actor.name(), equipment_id = %id, "设备已删除");
    Ok(deleted(format!("设备 {id} 已删除")))
}

/// 设备的保养记录
pub async fn get_equipment_maintenance(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require_all(&[Permission::EquipmentRead, Permission::MaintenanceRead])?;
    let history = state.equipment_service.maintenance_history(&id).await?;
    Ok(success(history))
}
