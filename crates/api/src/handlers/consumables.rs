use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use machinatrack_domain::{ConsumableFilter, Permission};
use serde::Deserialize;
use tracing::info;

use crate::{
    auth::Actor,
    error::ApiResult,
    response::{created, deleted, success, ApiResponse},
    routes::AppState,
    validation::{
        inventory::{AdjustQuantityRequest, CreateConsumableRequest, UpdateConsumableRequest},
        ValidatedJson,
    },
};

/// 耗材查询参数
#[derive(Debug, Deserialize)]
pub struct ConsumableQueryParams {
    pub category: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
}

/// 获取耗材列表
pub async fn list_consumables(
    State(state): State<AppState>,
    actor: Actor,
    Query(params): Query<ConsumableQueryParams>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::InventoryRead)?;
    let filter = ConsumableFilter {
        category: params.category.filter(|c| !c.trim().is_empty()),
        low_stock_only: params.low_stock,
    };
    let consumables = state.inventory_service.list(&filter).await?;
    Ok(success(consumables))
}

/// 新增耗材
pub async fn create_consumable(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateConsumableRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::InventoryWrite)?;
    let consumable = state.inventory_service.create(request.into()).await?;
    Ok(created(consumable))
}

/// 获取单个耗材
pub async fn get_consumable(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::InventoryRead)?;
    let consumable = state.inventory_service.get(&id).await?;
    Ok(success(consumable))
}

/// 更新耗材
pub async fn update_consumable(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateConsumableRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::InventoryWrite)?;
    let consumable = state.inventory_service.update(&id, request.into()).await?;
    Ok(success(consumable))
}

/// 删除耗材
pub async fn delete_consumable(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::InventoryDelete)?;
    state.inventory_service.delete(&id).await?;
    Ok(deleted(format!("耗材 {id} 已删除")))
}

/// 领用或入库
pub async fn adjust_consumable(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AdjustQuantityRequest>,
) -> ApiResult<impl IntoResponse> {
    actor.require(Permission::InventoryWrite)?;
    let consumable = state
        .inventory_service
        .adjust_quantity(&id, request.delta)
        .await?;
    info!(
        user = actor.name(),
        consumable_id = %id,
        delta = request.delta,
        reason = request.reason.as_deref().unwrap_or(""),
        "库存调整"
    );

    let message = if consumable.is_low_stock() {
        format!("{} 库存不足，请及时补货", consumable.name)
    } else {
        "库存已调整".to_string()
    };
    Ok(ApiResponse::success_with_message(consumable, message))
}
