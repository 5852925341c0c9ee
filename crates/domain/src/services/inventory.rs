use std::sync::Arc;

use machinatrack_errors::{TrackError, TrackResult};
use tracing::{info, instrument, warn};

use crate::clock::Clock;
use crate::entities::{
    Consumable, ConsumableFilter, ConsumablePatch, NewConsumable, MAX_STOCK_QUANTITY,
};
use crate::repositories::ConsumableRepository;

pub struct InventoryService {
    consumables: Arc<dyn ConsumableRepository>,
    clock: Arc<dyn Clock>,
}

fn check_quantities(quantity: i32, min_quantity: i32) -> TrackResult<()> {
    if quantity < 0 {
        return Err(TrackError::validation_error("库存数量不能为负数"));
    }
    if min_quantity < 0 {
        return Err(TrackError::validation_error("最低库存不能为负数"));
    }
    if quantity > MAX_STOCK_QUANTITY || min_quantity > MAX_STOCK_QUANTITY {
        return Err(TrackError::validation_error(format!(
            "库存数量不能超过 {MAX_STOCK_QUANTITY}"
        )));
    }
    Ok(())
}

impl InventoryService {
    pub fn new(consumables: Arc<dyn ConsumableRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { consumables, clock }
    }

    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create(&self, draft: NewConsumable) -> TrackResult<Consumable> {
        if draft.name.trim().is_empty() {
            return Err(TrackError::validation_error("耗材名称不能为空"));
        }
        check_quantities(draft.quantity, draft.min_quantity)?;
        let consumable = Consumable::new(draft, self.clock.now());
        self.consumables.create(&consumable).await
    }

    pub async fn get(&self, id: &str) -> TrackResult<Consumable> {
        self.consumables
            .find_by_id(id)
            .await?
            .ok_or_else(|| TrackError::not_found("耗材", id))
    }

    pub async fn list(&self, filter: &ConsumableFilter) -> TrackResult<Vec<Consumable>> {
        self.consumables.list(filter).await
    }

    pub async fn low_stock(&self) -> TrackResult<Vec<Consumable>> {
        let filter = ConsumableFilter {
            low_stock_only: true,
            ..Default::default()
        };
        self.consumables.list(&filter).await
    }

    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: &str, patch: ConsumablePatch) -> TrackResult<Consumable> {
        let mut consumable = self.get(id).await?;
        consumable.apply_patch(patch, self.clock.now());
        check_quantities(consumable.quantity, consumable.min_quantity)?;
        self.consumables.update(&consumable).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> TrackResult<()> {
        if !self.consumables.delete(id).await? {
            return Err(TrackError::not_found("耗材", id));
        }
        Ok(())
    }

    /// 出入库：正数入库，负数领用
    #[instrument(skip(self))]
    pub async fn adjust_quantity(&self, id: &str, delta: i32) -> TrackResult<Consumable> {
        let consumable = self
            .consumables
            .adjust_quantity(id, delta, self.clock.now())
            .await?;
        if consumable.is_low_stock() {
            warn!(
                consumable_id = %consumable.id,
                quantity = consumable.quantity,
                min_quantity = consumable.min_quantity,
                "库存低于最低库存，需要补货"
            );
        } else {
            info!(consumable_id = %consumable.id, quantity = consumable.quantity, "库存已调整");
        }
        Ok(consumable)
    }
}
