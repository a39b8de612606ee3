use crate::{
    entities::food_item::{self, Entity as FoodItem, Model as FoodItemModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

const MIN_PRICE: Decimal = dec!(0.01);

/// Input for creating or replacing a food item
#[derive(Debug, Clone, Deserialize)]
pub struct FoodItemInput {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl FoodItemInput {
    fn validated(mut self) -> Result<Self, ServiceError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(ServiceError::validation("name", "Name is required."));
        }
        if self.price < MIN_PRICE {
            return Err(ServiceError::validation(
                "price",
                "Price must be at least 0.01.",
            ));
        }
        Ok(self)
    }
}

/// Catalog management: the menu customers browse and staff curate.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Available items only, ordered by name. This is the public menu.
    pub async fn list_available(&self) -> Result<Vec<FoodItemModel>, ServiceError> {
        let items = FoodItem::find()
            .filter(food_item::Column::Available.eq(true))
            .order_by_asc(food_item::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    /// Every item regardless of availability, ordered by name. Staff view.
    pub async fn list_all(&self) -> Result<Vec<FoodItemModel>, ServiceError> {
        let items = FoodItem::find()
            .order_by_asc(food_item::Column::Name)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    pub async fn get(&self, id: i64) -> Result<FoodItemModel, ServiceError> {
        FoodItem::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("food item {} not found", id)))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: FoodItemInput) -> Result<FoodItemModel, ServiceError> {
        let input = input.validated()?;

        let item = food_item::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            available: Set(input.available),
            ..Default::default()
        };

        let item = item.insert(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::FoodItemCreated(item.id))
            .await;
        info!(food_item_id = item.id, name = %item.name, "food item created");
        Ok(item)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: FoodItemInput) -> Result<FoodItemModel, ServiceError> {
        let input = input.validated()?;
        let existing = self.get(id).await?;

        let mut item: food_item::ActiveModel = existing.into();
        item.name = Set(input.name);
        item.description = Set(input.description);
        item.price = Set(input.price);
        item.available = Set(input.available);

        let item = item.update(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::FoodItemUpdated(id))
            .await;
        Ok(item)
    }

    /// Flips the availability flag. The recommended way to retire an item,
    /// since deletion cascades into historical order lines.
    #[instrument(skip(self))]
    pub async fn toggle_availability(&self, id: i64) -> Result<FoodItemModel, ServiceError> {
        let existing = self.get(id).await?;
        let now_available = !existing.available;

        let mut item: food_item::ActiveModel = existing.into();
        item.available = Set(now_available);

        let item = item.update(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::FoodItemUpdated(id))
            .await;
        info!(food_item_id = id, available = now_available, "availability toggled");
        Ok(item)
    }

    /// Hard delete. Cascades to order lines that reference the item,
    /// destroying that slice of order history.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        existing.delete(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::FoodItemDeleted(id))
            .await;
        info!(food_item_id = id, "food item deleted");
        Ok(())
    }
}
