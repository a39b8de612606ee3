use crate::{
    cart::{Cart, CartLine, SessionCartStore, MAX_LINE_QUANTITY},
    errors::ServiceError,
    events::{Event, EventSender},
    services::catalog::CatalogService,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

/// Serializable view of a session's cart returned to the customer.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub total: Decimal,
    pub count: u32,
}

impl CartView {
    pub fn from_cart(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().cloned().collect(),
            total: cart.total(),
            count: cart.count(),
        }
    }
}

/// Session cart operations. Validates quantities and catalog state, then
/// mutates the in-memory cart for the session.
#[derive(Clone)]
pub struct CartService {
    store: Arc<SessionCartStore>,
    catalog: CatalogService,
    event_sender: EventSender,
}

impl CartService {
    pub fn new(
        store: Arc<SessionCartStore>,
        catalog: CatalogService,
        event_sender: EventSender,
    ) -> Self {
        Self {
            store,
            catalog,
            event_sender,
        }
    }

    pub fn view(&self, session_id: &str) -> CartView {
        CartView::from_cart(&self.store.snapshot(session_id))
    }

    /// Adds a quantity of a catalog item to the session's cart. The item
    /// must exist and be available; name and price are snapshotted from
    /// the catalog at add-time. Quantity must be 1..=10 per request,
    /// though repeated adds may accumulate past that on one line.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        session_id: &str,
        food_item_id: i64,
        quantity: u32,
    ) -> Result<CartView, ServiceError> {
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(ServiceError::validation(
                "quantity",
                format!("Quantity must be between 1 and {}.", MAX_LINE_QUANTITY),
            ));
        }

        let item = self.catalog.get(food_item_id).await?;
        if !item.available {
            return Err(ServiceError::InvalidInput(format!(
                "{} is currently unavailable",
                item.name
            )));
        }

        let view = self.store.with_cart(session_id, |cart| {
            cart.add_line(item.id, item.name.clone(), item.price, quantity);
            CartView::from_cart(cart)
        });
        info!(session_id, food_item_id, quantity, "item added to cart");
        Ok(view)
    }

    /// Overwrites a line's quantity. Zero removes the line. Updating an
    /// item that is not in the cart is a silent no-op; the current view
    /// is returned either way.
    #[instrument(skip(self))]
    pub fn update_item(
        &self,
        session_id: &str,
        food_item_id: i64,
        quantity: u32,
    ) -> Result<CartView, ServiceError> {
        if quantity > MAX_LINE_QUANTITY {
            return Err(ServiceError::validation(
                "quantity",
                format!("Quantity must be between 0 and {}.", MAX_LINE_QUANTITY),
            ));
        }

        let view = self.store.with_cart(session_id, |cart| {
            cart.set_quantity(food_item_id, quantity);
            CartView::from_cart(cart)
        });
        Ok(view)
    }

    /// Removes a line if present; no-op otherwise.
    #[instrument(skip(self))]
    pub fn remove_item(&self, session_id: &str, food_item_id: i64) -> CartView {
        self.store.with_cart(session_id, |cart| {
            cart.remove(food_item_id);
            CartView::from_cart(cart)
        })
    }

    /// Discards the session's entire cart.
    #[instrument(skip(self))]
    pub async fn clear(&self, session_id: &str) -> CartView {
        self.store.clear(session_id);
        self.event_sender
            .send_or_log(Event::CartCleared {
                session_id: session_id.to_string(),
            })
            .await;
        CartView::from_cart(&Cart::new())
    }
}
