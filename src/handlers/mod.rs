pub mod carts;
pub mod common;
pub mod menu;
pub mod orders;
pub mod staff;

use crate::{
    cart::SessionCartStore,
    events::EventSender,
    services::{CartService, CatalogService, OrderService, ReportService},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// All application services, constructed once and shared via state.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub cart: CartService,
    pub orders: OrderService,
    pub reports: ReportService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        carts: Arc<SessionCartStore>,
        event_sender: EventSender,
        page_size: u64,
    ) -> Self {
        let catalog = CatalogService::new(db.clone(), event_sender.clone());
        let cart = CartService::new(carts.clone(), catalog.clone(), event_sender.clone());
        let orders = OrderService::new(db.clone(), carts, event_sender, page_size);
        let reports = ReportService::new(db);
        Self {
            catalog,
            cart,
            orders,
            reports,
        }
    }
}
