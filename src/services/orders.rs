use crate::{
    cart::SessionCartStore,
    entities::{
        food_item::Entity as FoodItem,
        order::{self, Entity as Order, PaymentMethod, PaymentStatus},
        order_item::{self, Entity as OrderItem},
    },
    errors::{FieldError, ServiceError},
    events::{Event, EventSender},
};
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

static MOBILE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10,}$").expect("mobile number regex"));

const MAX_SEAT_NUMBER: u8 = 30;

/// Order form submitted by the customer together with their session cart.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub row_letter: String,
    pub seat_number: u8,
    pub customer_name: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    pub payment_method: PaymentMethod,
}

impl PlaceOrderRequest {
    /// Field-by-field validation; all failures are collected so the form
    /// can be redisplayed in one pass.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut errors = Vec::new();

        if self.customer_name.trim().is_empty() {
            errors.push(FieldError::new(
                "customer_name",
                "Customer name is required.",
            ));
        }

        let row = self.row_letter.trim();
        if row.len() != 1 || !row.chars().all(|c| c.is_ascii_uppercase()) {
            errors.push(FieldError::new("row_letter", "Please select a row."));
        }

        if self.seat_number < 1 || self.seat_number > MAX_SEAT_NUMBER {
            errors.push(FieldError::new(
                "seat_number",
                "Please select a seat number.",
            ));
        }

        let mobile = self
            .mobile_number
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());
        match mobile {
            None => {
                if self.payment_method.requires_mobile_number() {
                    errors.push(FieldError::new(
                        "mobile_number",
                        "Mobile number is required for digital payments.",
                    ));
                }
            }
            Some(m) => {
                if !MOBILE_NUMBER_RE.is_match(m) {
                    errors.push(FieldError::new(
                        "mobile_number",
                        "Please enter a valid mobile number.",
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(errors))
        }
    }

    /// Row letter and seat number become one seat token, e.g. "B15".
    pub fn seat_token(&self) -> String {
        format!("{}{}", self.row_letter.trim(), self.seat_number)
    }

    fn normalized_mobile(&self) -> Option<String> {
        self.mobile_number
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from)
    }
}

/// An order together with its line items, as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// Relative date windows used by the staff order list and the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateWindow {
    Today,
    Week,
    Month,
}

impl DateWindow {
    /// Inclusive lower bound for `created_at` in this window.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DateWindow::Today => now
                .date_naive()
                .and_hms_opt(0, 0, 0)
                .expect("midnight is valid")
                .and_utc(),
            DateWindow::Week => now - Duration::days(7),
            DateWindow::Month => now - Duration::days(30),
        }
    }
}

/// Staff order-list filters. All optional and combinable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListFilter {
    pub status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub date_window: Option<DateWindow>,
    /// Case-insensitive substring match over customer name, seat token,
    /// and mobile number.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<order::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

/// Order placement and administration.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    carts: Arc<SessionCartStore>,
    event_sender: EventSender,
    page_size: u64,
}

impl OrderService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        carts: Arc<SessionCartStore>,
        event_sender: EventSender,
        page_size: u64,
    ) -> Self {
        Self {
            db,
            carts,
            event_sender,
            page_size: page_size.max(1),
        }
    }

    /// Turns the session's cart into a persisted order. The order header,
    /// every line, and the recomputed total are written in one
    /// transaction; any failure (including a cart line whose catalog item
    /// has since been deleted) rolls the whole submission back and leaves
    /// the cart intact. The cart is cleared only after commit.
    #[instrument(skip(self, request), fields(session_id = %session_id))]
    pub async fn place_order(
        &self,
        session_id: &str,
        request: PlaceOrderRequest,
    ) -> Result<OrderWithItems, ServiceError> {
        let cart = self.carts.snapshot(session_id);
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        request.validate()?;

        let txn = self.db.begin().await?;

        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            seat_number: Set(request.seat_token()),
            customer_name: Set(request.customer_name.trim().to_string()),
            mobile_number: Set(request.normalized_mobile()),
            payment_method: Set(request.payment_method),
            payment_status: Set(PaymentStatus::Pending),
            total_amount: Set(cart.total()),
            ..Default::default()
        };
        let mut order = order.insert(&txn).await?;

        let mut items = Vec::with_capacity(cart.len());
        let mut total = Decimal::ZERO;
        for line in cart.lines() {
            // Re-resolve each item inside the transaction: the catalog may
            // have changed since the line was added. Current price wins.
            let item = FoodItem::find_by_id(line.food_item_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "food item {} is no longer on the menu",
                        line.food_item_id
                    ))
                })?;

            let quantity = i32::try_from(line.quantity)
                .map_err(|_| ServiceError::InvalidInput("quantity out of range".to_string()))?;
            let order_item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                food_item_id: Set(item.id),
                quantity: Set(quantity),
                price: Set(item.price),
                ..Default::default()
            };
            let order_item = order_item.insert(&txn).await?;
            total += order_item.subtotal();
            items.push(order_item);
        }

        // The stored total is derived from the persisted lines, not the
        // cart's add-time snapshots.
        if order.total_amount != total {
            let mut active: order::ActiveModel = order.into();
            active.total_amount = Set(total);
            order = active.update(&txn).await?;
        }

        txn.commit().await?;
        self.carts.clear(session_id);

        self.event_sender
            .send_or_log(Event::OrderPlaced {
                order_id,
                seat_number: order.seat_number.clone(),
                total_amount: order.total_amount,
            })
            .await;
        info!(order_id = %order_id, total = %order.total_amount, "order placed");

        Ok(OrderWithItems { order, items })
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderWithItems, ServiceError> {
        let order = Order::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", id)))?;
        let items = order
            .find_related(OrderItem)
            .all(&*self.db)
            .await?;
        Ok(OrderWithItems { order, items })
    }

    /// Filtered, newest-first page of orders for the staff list.
    /// Pages are 1-based; a page past the end yields an empty list.
    #[instrument(skip(self, filter))]
    pub async fn list_orders(
        &self,
        filter: OrderListFilter,
        page: u64,
    ) -> Result<OrderPage, ServiceError> {
        let mut query = Order::find();

        if let Some(status) = filter.status {
            query = query.filter(order::Column::PaymentStatus.eq(status));
        }
        if let Some(method) = filter.payment_method {
            query = query.filter(order::Column::PaymentMethod.eq(method));
        }
        if let Some(window) = filter.date_window {
            query = query.filter(order::Column::CreatedAt.gte(window.cutoff(Utc::now())));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(order::Column::CustomerName)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(order::Column::SeatNumber)))
                            .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(order::Column::MobileNumber)))
                            .like(pattern),
                    ),
            );
        }

        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, self.page_size);
        let total = paginator.num_items().await?;
        let total_pages = paginator.num_pages().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(OrderPage {
            orders,
            total,
            page,
            per_page: self.page_size,
            total_pages,
        })
    }

    /// Sets an order's payment status. Any transition is allowed; a
    /// status-change event records old and new for audit.
    #[instrument(skip(self))]
    pub async fn update_payment_status(
        &self,
        id: Uuid,
        new_status: PaymentStatus,
    ) -> Result<order::Model, ServiceError> {
        let order = Order::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("order {} not found", id)))?;
        let old_status = order.payment_status;

        let mut active: order::ActiveModel = order.into();
        active.payment_status = Set(new_status);
        let order = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::PaymentStatusChanged {
                order_id: id,
                old_status,
                new_status,
            })
            .await;
        info!(order_id = %id, ?old_status, ?new_status, "payment status updated");
        Ok(order)
    }
}
