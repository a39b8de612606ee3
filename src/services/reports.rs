use crate::{
    entities::{
        food_item::Entity as FoodItem,
        order::{self, Entity as Order, PaymentMethod, PaymentStatus},
        order_item::Entity as OrderItem,
    },
    errors::ServiceError,
    services::orders::DateWindow,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

const TOP_ITEM_LIMIT: usize = 5;
const RECENT_ORDER_LIMIT: u64 = 10;

/// Order count and revenue for one time window.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WindowStats {
    pub orders: u64,
    pub revenue: Decimal,
}

/// Orders and revenue attributed to one payment method.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethodStats {
    pub payment_method: PaymentMethod,
    pub orders: u64,
    pub revenue: Decimal,
}

/// One entry in the best-sellers ranking.
#[derive(Debug, Clone, Serialize)]
pub struct TopItem {
    pub food_item_id: i64,
    pub name: String,
    pub quantity_sold: u64,
    pub revenue: Decimal,
}

/// Everything the owner dashboard renders in one payload.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub today: WindowStats,
    pub week: WindowStats,
    pub month: WindowStats,
    /// Breakdown over the trailing month, sorted by revenue
    pub payment_breakdown: Vec<PaymentMethodStats>,
    /// All-time best sellers by quantity, top five
    pub top_items: Vec<TopItem>,
    pub pending_orders: u64,
    pub recent_orders: Vec<order::Model>,
}

/// Read-only aggregation over orders for the staff dashboard. Volumes
/// are theatre-sized, so windows are folded in process rather than
/// pushed into GROUP BY.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
}

impl ReportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Result<DashboardSummary, ServiceError> {
        let now = Utc::now();
        let month_orders = Order::find()
            .filter(order::Column::CreatedAt.gte(DateWindow::Month.cutoff(now)))
            .all(&*self.db)
            .await?;

        let today_cutoff = DateWindow::Today.cutoff(now);
        let week_cutoff = DateWindow::Week.cutoff(now);

        let mut today = WindowStats::default();
        let mut week = WindowStats::default();
        let mut month = WindowStats::default();
        let mut by_method: HashMap<PaymentMethod, PaymentMethodStats> = HashMap::new();

        for order in &month_orders {
            month.orders += 1;
            month.revenue += order.total_amount;
            if order.created_at >= week_cutoff {
                week.orders += 1;
                week.revenue += order.total_amount;
            }
            if order.created_at >= today_cutoff {
                today.orders += 1;
                today.revenue += order.total_amount;
            }

            let entry = by_method
                .entry(order.payment_method)
                .or_insert_with(|| PaymentMethodStats {
                    payment_method: order.payment_method,
                    orders: 0,
                    revenue: Decimal::ZERO,
                });
            entry.orders += 1;
            entry.revenue += order.total_amount;
        }

        let mut payment_breakdown: Vec<PaymentMethodStats> = by_method.into_values().collect();
        payment_breakdown.sort_by(|a, b| b.revenue.cmp(&a.revenue));

        let pending_orders = Order::find()
            .filter(order::Column::PaymentStatus.eq(PaymentStatus::Pending))
            .count(&*self.db)
            .await?;

        let recent_orders = Order::find()
            .order_by_desc(order::Column::CreatedAt)
            .limit(RECENT_ORDER_LIMIT)
            .all(&*self.db)
            .await?;

        let top_items = self.top_items().await?;

        Ok(DashboardSummary {
            today,
            week,
            month,
            payment_breakdown,
            top_items,
            pending_orders,
            recent_orders,
        })
    }

    async fn top_items(&self) -> Result<Vec<TopItem>, ServiceError> {
        let lines = OrderItem::find()
            .find_also_related(FoodItem)
            .all(&*self.db)
            .await?;

        let mut by_item: HashMap<i64, TopItem> = HashMap::new();
        for (line, item) in lines {
            let entry = by_item.entry(line.food_item_id).or_insert_with(|| TopItem {
                food_item_id: line.food_item_id,
                name: item
                    .map(|i| i.name)
                    .unwrap_or_else(|| "(removed item)".to_string()),
                quantity_sold: 0,
                revenue: Decimal::ZERO,
            });
            entry.quantity_sold += line.quantity as u64;
            entry.revenue += line.subtotal();
        }

        let mut ranked: Vec<TopItem> = by_item.into_values().collect();
        ranked.sort_by(|a, b| {
            b.quantity_sold
                .cmp(&a.quantity_sold)
                .then_with(|| b.revenue.cmp(&a.revenue))
        });
        ranked.truncate(TOP_ITEM_LIMIT);
        Ok(ranked)
    }
}
