use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A placed customer order. Created once at submission; only the payment
/// status changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Row letter and seat number concatenated into one token, e.g. "B15"
    pub seat_number: String,
    pub customer_name: String,
    #[sea_orm(nullable)]
    pub mobile_number: Option<String>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Derived: always equals the sum of quantity * price over this
    /// order's lines
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}

/// Accepted payment methods. Metadata only; no gateway is involved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "UPI")]
    Upi,
    #[sea_orm(string_value = "PHONEPE")]
    Phonepe,
    #[sea_orm(string_value = "GPAY")]
    Gpay,
    #[sea_orm(string_value = "PAYTM")]
    Paytm,
    #[sea_orm(string_value = "CARD")]
    Card,
    #[sea_orm(string_value = "CASH")]
    Cash,
}

impl PaymentMethod {
    /// Digital methods require a contact number for payment follow-up.
    pub fn requires_mobile_number(&self) -> bool {
        !matches!(self, PaymentMethod::Cash)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "FAILED")]
    Failed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digital_methods_require_mobile_number() {
        for method in [
            PaymentMethod::Upi,
            PaymentMethod::Phonepe,
            PaymentMethod::Gpay,
            PaymentMethod::Paytm,
            PaymentMethod::Card,
        ] {
            assert!(method.requires_mobile_number());
        }
        assert!(!PaymentMethod::Cash.requires_mobile_number());
    }

    #[test]
    fn payment_enums_serialize_uppercase() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Gpay).unwrap(),
            "\"GPAY\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Pending).unwrap(),
            "\"PENDING\""
        );
        let parsed: PaymentStatus = serde_json::from_str("\"PAID\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Paid);
    }
}
