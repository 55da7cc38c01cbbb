use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

/// A transition triggers the stock-restoring reversal exactly when it moves
/// an order into `cancelled` for the first time. Re-cancelling must not
/// restore stock twice.
pub fn restores_stock(current: OrderStatus, target: OrderStatus) -> bool {
    target == OrderStatus::Cancelled && current != OrderStatus::Cancelled
}

/// The unit price charged for a line: the discounted price when one is set
/// (zero is a valid discount), the list price otherwise. Always read from
/// the catalog, never from the client.
pub fn unit_price(price: i64, discount_price: Option<i64>) -> i64 {
    discount_price.unwrap_or(price)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Cod,
    BankTransfer,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_amount: i64,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item row. `price` is the unit price captured at purchase time;
/// rows are never edited after creation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
}

/// Line item joined with the live product row for display. The product may
/// have been deleted since purchase, so the joined fields are optional.
#[derive(Debug, Serialize, FromRow)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Listing row: order plus customer identity and an aggregate of its lines.
#[derive(Debug, Serialize, FromRow)]
pub struct OrderSummary {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_amount: i64,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub item_count: i64,
    pub product_names: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct OrderDetailRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub total_amount: i64,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: OrderDetailRow,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRef {
    pub id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub product: ProductRef,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub customer_name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_recognized_statuses() {
        assert_eq!(OrderStatus::parse("pending"), Some(OrderStatus::Pending));
        assert_eq!(OrderStatus::parse("processing"), Some(OrderStatus::Processing));
        assert_eq!(OrderStatus::parse("shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("delivered"), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::parse("cancelled"), Some(OrderStatus::Cancelled));
    }

    #[test]
    fn rejects_unknown_status_values() {
        assert_eq!(OrderStatus::parse("refunded"), None);
        assert_eq!(OrderStatus::parse("Pending"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }

    #[test]
    fn first_cancellation_restores_stock() {
        assert!(restores_stock(OrderStatus::Pending, OrderStatus::Cancelled));
        assert!(restores_stock(OrderStatus::Processing, OrderStatus::Cancelled));
        assert!(restores_stock(OrderStatus::Shipped, OrderStatus::Cancelled));
    }

    #[test]
    fn recancelling_does_not_restore_twice() {
        assert!(!restores_stock(OrderStatus::Cancelled, OrderStatus::Cancelled));
    }

    #[test]
    fn forward_transitions_leave_inventory_alone() {
        assert!(!restores_stock(OrderStatus::Pending, OrderStatus::Processing));
        assert!(!restores_stock(OrderStatus::Processing, OrderStatus::Shipped));
        assert!(!restores_stock(OrderStatus::Shipped, OrderStatus::Delivered));
    }

    #[test]
    fn unit_price_prefers_the_discount() {
        assert_eq!(unit_price(5000, Some(4200)), 4200);
        assert_eq!(unit_price(5000, None), 5000);
        // zero is a real discount, not an absent one
        assert_eq!(unit_price(5000, Some(0)), 0);
    }

    #[test]
    fn totals_accumulate_per_line() {
        let lines = [(5000_i64, None, 3_i32)];
        let total: i64 = lines
            .iter()
            .map(|&(price, discount, qty)| unit_price(price, discount) * qty as i64)
            .sum();
        assert_eq!(total, 15000);
    }

    #[test]
    fn payment_methods_use_wire_spelling() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank-transfer\""
        );
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"cod\"");
        let parsed: PaymentMethod = serde_json::from_str("\"bank-transfer\"").unwrap();
        assert_eq!(parsed, PaymentMethod::BankTransfer);
    }

    #[test]
    fn statuses_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
