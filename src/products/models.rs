use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog row. `price` and `discount_price` are in the smallest currency
/// unit. `stock` is only ever mutated inside a transaction that also appends
/// a matching inventory_transactions row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: String,
    pub stock: i32,
    pub is_featured: bool,
    pub is_promo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product joined with its category name for listing endpoints.
#[derive(Debug, Serialize, FromRow)]
pub struct ProductWithCategory {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub description: String,
    pub stock: i32,
    pub is_featured: bool,
    pub is_promo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub discount_price: Option<i64>,
    pub image: Option<String>,
    pub category: Option<Uuid>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub is_featured: Option<bool>,
    pub is_promo: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub discount_price: Option<i64>,
    pub image: Option<String>,
    pub category: Option<Uuid>,
    pub description: Option<String>,
    pub stock: Option<i32>,
    pub is_featured: Option<bool>,
    pub is_promo: Option<bool>,
}

/// Validated, sanitized input for an insert.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub image: Option<String>,
    pub category_id: Uuid,
    pub description: String,
    pub stock: i32,
    pub is_featured: bool,
    pub is_promo: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<Uuid>,
    pub search: Option<String>,
    pub promo: Option<String>,
}
