use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::error::AppError;
use crate::inventory::db::InventoryRepo;
use crate::inventory::models::{
    AdjustmentType, LowStockQuery, UpdateInventoryRequest, DEFAULT_LOW_STOCK_THRESHOLD,
};
use crate::redis_pub::RedisPublisher;

pub async fn update_inventory(
    req: HttpRequest,
    repo: web::Data<InventoryRepo>,
    redis_pub: web::Data<RedisPublisher>,
    body: web::Json<UpdateInventoryRequest>,
) -> Result<HttpResponse, AppError> {
    let user = require_admin(&req)?;

    let (product_id, quantity, kind) = match (body.product_id, body.quantity, body.kind.as_deref())
    {
        (Some(product_id), Some(quantity), Some(kind)) => (product_id, quantity, kind),
        _ => {
            return Err(AppError::Validation(
                "Product ID, quantity, and type are required".into(),
            ))
        }
    };
    let kind = AdjustmentType::parse(kind)
        .ok_or_else(|| AppError::Validation("Invalid inventory update type".into()))?;

    let (product, adjustment) = repo
        .adjust(product_id, quantity, kind, body.notes.as_deref(), Some(user.id))
        .await?;

    let event = json!({
        "event_type": "inventory.updated",
        "product_id": product.id,
        "new_stock": product.stock,
        "ledger": adjustment.ledger,
    });
    if let Err(e) = redis_pub.publish("inventory.updated", &event).await {
        log::error!("Redis publish error (inventory.updated): {:?}", e);
    }
    if product.stock <= DEFAULT_LOW_STOCK_THRESHOLD {
        if let Err(e) = redis_pub.publish("inventory.lowstock", &event).await {
            log::error!("Redis publish error (inventory.lowstock): {:?}", e);
        }
    }

    let message = match kind {
        AdjustmentType::Add => format!("Product stock increased by {} units", quantity),
        AdjustmentType::Remove => format!("Product stock reduced by {} units", quantity),
        AdjustmentType::Set => format!("Product stock set to {} units", quantity),
    };

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "product": product,
        "message": message,
    })))
}

pub async fn low_stock_products(
    req: HttpRequest,
    repo: web::Data<InventoryRepo>,
    query: web::Query<LowStockQuery>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req)?;

    let threshold = query.threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    let products = repo.low_stock(threshold).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "products": products,
    })))
}

pub async fn product_inventory_history(
    req: HttpRequest,
    repo: web::Data<InventoryRepo>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req)?;

    let (product, transactions) = repo.history(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "product": product,
        "inventoryTransactions": transactions,
    })))
}
