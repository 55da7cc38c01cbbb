use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::error::AppError;
use crate::products::db::ProductRepo;
use crate::products::models::{CreateProductRequest, NewProduct, ProductListQuery, UpdateProductRequest};
use crate::redis_pub::RedisPublisher;
use crate::utils::sanitize;

pub async fn list_products(
    repo: web::Data<ProductRepo>,
    query: web::Query<ProductListQuery>,
) -> Result<HttpResponse, AppError> {
    let promo = if query.promo.as_deref() == Some("true") {
        Some(true)
    } else {
        None
    };
    let products = repo.list(query.category, query.search.clone(), promo).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "products": products,
    })))
}

pub async fn get_product(
    repo: web::Data<ProductRepo>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    let related = repo.related(product.category_id, id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "product": product,
        "relatedProducts": related,
    })))
}

pub async fn create_product(
    req: HttpRequest,
    repo: web::Data<ProductRepo>,
    redis_pub: web::Data<RedisPublisher>,
    body: web::Json<CreateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let user = require_admin(&req)?;
    let body = body.into_inner();

    let (name, price, category_id) = match (&body.name, body.price, body.category) {
        (Some(name), Some(price), Some(category)) if !name.trim().is_empty() => {
            (name.clone(), price, category)
        }
        _ => {
            return Err(AppError::Validation(
                "Please provide name, price and category".into(),
            ))
        }
    };
    let stock = body.stock.unwrap_or(0);
    if price < 0 || stock < 0 {
        return Err(AppError::Validation(
            "Price and stock must be non-negative".into(),
        ));
    }

    let new = NewProduct {
        name: sanitize(&name),
        price,
        discount_price: body.discount_price,
        image: body.image,
        category_id,
        description: sanitize(body.description.as_deref().unwrap_or("")),
        stock,
        is_featured: body.is_featured.unwrap_or(false),
        is_promo: body.is_promo.unwrap_or(false),
    };

    let product = repo.create(&new, Some(user.id)).await?;

    let event = json!({
        "event_type": "product.created",
        "product_id": product.id,
        "name": product.name,
        "stock": product.stock,
    });
    if let Err(e) = redis_pub.publish("product.created", &event).await {
        log::error!("Redis publish error (product.created): {:?}", e);
    }

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "product": product,
    })))
}

pub async fn update_product(
    req: HttpRequest,
    repo: web::Data<ProductRepo>,
    redis_pub: web::Data<RedisPublisher>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProductRequest>,
) -> Result<HttpResponse, AppError> {
    let user = require_admin(&req)?;
    let id = path.into_inner();

    let mut update = body.into_inner();
    update.name = update.name.map(|n| sanitize(&n));
    update.description = update.description.map(|d| sanitize(&d));
    if update.price.is_some_and(|p| p < 0) || update.stock.is_some_and(|s| s < 0) {
        return Err(AppError::Validation(
            "Price and stock must be non-negative".into(),
        ));
    }

    let product = repo.update(id, &update, Some(user.id)).await?;

    let event = json!({
        "event_type": "product.updated",
        "product_id": product.id,
        "name": product.name,
        "stock": product.stock,
    });
    if let Err(e) = redis_pub.publish("product.updated", &event).await {
        log::error!("Redis publish error (product.updated): {:?}", e);
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "product": product,
    })))
}

pub async fn delete_product(
    req: HttpRequest,
    repo: web::Data<ProductRepo>,
    redis_pub: web::Data<RedisPublisher>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req)?;
    let id = path.into_inner();

    let rows = repo.delete(id).await?;
    if rows == 0 {
        return Err(AppError::NotFound("Product not found".into()));
    }

    let event = json!({
        "event_type": "product.deleted",
        "product_id": id,
    });
    if let Err(e) = redis_pub.publish("product.deleted", &event).await {
        log::error!("Redis publish error (product.deleted): {:?}", e);
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Product deleted successfully",
    })))
}
