use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{current_user, require_admin, require_user, UserRole};
use crate::error::AppError;
use crate::orders::db::OrderRepo;
use crate::orders::models::{CreateOrderRequest, OrderStatus, UpdateOrderStatusRequest};
use crate::redis_pub::RedisPublisher;
use crate::utils::sanitize;

pub async fn create_order(
    req: HttpRequest,
    repo: web::Data<OrderRepo>,
    redis_pub: web::Data<RedisPublisher>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    // Guest checkout is allowed; an authenticated user is attributed.
    let user_id = current_user(&req).map(|u| u.id);
    let body = body.into_inner();

    let (customer_name, address, phone, payment_method) = match (
        body.customer_name.as_deref(),
        body.address.as_deref(),
        body.phone.as_deref(),
        body.payment_method,
    ) {
        (Some(name), Some(address), Some(phone), Some(payment_method))
            if !body.items.is_empty()
                && !name.trim().is_empty()
                && !address.trim().is_empty()
                && !phone.trim().is_empty() =>
        {
            (name, address, phone, payment_method)
        }
        _ => {
            return Err(AppError::Validation(
                "Missing required order information".into(),
            ))
        }
    };
    if body.items.iter().any(|item| item.quantity <= 0) {
        return Err(AppError::Validation(
            "Item quantities must be positive".into(),
        ));
    }

    let order = repo
        .create_order(
            &body.items,
            &sanitize(customer_name),
            &sanitize(address),
            &sanitize(phone),
            payment_method,
            user_id,
        )
        .await?;

    let event = json!({
        "event_type": "order.created",
        "order_id": order.order.id,
        "user_id": order.order.user_id,
        "total_amount": order.order.total_amount,
        "item_count": order.items.len(),
        "timestamp": order.order.created_at,
    });
    if let Err(e) = redis_pub.publish("order.created", &event).await {
        log::error!("Redis publish error (order.created): {:?}", e);
    }

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "order": order,
        "message": "Order placed successfully",
    })))
}

pub async fn get_orders(
    req: HttpRequest,
    repo: web::Data<OrderRepo>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;

    let orders = if user.role == UserRole::Admin {
        repo.list_all().await?
    } else {
        repo.list_for_user(user.id).await?
    };

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "orders": orders,
    })))
}

pub async fn get_order(
    req: HttpRequest,
    repo: web::Data<OrderRepo>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;

    let scope = match user.role {
        UserRole::Admin => None,
        UserRole::Customer => Some(user.id),
    };
    let order = repo
        .get(path.into_inner(), scope)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "order": order,
    })))
}

pub async fn update_order_status(
    req: HttpRequest,
    repo: web::Data<OrderRepo>,
    redis_pub: web::Data<RedisPublisher>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let user = require_admin(&req)?;

    let status = body
        .status
        .as_deref()
        .ok_or_else(|| AppError::Validation("Status is required".into()))?;
    let target = OrderStatus::parse(status)
        .ok_or_else(|| AppError::Validation("Invalid status value".into()))?;

    let (order, restocked) = repo
        .update_status(path.into_inner(), target, Some(user.id))
        .await?;

    if restocked {
        let event = json!({
            "event_type": "order.cancelled",
            "order_id": order.id,
            "user_id": order.user_id,
            "timestamp": order.updated_at,
        });
        if let Err(e) = redis_pub.publish("order.cancelled", &event).await {
            log::error!("Redis publish error (order.cancelled): {:?}", e);
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "order": order,
    })))
}
