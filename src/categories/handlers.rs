use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::auth::require_admin;
use crate::categories::db::CategoryRepo;
use crate::categories::models::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::error::AppError;
use crate::utils::sanitize;

pub async fn list_categories(repo: web::Data<CategoryRepo>) -> Result<HttpResponse, AppError> {
    let categories = repo.list().await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "categories": categories,
    })))
}

pub async fn create_category(
    req: HttpRequest,
    repo: web::Data<CategoryRepo>,
    body: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req)?;

    let name = match body.name.as_deref() {
        Some(name) if !name.trim().is_empty() => sanitize(name),
        _ => return Err(AppError::Validation("Category name is required".into())),
    };

    let category = repo.create(&name, body.image.as_deref()).await?;

    Ok(HttpResponse::Created().json(json!({
        "status": "success",
        "category": category,
    })))
}

pub async fn update_category(
    req: HttpRequest,
    repo: web::Data<CategoryRepo>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req)?;

    let mut update = body.into_inner();
    update.name = update.name.map(|n| sanitize(&n));
    let category = repo.update(path.into_inner(), &update).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "category": category,
    })))
}

pub async fn delete_category(
    req: HttpRequest,
    repo: web::Data<CategoryRepo>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req)?;

    repo.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Category deleted successfully",
    })))
}
