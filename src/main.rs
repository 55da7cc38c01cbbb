mod auth;
mod categories;
mod db;
mod error;
mod inventory;
mod orders;
mod products;
mod redis_pub;
mod utils;

use std::env;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenvy::dotenv;

use crate::auth::AuthMiddleware;
use crate::categories::CategoryRepo;
use crate::inventory::InventoryRepo;
use crate::orders::OrderRepo;
use crate::products::ProductRepo;
use crate::redis_pub::RedisPublisher;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
    let redis_url = env::var("REDIS_URL").ok();
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let addr = format!("{}:{}", host, port);

    let pool = db::get_db_pool(&database_url).await;
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        log::error!("Migration failed: {:?}", e);
        std::process::exit(1);
    }

    let redis_pub = match &redis_url {
        Some(url) => match RedisPublisher::new(url).await {
            Ok(publisher) => web::Data::new(publisher),
            Err(e) => {
                log::warn!("Failed to connect to Redis: {:?}", e);
                log::warn!("Continuing without event publishing...");
                web::Data::new(RedisPublisher::new_noop())
            }
        },
        None => {
            log::warn!("No REDIS_URL configured, using no-op publisher");
            web::Data::new(RedisPublisher::new_noop())
        }
    };

    let product_repo = web::Data::new(ProductRepo::new(pool.clone()));
    let category_repo = web::Data::new(CategoryRepo::new(pool.clone()));
    let order_repo = web::Data::new(OrderRepo::new(pool.clone()));
    let inventory_repo = web::Data::new(InventoryRepo::new(pool.clone()));

    log::info!("UMI Store API running at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(product_repo.clone())
            .app_data(category_repo.clone())
            .app_data(order_repo.clone())
            .app_data(inventory_repo.clone())
            .app_data(redis_pub.clone())
            .wrap(AuthMiddleware::new(pool.clone(), jwt_secret.clone()))
            .wrap(Logger::default())
            .route("/api/products", web::get().to(products::handlers::list_products))
            .route("/api/products", web::post().to(products::handlers::create_product))
            .route("/api/products/{id}", web::get().to(products::handlers::get_product))
            .route("/api/products/{id}", web::put().to(products::handlers::update_product))
            .route("/api/products/{id}", web::delete().to(products::handlers::delete_product))
            .route("/api/categories", web::get().to(categories::handlers::list_categories))
            .route("/api/categories", web::post().to(categories::handlers::create_category))
            .route("/api/categories/{id}", web::put().to(categories::handlers::update_category))
            .route("/api/categories/{id}", web::delete().to(categories::handlers::delete_category))
            .route("/api/orders", web::post().to(orders::handlers::create_order))
            .route("/api/orders", web::get().to(orders::handlers::get_orders))
            // order matters: more specific routes before less specific
            .route("/api/orders/{id}/status", web::put().to(orders::handlers::update_order_status))
            .route("/api/orders/{id}", web::get().to(orders::handlers::get_order))
            .route("/api/inventory/update", web::post().to(inventory::handlers::update_inventory))
            .route("/api/inventory/low-stock", web::get().to(inventory::handlers::low_stock_products))
            .route("/api/inventory/product/{id}", web::get().to(inventory::handlers::product_inventory_history))
    })
    .bind(addr)?
    .run()
    .await
}
