pub mod db;
pub mod handlers;
pub mod models;

pub use db::OrderRepo;
pub use models::{Order, OrderStatus};
