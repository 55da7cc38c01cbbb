use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::inventory::models::TransactionType;
use crate::orders::models::{
    restores_stock, unit_price, Order, OrderDetail, OrderDetailRow, OrderItem, OrderItemDetail,
    OrderItemRequest, OrderStatus, OrderSummary, OrderWithItems, PaymentMethod,
};
use crate::products::models::Product;

struct OrderLine {
    product_id: Uuid,
    quantity: i32,
    price: i64,
}

#[derive(Clone)]
pub struct OrderRepo {
    pool: PgPool,
}

impl OrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Places an order. Every line is validated against the stock value read
    /// under a row lock in this transaction, so two concurrent orders for the
    /// same product serialize and the loser fails instead of driving stock
    /// negative. Nothing is committed unless every line fits: the order row,
    /// its items, the stock decrements and the `sale` ledger rows all land
    /// together or not at all.
    pub async fn create_order(
        &self,
        items: &[OrderItemRequest],
        customer_name: &str,
        address: &str,
        phone: &str,
        payment_method: PaymentMethod,
        user_id: Option<Uuid>,
    ) -> Result<OrderWithItems, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut total_amount: i64 = 0;
        let mut lines: Vec<OrderLine> = Vec::with_capacity(items.len());

        for item in items {
            let product = sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, price, discount_price, image, category_id, description,
                       stock, is_featured, is_promo, created_at, updated_at
                FROM products
                WHERE id = $1
                FOR UPDATE
                "#,
            )
            .bind(item.product.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Product with ID {} not found", item.product.id))
            })?;

            if product.stock < item.quantity {
                return Err(AppError::InsufficientStock {
                    product_id: product.id,
                    available: product.stock,
                });
            }

            let price = unit_price(product.price, product.discount_price);
            total_amount += price * item.quantity as i64;

            // Decrement inside the loop so a second line for the same product
            // is checked against the running stock value.
            sqlx::query("UPDATE products SET stock = stock - $1, updated_at = NOW() WHERE id = $2")
                .bind(item.quantity)
                .bind(product.id)
                .execute(&mut *tx)
                .await?;

            lines.push(OrderLine {
                product_id: product.id,
                quantity: item.quantity,
                price,
            });
        }

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (user_id, total_amount, customer_name, address, phone, payment_method, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, total_amount, customer_name, address, phone, payment_method,
                      status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(total_amount)
        .bind(customer_name)
        .bind(address)
        .bind(phone)
        .bind(payment_method)
        .bind(OrderStatus::Pending)
        .fetch_one(&mut *tx)
        .await?;

        let mut order_items = Vec::with_capacity(lines.len());
        for line in &lines {
            let order_item = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                VALUES ($1, $2, $3, $4)
                RETURNING id, order_id, product_id, quantity, price
                "#,
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO inventory_transactions
                    (product_id, quantity, transaction_type, reference_id, reference_type, created_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(TransactionType::Sale)
            .bind(order.id)
            .bind("order")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

            order_items.push(order_item);
        }

        tx.commit().await?;
        Ok(OrderWithItems {
            order,
            items: order_items,
        })
    }

    /// Sets the order status. The first transition into `cancelled` restores
    /// each line's stock and appends a `return` ledger row per line before
    /// the status itself is written; everything happens in one transaction.
    /// Returns the updated order and whether stock was restored.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        target: OrderStatus,
        actor: Option<Uuid>,
    ) -> Result<(Order, bool), AppError> {
        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, user_id, total_amount, customer_name, address, phone, payment_method,
                   status, created_at, updated_at
            FROM orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;

        let restock = restores_stock(order.status, target);
        if restock {
            let items = sqlx::query_as::<_, OrderItem>(
                "SELECT id, order_id, product_id, quantity, price FROM order_items WHERE order_id = $1",
            )
            .bind(order_id)
            .fetch_all(&mut *tx)
            .await?;

            for item in &items {
                // A product deleted since purchase has nothing to restore.
                let restored = sqlx::query(
                    "UPDATE products SET stock = stock + $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(item.quantity)
                .bind(item.product_id)
                .execute(&mut *tx)
                .await?;
                if restored.rows_affected() == 0 {
                    continue;
                }

                sqlx::query(
                    r#"
                    INSERT INTO inventory_transactions
                        (product_id, quantity, transaction_type, reference_id, reference_type, notes, created_by)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(TransactionType::Return)
                .bind(order_id)
                .bind("order")
                .bind("Order cancelled")
                .bind(actor)
                .execute(&mut *tx)
                .await?;
            }
        }

        let updated = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, user_id, total_amount, customer_name, address, phone, payment_method,
                      status, created_at, updated_at
            "#,
        )
        .bind(target)
        .bind(order_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((updated, restock))
    }

    pub async fn list_all(&self) -> Result<Vec<OrderSummary>, AppError> {
        let rows = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id, o.user_id, o.total_amount, o.customer_name, o.address, o.phone,
                   o.payment_method, o.status, o.created_at, o.updated_at,
                   u.name AS user_name, u.email AS user_email,
                   COUNT(oi.id) AS item_count,
                   STRING_AGG(p.name, ', ' ORDER BY oi.id) AS product_names
            FROM orders o
            LEFT JOIN users u ON o.user_id = u.id
            LEFT JOIN order_items oi ON oi.order_id = o.id
            LEFT JOIN products p ON oi.product_id = p.id
            GROUP BY o.id, u.name, u.email
            ORDER BY o.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderSummary>, AppError> {
        let rows = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id, o.user_id, o.total_amount, o.customer_name, o.address, o.phone,
                   o.payment_method, o.status, o.created_at, o.updated_at,
                   u.name AS user_name, u.email AS user_email,
                   COUNT(oi.id) AS item_count,
                   STRING_AGG(p.name, ', ' ORDER BY oi.id) AS product_names
            FROM orders o
            LEFT JOIN users u ON o.user_id = u.id
            LEFT JOIN order_items oi ON oi.order_id = o.id
            LEFT JOIN products p ON oi.product_id = p.id
            WHERE o.user_id = $1
            GROUP BY o.id, u.name, u.email
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Order plus its items. `scope_to_user` restricts the lookup to that
    /// customer's own orders; admins pass None.
    pub async fn get(
        &self,
        order_id: Uuid,
        scope_to_user: Option<Uuid>,
    ) -> Result<Option<OrderDetail>, AppError> {
        let order = sqlx::query_as::<_, OrderDetailRow>(
            r#"
            SELECT o.id, o.user_id, o.total_amount, o.customer_name, o.address, o.phone,
                   o.payment_method, o.status, o.created_at, o.updated_at,
                   u.name AS user_name, u.email AS user_email
            FROM orders o
            LEFT JOIN users u ON o.user_id = u.id
            WHERE o.id = $1
              AND ($2::uuid IS NULL OR o.user_id = $2)
            "#,
        )
        .bind(order_id)
        .bind(scope_to_user)
        .fetch_optional(&self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItemDetail>(
            r#"
            SELECT oi.id, oi.order_id, oi.product_id, oi.quantity, oi.price,
                   p.name, p.image
            FROM order_items oi
            LEFT JOIN products p ON oi.product_id = p.id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrderDetail { order, items }))
    }
}
