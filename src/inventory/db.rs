use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::inventory::models::{
    apply_adjustment, Adjustment, AdjustmentType, InventoryTransactionWithUser,
};
use crate::products::models::{Product, ProductWithCategory};

#[derive(Clone)]
pub struct InventoryRepo {
    pool: PgPool,
}

impl InventoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Manual stock correction. The product row is locked, the new stock and
    /// the ledger row are written together, or not at all.
    pub async fn adjust(
        &self,
        product_id: Uuid,
        quantity: i32,
        kind: AdjustmentType,
        notes: Option<&str>,
        actor: Option<Uuid>,
    ) -> Result<(Product, Adjustment), AppError> {
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, discount_price, image, category_id, description,
                   stock, is_featured, is_promo, created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        let adjustment = apply_adjustment(product_id, product.stock, quantity, kind)?;

        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, name, price, discount_price, image, category_id, description,
                      stock, is_featured, is_promo, created_at, updated_at
            "#,
        )
        .bind(adjustment.new_stock)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        if let Some((ledger_quantity, transaction_type)) = adjustment.ledger {
            sqlx::query(
                r#"
                INSERT INTO inventory_transactions (product_id, quantity, transaction_type, notes, created_by)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(product_id)
            .bind(ledger_quantity)
            .bind(transaction_type)
            .bind(notes.unwrap_or("Manual inventory update"))
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok((updated, adjustment))
    }

    pub async fn low_stock(&self, threshold: i32) -> Result<Vec<ProductWithCategory>, AppError> {
        let rows = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.name, p.price, p.discount_price, p.image, p.category_id,
                   c.name AS category_name,
                   p.description, p.stock, p.is_featured, p.is_promo, p.created_at, p.updated_at
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            WHERE p.stock <= $1
            ORDER BY p.stock ASC
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Full ledger history for a product, most recent first.
    pub async fn history(
        &self,
        product_id: Uuid,
    ) -> Result<(Product, Vec<InventoryTransactionWithUser>), AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, discount_price, image, category_id, description,
                   stock, is_featured, is_promo, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        let transactions = sqlx::query_as::<_, InventoryTransactionWithUser>(
            r#"
            SELECT it.id, it.product_id, it.quantity, it.transaction_type,
                   it.reference_id, it.reference_type, it.notes, it.created_by,
                   u.name AS created_by_name,
                   it.created_at
            FROM inventory_transactions it
            LEFT JOIN users u ON it.created_by = u.id
            WHERE it.product_id = $1
            ORDER BY it.created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((product, transactions))
    }
}
