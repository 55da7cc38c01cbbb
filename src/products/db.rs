use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::inventory::models::TransactionType;
use crate::products::models::{NewProduct, Product, ProductWithCategory, UpdateProductRequest};

#[derive(Clone)]
pub struct ProductRepo {
    pool: PgPool,
}

impl ProductRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        category: Option<Uuid>,
        search: Option<String>,
        promo: Option<bool>,
    ) -> Result<Vec<ProductWithCategory>, AppError> {
        let pattern = search.map(|s| format!("%{}%", s));
        let rows = sqlx::query_as::<_, ProductWithCategory>(
            r#"
            SELECT p.id, p.name, p.price, p.discount_price, p.image, p.category_id,
                   c.name AS category_name,
                   p.description, p.stock, p.is_featured, p.is_promo, p.created_at, p.updated_at
            FROM products p
            LEFT JOIN categories c ON p.category_id = c.id
            WHERE ($1::uuid IS NULL OR p.category_id = $1)
              AND ($2::text IS NULL OR p.name ILIKE $2 OR p.description ILIKE $2)
              AND ($3::boolean IS NULL OR p.is_promo = $3)
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(category)
        .bind(pattern)
        .bind(promo)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, discount_price, image, category_id, description,
                   stock, is_featured, is_promo, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Up to four other products from the same category.
    pub async fn related(&self, category_id: Option<Uuid>, id: Uuid) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, discount_price, image, category_id, description,
                   stock, is_featured, is_promo, created_at, updated_at
            FROM products
            WHERE category_id = $1 AND id != $2
            LIMIT 4
            "#,
        )
        .bind(category_id)
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts the product and, when it starts with stock, the `initial`
    /// ledger row in the same transaction.
    pub async fn create(&self, new: &NewProduct, actor: Option<Uuid>) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, discount_price, image, category_id, description, stock, is_featured, is_promo)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, price, discount_price, image, category_id, description,
                      stock, is_featured, is_promo, created_at, updated_at
            "#,
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(new.discount_price)
        .bind(&new.image)
        .bind(new.category_id)
        .bind(&new.description)
        .bind(new.stock)
        .bind(new.is_featured)
        .bind(new.is_promo)
        .fetch_one(&mut *tx)
        .await?;

        if product.stock > 0 {
            sqlx::query(
                r#"
                INSERT INTO inventory_transactions (product_id, quantity, transaction_type, notes, created_by)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(product.id)
            .bind(product.stock)
            .bind(TransactionType::Initial)
            .bind("Initial stock")
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(product)
    }

    /// Partial update. A stock change also appends an adjustment ledger row
    /// for the absolute difference, atomically with the product row.
    pub async fn update(
        &self,
        id: Uuid,
        req: &UpdateProductRequest,
        actor: Option<Uuid>,
    ) -> Result<Product, AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, price, discount_price, image, category_id, description,
                   stock, is_featured, is_promo, created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        let new_stock = req.stock.unwrap_or(existing.stock);
        let difference = new_stock - existing.stock;
        if difference != 0 {
            let transaction_type = if difference > 0 {
                TransactionType::AdjustmentAdd
            } else {
                TransactionType::AdjustmentRemove
            };
            sqlx::query(
                r#"
                INSERT INTO inventory_transactions (product_id, quantity, transaction_type, notes, created_by)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(difference.abs())
            .bind(transaction_type)
            .bind("Stock adjustment via admin update")
            .bind(actor)
            .execute(&mut *tx)
            .await?;
        }

        // absent discount_price clears the discount rather than keeping it
        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = COALESCE($1, name),
                price = COALESCE($2, price),
                discount_price = $3,
                image = COALESCE($4, image),
                category_id = COALESCE($5, category_id),
                description = COALESCE($6, description),
                stock = $7,
                is_featured = COALESCE($8, is_featured),
                is_promo = COALESCE($9, is_promo),
                updated_at = NOW()
            WHERE id = $10
            RETURNING id, name, price, discount_price, image, category_id, description,
                      stock, is_featured, is_promo, created_at, updated_at
            "#,
        )
        .bind(req.name.as_ref())
        .bind(req.price)
        .bind(req.discount_price)
        .bind(req.image.as_ref())
        .bind(req.category)
        .bind(req.description.as_ref())
        .bind(new_stock)
        .bind(req.is_featured)
        .bind(req.is_promo)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
