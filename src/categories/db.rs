use sqlx::PgPool;
use uuid::Uuid;

use crate::categories::models::{Category, UpdateCategoryRequest};
use crate::error::AppError;

#[derive(Clone)]
pub struct CategoryRepo {
    pool: PgPool,
}

impl CategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>, AppError> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, image, created_at, updated_at FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create(&self, name: &str, image: Option<&str>) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, image)
            VALUES ($1, $2)
            RETURNING id, name, image, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(image)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn update(&self, id: Uuid, req: &UpdateCategoryRequest) -> Result<Category, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($1, name),
                image = COALESCE($2, image),
                updated_at = NOW()
            WHERE id = $3
            RETURNING id, name, image, created_at, updated_at
            "#,
        )
        .bind(req.name.as_ref())
        .bind(req.image.as_ref())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".into()))?;

        Ok(category)
    }

    /// Dependent products are detached, never deleted with the category.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_scalar::<_, i32>("SELECT 1 FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Err(AppError::NotFound("Category not found".into()));
        }

        sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
