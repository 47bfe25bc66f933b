//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::util::now_millis;
use sqlx::{SqliteExecutor, SqlitePool};

pub(crate) const COLUMNS: &str =
    "id, name, description, price, sku, category_id, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

/// Current price of a product; works inside a transaction
pub async fn find_price<'e, E>(executor: E, id: i64) -> RepoResult<Option<f64>>
where
    E: SqliteExecutor<'e>,
{
    let price = sqlx::query_scalar::<_, f64>("SELECT price FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(price)
}

pub async fn find_by_category(pool: &SqlitePool, category_id: i64) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products WHERE category_id = ? ORDER BY id"
    ))
    .bind(category_id)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn find_page(pool: &SqlitePool, limit: i64, offset: i64) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
        "SELECT {COLUMNS} FROM products ORDER BY id LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<u64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(total.max(0) as u64)
}

async fn ensure_category(pool: &SqlitePool, category_id: i64) -> RepoResult<()> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await?;
    if exists.is_none() {
        return Err(RepoError::Validation(format!(
            "Category {category_id} does not exist"
        )));
    }
    Ok(())
}

async fn ensure_unique_sku(pool: &SqlitePool, sku: &str, exclude_id: Option<i64>) -> RepoResult<()> {
    let found = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM products WHERE sku = ? AND id IS NOT ? LIMIT 1",
    )
    .bind(sku)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;
    if found.is_some() {
        return Err(RepoError::Duplicate(format!("SKU '{sku}' already exists")));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    ensure_category(pool, data.category_id).await?;
    ensure_unique_sku(pool, &data.sku, None).await?;

    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products (name, description, price, sku, category_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(data.description.unwrap_or_default())
    .bind(data.price)
    .bind(data.sku.trim())
    .bind(data.category_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    if let Some(category_id) = data.category_id {
        ensure_category(pool, category_id).await?;
    }
    if let Some(ref sku) = data.sku {
        ensure_unique_sku(pool, sku.trim(), Some(id)).await?;
    }

    let rows = sqlx::query(
        "UPDATE products SET name = COALESCE(?1, name), description = COALESCE(?2, description), \
         price = COALESCE(?3, price), sku = COALESCE(?4, sku), category_id = COALESCE(?5, category_id), \
         updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description)
    .bind(data.price)
    .bind(data.sku.as_deref().map(str::trim))
    .bind(data.category_id)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

/// Delete a product that no order references
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let referenced: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE product_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if referenced > 0 {
        return Err(RepoError::Validation(
            "Cannot delete product referenced by orders".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(true)
}
