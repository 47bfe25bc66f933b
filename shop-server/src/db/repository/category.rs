//! Category Repository
//!
//! Categories form a forest through `parent_id`. Reads that return a single
//! category hydrate one level of children and the category's own products.
//! Subtree queries cover the category plus its direct children only.

use super::{RepoError, RepoResult, placeholders, product};
use shared::models::{Category, CategoryCreate, CategoryUpdate, Product};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, parent_id, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(category)
}

/// Direct children of `parent_id`, ordered by name
pub async fn find_children(pool: &SqlitePool, parent_id: i64) -> RepoResult<Vec<Category>> {
    let children = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE parent_id = ? ORDER BY name"
    ))
    .bind(parent_id)
    .fetch_all(pool)
    .await?;
    Ok(children)
}

/// IDs of the direct children of `parent_id`
pub async fn find_child_ids(pool: &SqlitePool, parent_id: i64) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE parent_id = ?")
        .bind(parent_id)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Category with its direct children and its own products
pub async fn find_with_relations(pool: &SqlitePool, id: i64) -> RepoResult<Category> {
    let mut category = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))?;
    category.children = find_children(pool, id).await?;
    category.products = product::find_by_category(pool, id).await?;
    Ok(category)
}

/// Root categories (no parent), each with its direct children loaded
pub async fn find_roots(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let mut roots = sqlx::query_as::<_, Category>(&format!(
        "SELECT {COLUMNS} FROM categories WHERE parent_id IS NULL ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    if roots.is_empty() {
        return Ok(roots);
    }

    let root_ids: Vec<i64> = roots.iter().map(|c| c.id).collect();
    let sql = format!(
        "SELECT {COLUMNS} FROM categories WHERE parent_id IN ({}) ORDER BY name",
        placeholders(root_ids.len())
    );
    let mut query = sqlx::query_as::<_, Category>(&sql);
    for id in &root_ids {
        query = query.bind(id);
    }
    let children = query.fetch_all(pool).await?;

    for child in children {
        if let Some(root) = roots.iter_mut().find(|r| Some(r.id) == child.parent_id) {
            root.children.push(child);
        }
    }
    Ok(roots)
}

/// `{id} ∪ direct children of id`, or NotFound when the category is missing
async fn subtree_ids(pool: &SqlitePool, id: i64) -> RepoResult<Vec<i64>> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    let mut ids = vec![id];
    ids.extend(find_child_ids(pool, id).await?);
    Ok(ids)
}

/// One page of products in the category and its direct subcategories,
/// plus the total count across all pages
pub async fn find_subtree_products(
    pool: &SqlitePool,
    id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<(Vec<Product>, u64)> {
    let ids = subtree_ids(pool, id).await?;
    let in_clause = placeholders(ids.len());

    let count_sql = format!("SELECT COUNT(*) FROM products WHERE category_id IN ({in_clause})");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for id in &ids {
        count_query = count_query.bind(id);
    }
    let total = count_query.fetch_one(pool).await?;

    let page_sql = format!(
        "SELECT {} FROM products WHERE category_id IN ({in_clause}) ORDER BY id LIMIT ? OFFSET ?",
        product::COLUMNS
    );
    let mut page_query = sqlx::query_as::<_, Product>(&page_sql);
    for id in &ids {
        page_query = page_query.bind(id);
    }
    let products = page_query.bind(limit).bind(offset).fetch_all(pool).await?;

    Ok((products, total.max(0) as u64))
}

/// Mean product price over the category and its direct subcategories.
///
/// Returns `0.0` when there are no products.
pub async fn average_price(pool: &SqlitePool, id: i64) -> RepoResult<f64> {
    let ids = subtree_ids(pool, id).await?;
    let sql = format!(
        "SELECT AVG(price) FROM products WHERE category_id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_scalar::<_, Option<f64>>(&sql);
    for id in &ids {
        query = query.bind(id);
    }
    let avg = query.fetch_one(pool).await?;
    Ok(avg.unwrap_or(0.0))
}

async fn sibling_exists(
    pool: &SqlitePool,
    name: &str,
    parent_id: Option<i64>,
    exclude_id: Option<i64>,
) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM categories WHERE name = ? AND parent_id IS ? AND id IS NOT ? LIMIT 1",
    )
    .bind(name)
    .bind(parent_id)
    .bind(exclude_id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let name = data.name.trim().to_string();

    if let Some(parent_id) = data.parent_id
        && find_by_id(pool, parent_id).await?.is_none()
    {
        return Err(RepoError::Validation(format!(
            "Parent category {parent_id} does not exist"
        )));
    }
    if sibling_exists(pool, &name, data.parent_id, None).await? {
        return Err(RepoError::Duplicate(format!(
            "Category '{name}' already exists under this parent"
        )));
    }

    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO categories (name, parent_id, created_at, updated_at) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&name)
    .bind(data.parent_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

/// Reject a parent that is the category itself or one of its descendants
async fn check_parent(pool: &SqlitePool, id: i64, parent_id: i64) -> RepoResult<()> {
    if parent_id == id {
        return Err(RepoError::Validation(
            "Category cannot be its own parent".into(),
        ));
    }
    let mut cursor = Some(parent_id);
    while let Some(current) = cursor {
        let Some(ancestor) = find_by_id(pool, current).await? else {
            return Err(RepoError::Validation(format!(
                "Parent category {current} does not exist"
            )));
        };
        if ancestor.parent_id == Some(id) {
            return Err(RepoError::Validation(
                "Category cannot be moved under its own descendant".into(),
            ));
        }
        cursor = ancestor.parent_id;
    }
    Ok(())
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))?;

    let name = data
        .name
        .map(|n| n.trim().to_string())
        .unwrap_or_else(|| existing.name.clone());
    let parent_id = match data.parent_id {
        Some(new_parent) => new_parent,
        None => existing.parent_id,
    };

    if let Some(parent_id) = parent_id
        && Some(parent_id) != existing.parent_id
    {
        check_parent(pool, id, parent_id).await?;
    }
    if (name != existing.name || parent_id != existing.parent_id)
        && sibling_exists(pool, &name, parent_id, Some(id)).await?
    {
        return Err(RepoError::Duplicate(format!(
            "Category '{name}' already exists under this parent"
        )));
    }

    let rows = sqlx::query(
        "UPDATE categories SET name = ?1, parent_id = ?2, updated_at = ?3 WHERE id = ?4",
    )
    .bind(&name)
    .bind(parent_id)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }

    find_with_relations(pool, id).await
}

/// Delete a leaf category with no products
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    if find_by_id(pool, id).await?.is_none() {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }

    let children: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if children > 0 {
        return Err(RepoError::Validation(
            "Cannot delete category with subcategories".into(),
        ));
    }

    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if products > 0 {
        return Err(RepoError::Validation(
            "Cannot delete category with products".into(),
        ));
    }

    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
