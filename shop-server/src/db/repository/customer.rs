//! Customer Repository

use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use shared::util::now_millis;
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, first_name, last_name, email, phone, address, oauth_id, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customers WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

pub async fn find_by_oauth_id(pool: &SqlitePool, oauth_id: &str) -> RepoResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
        "SELECT {COLUMNS} FROM customers WHERE oauth_id = ?"
    ))
    .bind(oauth_id)
    .fetch_optional(pool)
    .await?;
    Ok(customer)
}

pub async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let found = sqlx::query_scalar::<_, i64>("SELECT id FROM customers WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub async fn create(pool: &SqlitePool, data: CustomerCreate) -> RepoResult<Customer> {
    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customers (first_name, last_name, email, oauth_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.oauth_id)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

/// Look up a customer by identity subject, creating one on first login
pub async fn find_or_create(pool: &SqlitePool, data: CustomerCreate) -> RepoResult<Customer> {
    if let Some(existing) = find_by_oauth_id(pool, &data.oauth_id).await? {
        return Ok(existing);
    }
    let oauth_id = data.oauth_id.clone();
    match create(pool, data).await {
        Ok(customer) => Ok(customer),
        // a concurrent first login for the same subject won the insert
        Err(RepoError::Duplicate(msg)) => find_by_oauth_id(pool, &oauth_id)
            .await?
            .ok_or(RepoError::Duplicate(msg)),
        Err(e) => Err(e),
    }
}

pub async fn update(pool: &SqlitePool, id: i64, data: CustomerUpdate) -> RepoResult<Customer> {
    let rows = sqlx::query(
        "UPDATE customers SET first_name = COALESCE(?1, first_name), last_name = COALESCE(?2, last_name), \
         phone = COALESCE(?3, phone), address = COALESCE(?4, address), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.first_name)
    .bind(data.last_name)
    .bind(data.phone)
    .bind(data.address)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}
