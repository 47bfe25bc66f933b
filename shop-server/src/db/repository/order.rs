//! Order Repository
//!
//! Orders are written once with all their items inside a caller-owned
//! transaction. Reads return the hydrated aggregate: items with their
//! products, and the owning customer.

use std::collections::HashMap;

use super::{RepoError, RepoResult, customer, placeholders, product};
use shared::models::{Order, OrderItem, OrderStatus, Product};
use shared::util::now_millis;
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, customer_id, status, total, created_at, updated_at";

/// A priced line ready to be persisted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: f64,
}

/// Insert an order and its items on the given connection.
///
/// Run this inside a transaction; nothing here commits.
pub async fn insert(
    conn: &mut SqliteConnection,
    customer_id: i64,
    total: f64,
    items: &[NewOrderItem],
) -> RepoResult<i64> {
    let now = now_millis();
    let order_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO orders (customer_id, status, total, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(customer_id)
    .bind(OrderStatus::Pending)
    .bind(total)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *conn)
        .await?;
    }

    Ok(order_id)
}

/// Hydrated order by id, regardless of owner
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match order {
        Some(order) => Ok(Some(hydrate_one(pool, order).await?)),
        None => Ok(None),
    }
}

/// Hydrated order by id, only when owned by `customer_id`
pub async fn find_for_customer(
    pool: &SqlitePool,
    customer_id: i64,
    id: i64,
) -> RepoResult<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE id = ? AND customer_id = ?"
    ))
    .bind(id)
    .bind(customer_id)
    .fetch_optional(pool)
    .await?;
    match order {
        Some(order) => Ok(Some(hydrate_one(pool, order).await?)),
        None => Ok(None),
    }
}

/// One page of a customer's orders, newest first, items hydrated
pub async fn find_page_for_customer(
    pool: &SqlitePool,
    customer_id: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Order>> {
    let mut orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE customer_id = ? ORDER BY id DESC LIMIT ? OFFSET ?"
    ))
    .bind(customer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    attach_items(pool, &mut orders).await?;
    Ok(orders)
}

pub async fn count_for_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<u64> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = ?")
        .bind(customer_id)
        .fetch_one(pool)
        .await?;
    Ok(total.max(0) as u64)
}

/// Overwrite the status unconditionally
pub async fn update_status(pool: &SqlitePool, id: i64, status: OrderStatus) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

async fn hydrate_one(pool: &SqlitePool, order: Order) -> RepoResult<Order> {
    let mut orders = vec![order];
    attach_items(pool, &mut orders).await?;
    let mut order = orders.remove(0);
    order.customer = customer::find_by_id(pool, order.customer_id).await?;
    Ok(order)
}

async fn attach_items(pool: &SqlitePool, orders: &mut [Order]) -> RepoResult<()> {
    if orders.is_empty() {
        return Ok(());
    }

    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let sql = format!(
        "SELECT id, order_id, product_id, quantity, price FROM order_items \
         WHERE order_id IN ({}) ORDER BY id",
        placeholders(order_ids.len())
    );
    let mut query = sqlx::query_as::<_, OrderItem>(&sql);
    for id in &order_ids {
        query = query.bind(id);
    }
    let mut items = query.fetch_all(pool).await?;

    let mut product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let products = find_products(pool, &product_ids).await?;
    for item in &mut items {
        item.product = products.get(&item.product_id).cloned();
    }

    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    for order in orders.iter_mut() {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(())
}

async fn find_products(pool: &SqlitePool, ids: &[i64]) -> RepoResult<HashMap<i64, Product>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let sql = format!(
        "SELECT {} FROM products WHERE id IN ({})",
        product::COLUMNS,
        placeholders(ids.len())
    );
    let mut query = sqlx::query_as::<_, Product>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let products = query.fetch_all(pool).await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::{
        seed_category, seed_customer, seed_product, test_pool,
    };

    async fn place(pool: &SqlitePool, customer_id: i64, items: &[NewOrderItem], total: f64) -> i64 {
        let mut tx = pool.begin().await.unwrap();
        let id = insert(&mut tx, customer_id, total, items).await.unwrap();
        tx.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_insert_and_hydrate() {
        let pool = test_pool().await;
        let customer = seed_customer(&pool, "sub-1").await;
        let cat = seed_category(&pool, "Cat", None).await;
        let a = seed_product(&pool, "A", 5.0, cat).await;
        let b = seed_product(&pool, "B", 3.0, cat).await;

        let id = place(
            &pool,
            customer,
            &[
                NewOrderItem { product_id: a, quantity: 2, price: 5.0 },
                NewOrderItem { product_id: b, quantity: 1, price: 3.0 },
            ],
            13.0,
        )
        .await;

        let order = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, 13.0);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].product.as_ref().unwrap().sku, "A");
        assert_eq!(order.customer.as_ref().unwrap().id, customer);
    }

    #[tokio::test]
    async fn test_rollback_leaves_nothing() {
        let pool = test_pool().await;
        let customer = seed_customer(&pool, "sub-1").await;
        let cat = seed_category(&pool, "Cat", None).await;
        let a = seed_product(&pool, "A", 5.0, cat).await;

        {
            let mut tx = pool.begin().await.unwrap();
            insert(
                &mut tx,
                customer,
                5.0,
                &[NewOrderItem { product_id: a, quantity: 1, price: 5.0 }],
            )
            .await
            .unwrap();
            // dropped without commit
        }

        assert_eq!(count_for_customer(&pool, customer).await.unwrap(), 0);
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(items, 0);
    }

    #[tokio::test]
    async fn test_find_for_customer_checks_owner() {
        let pool = test_pool().await;
        let alice = seed_customer(&pool, "alice").await;
        let bob = seed_customer(&pool, "bob").await;
        let cat = seed_category(&pool, "Cat", None).await;
        let a = seed_product(&pool, "A", 1.0, cat).await;
        let id = place(
            &pool,
            bob,
            &[NewOrderItem { product_id: a, quantity: 1, price: 1.0 }],
            1.0,
        )
        .await;

        assert!(find_for_customer(&pool, alice, id).await.unwrap().is_none());
        assert!(find_for_customer(&pool, bob, id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_page_for_customer() {
        let pool = test_pool().await;
        let alice = seed_customer(&pool, "alice").await;
        let bob = seed_customer(&pool, "bob").await;
        let cat = seed_category(&pool, "Cat", None).await;
        let a = seed_product(&pool, "A", 1.0, cat).await;
        let line = [NewOrderItem { product_id: a, quantity: 1, price: 1.0 }];
        for _ in 0..3 {
            place(&pool, alice, &line, 1.0).await;
        }
        place(&pool, bob, &line, 1.0).await;

        assert_eq!(count_for_customer(&pool, alice).await.unwrap(), 3);
        let page = find_page_for_customer(&pool, alice, 2, 0).await.unwrap();
        assert_eq!(page.len(), 2);
        assert!(page[0].id > page[1].id);
        assert!(page.iter().all(|o| o.items.len() == 1));
    }

    #[tokio::test]
    async fn test_update_status_unconditional() {
        let pool = test_pool().await;
        let customer = seed_customer(&pool, "sub-1").await;
        let cat = seed_category(&pool, "Cat", None).await;
        let a = seed_product(&pool, "A", 1.0, cat).await;
        let id = place(
            &pool,
            customer,
            &[NewOrderItem { product_id: a, quantity: 1, price: 1.0 }],
            1.0,
        )
        .await;

        update_status(&pool, id, OrderStatus::Cancelled).await.unwrap();
        update_status(&pool, id, OrderStatus::Completed).await.unwrap();
        update_status(&pool, id, OrderStatus::Pending).await.unwrap();
        let order = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);

        let err = update_status(&pool, 999, OrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
