//! Order assembly
//!
//! `create_order` prices every line from the current catalog, persists the
//! order and its items in one transaction, and only then notifies. Unit
//! prices are copied into the items, so later catalog edits never change a
//! placed order.

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderItemInput, OrderStatus};
use shared::response::{PageQuery, PaginatedResponse};
use sqlx::SqlitePool;

use super::{ServiceError, ServiceResult};
use crate::db::repository::{RepoError, customer, order, product};
use crate::notify::Notifier;
use crate::utils::{money, validation};

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    notifier: Arc<dyn Notifier>,
}

impl OrderService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// Place an order for `customer_id`
    ///
    /// Fails with `CustomerNotFound` or `ProductNotFound` before anything is
    /// written. A notification failure is logged and does not fail the call.
    pub async fn create_order(
        &self,
        customer_id: i64,
        items: &[OrderItemInput],
    ) -> ServiceResult<Order> {
        validation::validate_order_items(items)?;

        if !customer::exists(&self.pool, customer_id).await? {
            return Err(AppError::new(ErrorCode::CustomerNotFound)
                .with_detail("customer_id", customer_id)
                .into());
        }

        let mut tx = self.pool.begin().await?;

        let mut priced = Vec::with_capacity(items.len());
        for item in items {
            let Some(price) = product::find_price(&mut *tx, item.product_id).await? else {
                // tx dropped here, rolled back
                return Err(AppError::with_message(
                    ErrorCode::ProductNotFound,
                    format!("Product {} not found", item.product_id),
                )
                .with_detail("product_id", item.product_id)
                .into());
            };
            priced.push(order::NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price,
            });
        }

        let total = money::order_total(priced.iter().map(|i| (i.price, i.quantity)));
        let order_id = order::insert(&mut tx, customer_id, total, &priced).await?;
        tx.commit().await?;

        tracing::info!(order_id, customer_id, total, items = priced.len(), "Order created");

        let order = self.reload(order_id).await?;
        if let Err(e) = self.notifier.send_order_confirmation(&order).await {
            tracing::warn!(order_id, error = %e, "Order confirmation notification failed");
        }
        Ok(order)
    }

    /// Overwrite an order's status
    ///
    /// No transition rules apply; concurrent updates are last-write-wins.
    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> ServiceResult<Order> {
        order::update_status(&self.pool, order_id, status)
            .await
            .map_err(|e| match e {
                RepoError::NotFound(_) => order_not_found(order_id),
                other => other.into(),
            })?;

        tracing::info!(order_id, status = %status, "Order status updated");

        let order = self.reload(order_id).await?;
        if let Err(e) = self.notifier.send_status_update(&order).await {
            tracing::warn!(order_id, error = %e, "Status update notification failed");
        }
        Ok(order)
    }

    /// An order owned by `customer_id`; other customers' orders are
    /// reported as not found
    pub async fn get_order(&self, customer_id: i64, order_id: i64) -> ServiceResult<Order> {
        order::find_for_customer(&self.pool, customer_id, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }

    pub async fn list_orders(
        &self,
        customer_id: i64,
        query: PageQuery,
    ) -> ServiceResult<PaginatedResponse<Order>> {
        let items = order::find_page_for_customer(
            &self.pool,
            customer_id,
            i64::from(query.limit()),
            query.offset(),
        )
        .await?;
        let total = order::count_for_customer(&self.pool, customer_id).await?;
        Ok(PaginatedResponse::new(items, query, total))
    }

    async fn reload(&self, order_id: i64) -> ServiceResult<Order> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| order_not_found(order_id))
    }
}

fn order_not_found(order_id: i64) -> ServiceError {
    AppError::new(ErrorCode::OrderNotFound)
        .with_detail("order_id", order_id)
        .into()
}
