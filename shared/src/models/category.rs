//! Category Model

use super::Product;
use serde::{Deserialize, Serialize};

/// Category entity
///
/// Categories form a forest through `parent_id`. `children` and `products`
/// hold one level only and are filled by the store on single-category reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub children: Vec<Category>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Create category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub parent_id: Option<i64>,
}

/// Update category payload
///
/// `parent_id` absent keeps the parent, `null` moves the category to the root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::explicit_null")]
    pub parent_id: Option<Option<i64>>,
}

/// Average price over a category and its direct subcategories
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AveragePrice {
    pub average_price: f64,
}
