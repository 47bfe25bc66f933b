//! Data models
//!
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY). Money is carried as
//! `f64` with two decimal places; arithmetic happens server-side in decimal.

pub mod category;
pub mod customer;
pub mod order;
pub mod product;

pub use category::*;
pub use customer::*;
pub use order::*;
pub use product::*;

use serde::{Deserialize, Deserializer};

/// Distinguish an absent field from an explicit `null`.
///
/// Used with `#[serde(default)]` on `Option<Option<T>>` so that
/// `{}` leaves a field untouched while `{"field": null}` clears it.
pub(crate) fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
