//! Money calculation utilities using rust_decimal for precision
//!
//! Prices are stored as `f64`; every sum and product goes through `Decimal`
//! and is rounded back to two decimal places (half away from zero).

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price
pub const MAX_PRICE: f64 = 1_000_000.0;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `Σ price * quantity` over `(price, quantity)` pairs
pub fn order_total<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (f64, i64)>,
{
    let total = lines
        .into_iter()
        .fold(Decimal::ZERO, |acc, (price, quantity)| {
            acc + to_decimal(price) * Decimal::from(quantity)
        });
    to_f64(total)
}

/// A price must be a finite, positive amount below [`MAX_PRICE`]
pub fn validate_price(price: f64) -> Result<(), String> {
    if !price.is_finite() {
        return Err(format!("price must be a finite number, got {price}"));
    }
    if price <= 0.0 {
        return Err(format!("price must be positive, got {price}"));
    }
    if price > MAX_PRICE {
        return Err(format!(
            "price exceeds maximum allowed ({MAX_PRICE}), got {price}"
        ));
    }
    Ok(())
}

pub fn validate_quantity(quantity: i64) -> Result<(), String> {
    if quantity < 1 {
        return Err(format!("quantity must be at least 1, got {quantity}"));
    }
    Ok(())
}
