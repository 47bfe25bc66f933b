//! Input validation helpers
//!
//! Centralized text length limits. Checks run in handlers so that invalid
//! input is rejected before any store access. SQLite TEXT has no built-in
//! length enforcement.

use shared::error::{AppError, ErrorCode};
use shared::models::{
    CategoryCreate, CategoryUpdate, CustomerUpdate, OrderItemInput, ProductCreate, ProductUpdate,
};

use crate::utils::money;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, customer first/last name
pub const MAX_NAME_LEN: usize = 200;

/// Product descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Short identifiers: SKU, phone
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Field helpers ───────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")).with_detail("field", field));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<(), AppError> {
    money::validate_price(price)
        .map_err(|msg| AppError::with_message(ErrorCode::ProductInvalidPrice, msg))
}

// ── Payload validators ──────────────────────────────────────────────

pub fn validate_category_create(data: &CategoryCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)
}

pub fn validate_category_update(data: &CategoryUpdate) -> Result<(), AppError> {
    if let Some(ref name) = data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    Ok(())
}

pub fn validate_product_create(data: &ProductCreate) -> Result<(), AppError> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_price(data.price)
}

pub fn validate_product_update(data: &ProductUpdate) -> Result<(), AppError> {
    if let Some(ref name) = data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(ref sku) = data.sku {
        validate_required_text(sku, "sku", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;
    if let Some(price) = data.price {
        validate_price(price)?;
    }
    Ok(())
}

pub fn validate_customer_update(data: &CustomerUpdate) -> Result<(), AppError> {
    if let Some(ref first_name) = data.first_name {
        validate_required_text(first_name, "first_name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&data.last_name, "last_name", MAX_NAME_LEN)?;
    validate_optional_text(&data.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.address, "address", MAX_ADDRESS_LEN)
}

pub fn validate_order_items(items: &[OrderItemInput]) -> Result<(), AppError> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    for (idx, item) in items.iter().enumerate() {
        money::validate_quantity(item.quantity).map_err(|msg| {
            AppError::with_message(ErrorCode::OrderInvalidQuantity, msg)
                .with_detail("index", idx)
                .with_detail("product_id", item.product_id)
        })?;
    }
    Ok(())
}
