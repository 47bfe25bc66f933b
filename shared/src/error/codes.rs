//! Error codes for the storefront API
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Customer errors
//! - 4xxx: Order errors
//! - 6xxx: Product and category errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Codes travel as plain u16 values so clients can switch on them without
/// parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// OAuth state parameter did not match the cookie
    OAuthStateMismatch = 1008,
    /// OAuth callback carried no authorization code
    OAuthCodeMissing = 1009,

    // ==================== 3xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 3001,
    /// Email already registered to another customer
    CustomerEmailExists = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no items
    OrderEmpty = 4007,
    /// Order item quantity is not positive
    OrderInvalidQuantity = 4008,
    /// Unknown order status
    OrderInvalidStatus = 4009,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product price is not positive
    ProductInvalidPrice = 6002,
    /// SKU already used by another product
    ProductSkuExists = 6004,
    /// Product references a missing category
    ProductCategoryInvalid = 6005,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category still has products
    CategoryHasProducts = 6102,
    /// Sibling category with the same name exists
    CategoryNameExists = 6103,
    /// Category still has subcategories
    CategoryHasChildren = 6104,
    /// Parent category is missing or would create a cycle
    CategoryInvalidParent = 6105,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
    /// Network error
    NetworkError = 9004,
    /// External service failed
    UpstreamError = 9005,
    /// Operation timed out
    TimeoutError = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Not authenticated",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Token is invalid",
            ErrorCode::OAuthStateMismatch => "Invalid OAuth state",
            ErrorCode::OAuthCodeMissing => "Authorization code not provided",

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerEmailExists => "Email is already registered",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::OrderInvalidQuantity => "Quantity must be at least 1",
            ErrorCode::OrderInvalidStatus => "Unknown order status",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Price must be positive",
            ErrorCode::ProductSkuExists => "SKU already exists",
            ErrorCode::ProductCategoryInvalid => "Product category does not exist",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryHasProducts => "Category has products",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::CategoryHasChildren => "Category has subcategories",
            ErrorCode::CategoryInvalidParent => "Invalid parent category",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::UpstreamError => "External service error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1008 => Ok(ErrorCode::OAuthStateMismatch),
            1009 => Ok(ErrorCode::OAuthCodeMissing),

            // Customer
            3001 => Ok(ErrorCode::CustomerNotFound),
            3002 => Ok(ErrorCode::CustomerEmailExists),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidQuantity),
            4009 => Ok(ErrorCode::OrderInvalidStatus),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6004 => Ok(ErrorCode::ProductSkuExists),
            6005 => Ok(ErrorCode::ProductCategoryInvalid),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryHasProducts),
            6103 => Ok(ErrorCode::CategoryNameExists),
            6104 => Ok(ErrorCode::CategoryHasChildren),
            6105 => Ok(ErrorCode::CategoryInvalidParent),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),
            9004 => Ok(ErrorCode::NetworkError),
            9005 => Ok(ErrorCode::UpstreamError),
            9006 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::CustomerNotFound.code(), 3001);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::ProductSkuExists.code(), 6004);
        assert_eq!(ErrorCode::CategoryInvalidParent.code(), 6105);
        assert_eq!(ErrorCode::UpstreamError.code(), 9005);
    }

    #[test]
    fn test_try_from_round_trips_every_code() {
        let all = [
            ErrorCode::Success,
            ErrorCode::Unknown,
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::InvalidRequest,
            ErrorCode::InvalidFormat,
            ErrorCode::RequiredField,
            ErrorCode::ValueOutOfRange,
            ErrorCode::NotAuthenticated,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::OAuthStateMismatch,
            ErrorCode::OAuthCodeMissing,
            ErrorCode::CustomerNotFound,
            ErrorCode::CustomerEmailExists,
            ErrorCode::OrderNotFound,
            ErrorCode::OrderEmpty,
            ErrorCode::OrderInvalidQuantity,
            ErrorCode::OrderInvalidStatus,
            ErrorCode::ProductNotFound,
            ErrorCode::ProductInvalidPrice,
            ErrorCode::ProductSkuExists,
            ErrorCode::ProductCategoryInvalid,
            ErrorCode::CategoryNotFound,
            ErrorCode::CategoryHasProducts,
            ErrorCode::CategoryNameExists,
            ErrorCode::CategoryHasChildren,
            ErrorCode::CategoryInvalidParent,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
            ErrorCode::ConfigError,
            ErrorCode::NetworkError,
            ErrorCode::UpstreamError,
            ErrorCode::TimeoutError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(2001), Err(InvalidErrorCode(2001)));
        assert_eq!(ErrorCode::try_from(65535), Err(InvalidErrorCode(65535)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("6101").unwrap();
        assert_eq!(code, ErrorCode::CategoryNotFound);
        assert!(serde_json::from_str::<ErrorCode>("7777").is_err());
    }
}
