//! Business services layered over the repositories

pub mod error;
pub mod orders;

pub use error::{ServiceError, ServiceResult};
pub use orders::OrderService;
