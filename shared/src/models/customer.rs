//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity
///
/// Customers are created on first login from the identity provider's claims
/// and matched on later logins by `oauth_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Subject identifier issued by the identity provider
    #[serde(skip_serializing, default)]
    pub oauth_id: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Customer {
    pub fn full_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

/// Create customer payload (built from identity claims)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub oauth_id: String,
}

/// Profile update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
