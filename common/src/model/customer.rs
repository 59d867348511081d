use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A customer portal account, provisioned when an application is approved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Login identifier, e.g. `VOL_2026/48213`.
    pub customer_id: String,
    pub email: String,
    pub full_name: String,
    /// Application whose approval created this account.
    pub application_id: String,
    /// `salt$sha256hex`. Never leaves the backend.
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
