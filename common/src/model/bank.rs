use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reusable bank account or UPI target maintained by admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    pub id: String,
    pub holder_name: String,
    /// Unique across all bank records.
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
    pub branch_name: Option<String>,
    pub upi_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payment instructions bound to one customer email.
///
/// Either the bank fields are copied from a `BankRecord` at assignment time, or only
/// `qr_image_id` is set. Rows are append-only; the newest one is the current one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedBank {
    pub id: String,
    pub customer_email: String,
    pub bank_record_id: Option<String>,
    pub holder_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc: Option<String>,
    pub bank_name: Option<String>,
    pub branch_name: Option<String>,
    pub upi_id: Option<String>,
    pub qr_image_id: Option<String>,
    pub assigned_at: DateTime<Utc>,
}

/// What to assign to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BankSelection {
    /// One assignment row per listed bank record.
    Records { bank_ids: Vec<String> },
    /// A single assignment pointing at the most recently uploaded QR code.
    CurrentQr,
}

/// An uploaded payment QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrImage {
    pub id: String,
    pub content_type: String,
    /// Hex MD5 of the raw image bytes.
    pub md5: String,
    pub base64: String,
    pub uploaded_at: DateTime<Utc>,
}
