//! # Record Store
//!
//! Persistence for every entity the backend owns: applications, customers, agents,
//! bank records and their assignments, QR codes, and the notification outbox.
//!
//! The workflow engine and the HTTP services only talk to the `RecordStore` trait.
//! `sqlite::SqliteStore` is the implementation used in production and in tests
//! (with an in-memory database).
//!
//! Status changes go through `commit_transition`, a compare-and-swap on the status
//! that was read. The status update, the provisioned customer and the queued
//! notification are written in one database transaction, or not at all.

mod schema;
pub mod sqlite;

use chrono::{DateTime, Utc};
use common::model::agent::Agent;
use common::model::application::{Application, ApplicationRef, ApplicationStatus};
use common::model::bank::{AssignedBank, BankRecord, QrImage};
use common::model::customer::Customer;
use common::model::notification::{DeliveryState, OutboundNotification};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    /// A stored value could not be mapped back to the model.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    /// A generated key kept colliding with existing rows.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database connection lock poisoned")]
    Poisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything one transition writes.
#[derive(Debug, Clone)]
pub struct TransitionCommit {
    pub application_id: String,
    /// The status the caller read. The update only applies if it is still current.
    pub expected: ApplicationStatus,
    pub next: ApplicationStatus,
    pub at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub provision: Option<Customer>,
    pub notification: Option<OutboundNotification>,
}

pub trait RecordStore: Send + Sync {
    // Applications

    fn insert_application(&self, application: &Application) -> StoreResult<()>;
    fn find_application(&self, reference: &ApplicationRef) -> StoreResult<Option<Application>>;
    fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<Vec<Application>>;
    fn delete_application(&self, id: &str) -> StoreResult<bool>;

    /// Applies a transition atomically.
    ///
    /// Returns `None` without writing anything when the application no longer has
    /// `commit.expected` as its status (or no longer exists).
    fn commit_transition(&self, commit: &TransitionCommit) -> StoreResult<Option<Application>>;

    // Customers

    fn find_customer(&self, email: &str, full_name: &str) -> StoreResult<Option<Customer>>;
    fn find_customer_by_id(&self, customer_id: &str) -> StoreResult<Option<Customer>>;
    fn customer_id_taken(&self, customer_id: &str) -> StoreResult<bool>;

    // Agents

    fn insert_agent(&self, agent: &Agent) -> StoreResult<()>;
    fn find_agent(&self, id: &str) -> StoreResult<Option<Agent>>;
    fn list_agents(&self) -> StoreResult<Vec<Agent>>;
    fn delete_agent(&self, id: &str) -> StoreResult<bool>;

    // Bank records and assignments

    fn insert_bank_record(&self, record: &BankRecord) -> StoreResult<()>;
    fn update_bank_record(&self, record: &BankRecord) -> StoreResult<bool>;
    fn delete_bank_record(&self, id: &str) -> StoreResult<bool>;
    fn find_bank_record(&self, id: &str) -> StoreResult<Option<BankRecord>>;
    fn list_bank_records(&self) -> StoreResult<Vec<BankRecord>>;
    fn insert_assigned_bank(&self, assigned: &AssignedBank) -> StoreResult<()>;
    /// Assignments for one customer email, newest first.
    fn assigned_banks(&self, customer_email: &str) -> StoreResult<Vec<AssignedBank>>;
    fn insert_qr_image(&self, image: &QrImage) -> StoreResult<()>;
    fn latest_qr_image(&self) -> StoreResult<Option<QrImage>>;

    // Notification outbox

    fn enqueue_notification(&self, notification: &OutboundNotification) -> StoreResult<()>;
    fn find_notification(&self, id: &str) -> StoreResult<Option<OutboundNotification>>;
    fn list_notifications(
        &self,
        state: Option<DeliveryState>,
    ) -> StoreResult<Vec<OutboundNotification>>;
    /// Undelivered notifications with fewer than `max_attempts` attempts, oldest first.
    ///
    /// A `sending` row counts as undelivered only once its claim is older than
    /// `stale_before`.
    fn due_notifications(
        &self,
        max_attempts: u32,
        limit: usize,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<Vec<OutboundNotification>>;
    /// Moves a `pending`, `failed` or stale `sending` row to `sending`.
    ///
    /// Returns `false` when another sender holds the row or it was already sent.
    fn claim_notification(
        &self,
        id: &str,
        at: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<bool>;
    /// Records one delivery attempt. `error` is `None` on success.
    fn record_delivery(&self, id: &str, error: Option<&str>, at: DateTime<Utc>)
        -> StoreResult<()>;
}
