//! Fixtures shared by the unit and route tests.

use crate::config::WorkflowSettings;
use crate::notifications::templates::{self, Variables};
use crate::notifications::{Mail, NotificationError, NotificationSender};
use crate::store::sqlite::SqliteStore;
use crate::store::{RecordStore, StoreResult, TransitionCommit};
use crate::workflow::engine::WorkflowEngine;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use common::model::agent::{Agent, ApproverContext};
use common::model::application::{Application, ApplicationRef, ApplicationStatus, Timeline};
use common::model::bank::{AssignedBank, BankRecord, QrImage};
use common::model::customer::Customer;
use common::model::notification::{DeliveryState, NotificationStage, OutboundNotification};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Keeps every mail it is asked to send.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Mail>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<Mail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, mail: &Mail) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}

/// Fails every delivery, like an unreachable relay.
pub struct FailingSender;

#[async_trait]
impl NotificationSender for FailingSender {
    async fn send(&self, _mail: &Mail) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("connection refused".to_string()))
    }
}

/// Records like `RecordingSender`, but only after holding each mail for `delay`.
pub struct SlowSender {
    pub delay: Duration,
    pub inner: RecordingSender,
}

#[async_trait]
impl NotificationSender for SlowSender {
    async fn send(&self, mail: &Mail) -> Result<(), NotificationError> {
        tokio::time::sleep(self.delay).await;
        self.inner.send(mail).await
    }
}

/// Waits for deliveries the engine spawned in the background.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Delegates to a `SqliteStore`, but applies `rival` right before the first
/// `commit_transition`, as if another request had committed in between.
pub struct RacingStore {
    pub inner: Arc<SqliteStore>,
    pub rival: Mutex<Option<TransitionCommit>>,
}

impl RecordStore for RacingStore {
    fn insert_application(&self, application: &Application) -> StoreResult<()> {
        self.inner.insert_application(application)
    }
    fn find_application(&self, reference: &ApplicationRef) -> StoreResult<Option<Application>> {
        self.inner.find_application(reference)
    }
    fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<Vec<Application>> {
        self.inner.list_applications(status)
    }
    fn delete_application(&self, id: &str) -> StoreResult<bool> {
        self.inner.delete_application(id)
    }
    fn commit_transition(&self, commit: &TransitionCommit) -> StoreResult<Option<Application>> {
        let rival = self.rival.lock().unwrap().take();
        if let Some(rival) = rival {
            self.inner.commit_transition(&rival)?;
        }
        self.inner.commit_transition(commit)
    }
    fn find_customer(&self, email: &str, full_name: &str) -> StoreResult<Option<Customer>> {
        self.inner.find_customer(email, full_name)
    }
    fn find_customer_by_id(&self, customer_id: &str) -> StoreResult<Option<Customer>> {
        self.inner.find_customer_by_id(customer_id)
    }
    fn customer_id_taken(&self, customer_id: &str) -> StoreResult<bool> {
        self.inner.customer_id_taken(customer_id)
    }
    fn insert_agent(&self, agent: &Agent) -> StoreResult<()> {
        self.inner.insert_agent(agent)
    }
    fn find_agent(&self, id: &str) -> StoreResult<Option<Agent>> {
        self.inner.find_agent(id)
    }
    fn list_agents(&self) -> StoreResult<Vec<Agent>> {
        self.inner.list_agents()
    }
    fn delete_agent(&self, id: &str) -> StoreResult<bool> {
        self.inner.delete_agent(id)
    }
    fn insert_bank_record(&self, record: &BankRecord) -> StoreResult<()> {
        self.inner.insert_bank_record(record)
    }
    fn update_bank_record(&self, record: &BankRecord) -> StoreResult<bool> {
        self.inner.update_bank_record(record)
    }
    fn delete_bank_record(&self, id: &str) -> StoreResult<bool> {
        self.inner.delete_bank_record(id)
    }
    fn find_bank_record(&self, id: &str) -> StoreResult<Option<BankRecord>> {
        self.inner.find_bank_record(id)
    }
    fn list_bank_records(&self) -> StoreResult<Vec<BankRecord>> {
        self.inner.list_bank_records()
    }
    fn insert_assigned_bank(&self, assigned: &AssignedBank) -> StoreResult<()> {
        self.inner.insert_assigned_bank(assigned)
    }
    fn assigned_banks(&self, customer_email: &str) -> StoreResult<Vec<AssignedBank>> {
        self.inner.assigned_banks(customer_email)
    }
    fn insert_qr_image(&self, image: &QrImage) -> StoreResult<()> {
        self.inner.insert_qr_image(image)
    }
    fn latest_qr_image(&self) -> StoreResult<Option<QrImage>> {
        self.inner.latest_qr_image()
    }
    fn enqueue_notification(&self, notification: &OutboundNotification) -> StoreResult<()> {
        self.inner.enqueue_notification(notification)
    }
    fn find_notification(&self, id: &str) -> StoreResult<Option<OutboundNotification>> {
        self.inner.find_notification(id)
    }
    fn list_notifications(
        &self,
        state: Option<DeliveryState>,
    ) -> StoreResult<Vec<OutboundNotification>> {
        self.inner.list_notifications(state)
    }
    fn due_notifications(
        &self,
        max_attempts: u32,
        limit: usize,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<Vec<OutboundNotification>> {
        self.inner.due_notifications(max_attempts, limit, stale_before)
    }
    fn claim_notification(
        &self,
        id: &str,
        at: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.inner.claim_notification(id, at, stale_before)
    }
    fn record_delivery(
        &self,
        id: &str,
        error: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.inner.record_delivery(id, error, at)
    }
}

pub fn engine_with(sender: Arc<dyn NotificationSender>) -> (WorkflowEngine, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let engine = WorkflowEngine::new(store.clone(), sender, WorkflowSettings::default());
    (engine, store)
}

pub fn approver() -> ApproverContext {
    ApproverContext {
        name: "Ravi Agent".to_string(),
        email: "ravi@franchise.example".to_string(),
        phone: Some("+91 90000 00001".to_string()),
    }
}

pub fn sample_application(email: &str, full_name: &str) -> Application {
    Application {
        id: Uuid::new_v4().to_string(),
        email: email.to_string(),
        full_name: full_name.to_string(),
        phone: None,
        profile: serde_json::json!({ "city": "Pune" }),
        status: ApplicationStatus::Pending,
        reviewed_by: None,
        timeline: Timeline::submitted(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()),
    }
}

pub fn sample_notification(application: &Application) -> OutboundNotification {
    let mut variables = Variables::new();
    variables.insert("name", application.full_name.clone());
    variables.insert("application_id", application.id.clone());
    templates::render(
        NotificationStage::Submitted,
        Some(&application.id),
        &application.email,
        &variables,
        application.timeline.submitted_at,
    )
}
