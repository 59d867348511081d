use super::credentials;
use super::state::Transition;
use crate::config::WorkflowSettings;
use crate::error::WorkflowError;
use crate::notifications::outbox;
use crate::notifications::templates::{self, Variables};
use crate::notifications::NotificationSender;
use crate::store::{RecordStore, StoreError, TransitionCommit};
use chrono::{DateTime, Datelike, Utc};
use common::model::agent::ApproverContext;
use common::model::application::{Application, ApplicationRef, ApplicationStatus, Timeline};
use common::model::bank::{AssignedBank, BankSelection};
use common::model::customer::Customer;
use common::model::notification::{NotificationStage, OutboundNotification};
use common::requests::SubmitApplicationRequest;
use log::{debug, error, info};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|e| panic!("email regex: {e}"))
    })
}

pub fn validate_email(email: &str) -> Result<&str, WorkflowError> {
    let email = email.trim();
    if email_pattern().is_match(email) {
        Ok(email)
    } else {
        Err(WorkflowError::InvalidInput(format!(
            "'{}' is not a valid email address",
            email
        )))
    }
}

/// Drives applications through their lifecycle.
///
/// Every transition reads the application, checks the guard, then hands the status
/// change, any provisioned customer and the queued notification to the store as one
/// compare-and-swap commit. Delivery is attempted only after the commit and its
/// outcome never changes the result of the transition.
pub struct WorkflowEngine {
    store: Arc<dyn RecordStore>,
    sender: Arc<dyn NotificationSender>,
    settings: WorkflowSettings,
}

impl WorkflowEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sender: Arc<dyn NotificationSender>,
        settings: WorkflowSettings,
    ) -> Self {
        WorkflowEngine {
            store,
            sender,
            settings,
        }
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn sender(&self) -> &dyn NotificationSender {
        self.sender.as_ref()
    }

    /// Records a new application in `pending` and acknowledges it by mail.
    pub async fn submit(
        &self,
        request: SubmitApplicationRequest,
    ) -> Result<Application, WorkflowError> {
        let email = validate_email(&request.email)?.to_string();
        let full_name = request.full_name.trim().to_string();
        if full_name.is_empty() {
            return Err(WorkflowError::InvalidInput(
                "full name must not be empty".to_string(),
            ));
        }

        let applicant = ApplicationRef::Applicant {
            email: email.clone(),
            full_name: full_name.clone(),
        };
        if self.store.find_application(&applicant)?.is_some() {
            return Err(WorkflowError::InvalidInput(format!(
                "an application for {} <{}> already exists",
                full_name, email
            )));
        }

        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4().to_string(),
            email,
            full_name,
            phone: request
                .phone
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            profile: if request.profile.is_null() {
                serde_json::json!({})
            } else {
                request.profile
            },
            status: ApplicationStatus::Pending,
            reviewed_by: None,
            timeline: Timeline::submitted(now),
        };
        self.store.insert_application(&application)?;
        info!(
            "Application {} submitted by {}",
            application.id, application.email
        );

        let mut variables = Variables::new();
        variables.insert("name", application.full_name.clone());
        variables.insert("application_id", application.id.clone());
        let notification = templates::render(
            NotificationStage::Submitted,
            Some(&application.id),
            &application.email,
            &variables,
            now,
        );
        match self.store.enqueue_notification(&notification) {
            Ok(()) => self.dispatch(notification),
            Err(e) => error!(
                "Could not queue the acknowledgement for application {}: {}",
                application.id, e
            ),
        }

        Ok(application)
    }

    /// `pending` → `approved`, provisioning the customer portal account.
    pub async fn approve(
        &self,
        reference: &ApplicationRef,
        approver: &ApproverContext,
    ) -> Result<Application, WorkflowError> {
        self.run(Transition::Approve, reference, Some(approver))
            .await
    }

    /// `approved` → `agreement`.
    pub async fn initiate_agreement(
        &self,
        reference: &ApplicationRef,
        approver: &ApproverContext,
    ) -> Result<Application, WorkflowError> {
        self.run(Transition::InitiateAgreement, reference, Some(approver))
            .await
    }

    /// `agreement` → `one-time-fee`.
    pub async fn initiate_one_time_fee(
        &self,
        reference: &ApplicationRef,
        approver: &ApproverContext,
    ) -> Result<Application, WorkflowError> {
        self.run(Transition::InitiateOneTimeFee, reference, Some(approver))
            .await
    }

    /// Any non-terminal stage before the one-time fee → `rejected`. Sends no mail.
    pub async fn reject(
        &self,
        reference: &ApplicationRef,
        approver: Option<&ApproverContext>,
    ) -> Result<Application, WorkflowError> {
        self.run(Transition::Reject, reference, approver).await
    }

    /// Appends payment instructions for a customer.
    ///
    /// Bank ids are all resolved before the first row is written, so an unknown id
    /// leaves nothing behind. A storage failure part way through the inserts is
    /// reported without undoing the rows already written.
    pub fn assign_bank(
        &self,
        customer_email: &str,
        selection: &BankSelection,
    ) -> Result<Vec<AssignedBank>, WorkflowError> {
        let email = validate_email(customer_email)?;
        let now = Utc::now();

        let rows = match selection {
            BankSelection::Records { bank_ids } => {
                if bank_ids.is_empty() {
                    return Err(WorkflowError::InvalidInput(
                        "select at least one bank record".to_string(),
                    ));
                }
                let mut rows = Vec::with_capacity(bank_ids.len());
                for id in bank_ids {
                    let record = self
                        .store
                        .find_bank_record(id)?
                        .ok_or_else(|| WorkflowError::NotFound(format!("bank record {}", id)))?;
                    rows.push(AssignedBank {
                        id: Uuid::new_v4().to_string(),
                        customer_email: email.to_string(),
                        bank_record_id: Some(record.id),
                        holder_name: Some(record.holder_name),
                        account_number: Some(record.account_number),
                        ifsc: Some(record.ifsc),
                        bank_name: Some(record.bank_name),
                        branch_name: record.branch_name,
                        upi_id: record.upi_id,
                        qr_image_id: None,
                        assigned_at: now,
                    });
                }
                rows
            }
            BankSelection::CurrentQr => {
                let qr = self
                    .store
                    .latest_qr_image()?
                    .ok_or_else(|| WorkflowError::NotFound("uploaded QR code".to_string()))?;
                vec![AssignedBank {
                    id: Uuid::new_v4().to_string(),
                    customer_email: email.to_string(),
                    bank_record_id: None,
                    holder_name: None,
                    account_number: None,
                    ifsc: None,
                    bank_name: None,
                    branch_name: None,
                    upi_id: None,
                    qr_image_id: Some(qr.id),
                    assigned_at: now,
                }]
            }
        };

        for row in &rows {
            self.store.insert_assigned_bank(row)?;
        }
        info!("Assigned {} payment target(s) to {}", rows.len(), email);
        Ok(rows)
    }

    /// Checks portal credentials. Unknown ids and wrong passwords look the same.
    pub fn authenticate_customer(
        &self,
        customer_id: &str,
        password: &str,
    ) -> Result<Customer, WorkflowError> {
        match self.store.find_customer_by_id(customer_id.trim())? {
            Some(customer) if credentials::verify_password(&customer.password_hash, password) => {
                Ok(customer)
            }
            _ => Err(WorkflowError::NotFound(
                "customer with these credentials".to_string(),
            )),
        }
    }

    /// Builds the approver from a stored agent, or validates the inline one.
    pub fn resolve_approver(
        &self,
        inline: Option<ApproverContext>,
        agent_id: Option<&str>,
    ) -> Result<ApproverContext, WorkflowError> {
        if let Some(agent_id) = agent_id {
            let agent = self
                .store
                .find_agent(agent_id)?
                .ok_or_else(|| WorkflowError::NotFound(format!("agent {}", agent_id)))?;
            return Ok(ApproverContext::from(&agent));
        }
        match inline {
            Some(approver) if !approver.name.trim().is_empty() => Ok(approver),
            _ => Err(WorkflowError::InvalidInput(
                "an approver or agent_id is required".to_string(),
            )),
        }
    }

    async fn run(
        &self,
        transition: Transition,
        reference: &ApplicationRef,
        approver: Option<&ApproverContext>,
    ) -> Result<Application, WorkflowError> {
        let application = self.load(reference)?;
        transition.guard(application.status)?;
        let now = Utc::now();

        let mut provision = None;
        let mut password = None;
        let customer = if transition == Transition::Approve {
            match self
                .store
                .find_customer(&application.email, &application.full_name)?
            {
                Some(existing) => Some(existing),
                None => {
                    let (customer, secret) = self.provision(&application, now)?;
                    provision = Some(customer.clone());
                    password = Some(secret);
                    Some(customer)
                }
            }
        } else if transition.requires_customer() {
            let customer = self
                .store
                .find_customer(&application.email, &application.full_name)?
                .ok_or_else(|| {
                    WorkflowError::PreconditionFailed(format!(
                        "no customer account exists for {} <{}>",
                        application.full_name, application.email
                    ))
                })?;
            Some(customer)
        } else {
            None
        };

        let notification = transition.notification_stage().map(|stage| {
            let variables =
                self.variables(&application, approver, customer.as_ref(), password.as_deref());
            templates::render(
                stage,
                Some(&application.id),
                &application.email,
                &variables,
                now,
            )
        });

        let commit = TransitionCommit {
            application_id: application.id.clone(),
            expected: application.status,
            next: transition.target(),
            at: now,
            reviewed_by: approver.map(|a| a.name.clone()),
            provision,
            notification,
        };
        let updated = match self.store.commit_transition(&commit)? {
            Some(updated) => updated,
            None => return Err(self.lost_race(transition, &application.id)),
        };

        info!(
            "Application {} moved {} -> {} ({}) by {}",
            updated.id,
            application.status,
            updated.status,
            transition.name(),
            approver.map(|a| a.name.as_str()).unwrap_or("unknown")
        );
        if let Some(customer) = &commit.provision {
            info!(
                "Provisioned customer {} for application {}",
                customer.customer_id, updated.id
            );
        }

        if let Some(notification) = commit.notification {
            self.dispatch(notification);
        }
        Ok(updated)
    }

    fn load(&self, reference: &ApplicationRef) -> Result<Application, WorkflowError> {
        self.store
            .find_application(reference)?
            .ok_or_else(|| WorkflowError::NotFound(reference.to_string()))
    }

    /// Explains a compare-and-swap miss from the status that won.
    fn lost_race(&self, transition: Transition, id: &str) -> WorkflowError {
        match self.load(&ApplicationRef::Id(id.to_string())) {
            Ok(current) => match transition.guard(current.status) {
                Err(e) => e,
                Ok(()) => WorkflowError::InvalidTransition(format!(
                    "application {} changed while the {} was being applied",
                    id,
                    transition.name()
                )),
            },
            Err(e) => e,
        }
    }

    fn provision(
        &self,
        application: &Application,
        at: DateTime<Utc>,
    ) -> Result<(Customer, String), WorkflowError> {
        let mut rng = rand::thread_rng();
        let attempts = self.settings.customer_id_attempts.max(1);

        for _ in 0..attempts {
            let candidate =
                credentials::customer_id(&mut rng, &self.settings.customer_id_prefix, at.year());
            if self.store.customer_id_taken(&candidate)? {
                continue;
            }
            let password = credentials::random_token(&mut rng, self.settings.password_length);
            let customer = Customer {
                customer_id: candidate,
                email: application.email.clone(),
                full_name: application.full_name.clone(),
                application_id: application.id.clone(),
                password_hash: credentials::hash_password(&mut rng, &password),
                created_at: at,
            };
            return Ok((customer, password));
        }

        Err(WorkflowError::Persistence(StoreError::Conflict(format!(
            "no free customer id after {} attempts",
            attempts
        ))))
    }

    fn variables(
        &self,
        application: &Application,
        approver: Option<&ApproverContext>,
        customer: Option<&Customer>,
        password: Option<&str>,
    ) -> Variables {
        let mut v = Variables::new();
        v.insert("name", application.full_name.clone());
        v.insert("application_id", application.id.clone());
        v.insert("portal_url", self.settings.portal_url.clone());
        v.insert("approval_fee", self.settings.approval_fee.to_string());
        v.insert("agreement_fee", self.settings.agreement_fee.to_string());
        v.insert("one_time_fee", self.settings.one_time_fee.to_string());
        if let Some(approver) = approver {
            v.insert("approver_name", approver.name.clone());
            v.insert("approver_email", approver.email.clone());
            v.insert("approver_phone", approver.phone.clone().unwrap_or_default());
        }
        if let Some(customer) = customer {
            v.insert("customer_id", customer.customer_id.clone());
        }
        v.insert(
            "password",
            password
                .unwrap_or("(unchanged, use your existing password)")
                .to_string(),
        );
        v
    }

    /// Delivers in the background so the caller's answer never waits on the relay.
    ///
    /// The outcome is logged and kept on the outbox row; a failed attempt is left to
    /// the outbox worker.
    fn dispatch(&self, notification: OutboundNotification) {
        let store = Arc::clone(&self.store);
        let sender = Arc::clone(&self.sender);
        tokio::spawn(async move {
            if let Err(e) = outbox::deliver(store.as_ref(), sender.as_ref(), &notification).await
            {
                debug!(
                    "Notification {} left for the outbox worker: {}",
                    notification.id, e
                );
            }
        });
    }
}
