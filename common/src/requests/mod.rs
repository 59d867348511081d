use crate::model::agent::ApproverContext;
use crate::model::application::ApplicationRef;
use crate::model::bank::BankSelection;
use serde::{Deserialize, Serialize};

/// Payload of `POST /api/applications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitApplicationRequest {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Everything else the applicant filled in. Stored as-is.
    #[serde(default)]
    pub profile: serde_json::Value,
}

/// Payload of the approve, agreement and one-time-fee routes.
///
/// The approver is given inline or resolved from `agent_id`; when both are sent the
/// agent record wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub application: ApplicationRef,
    #[serde(default)]
    pub approver: Option<ApproverContext>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Payload of `POST /api/applications/reject`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    pub application: ApplicationRef,
    #[serde(default)]
    pub approver: Option<ApproverContext>,
}

/// Payload of `POST /api/banks/assign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignBankRequest {
    pub customer_email: String,
    pub selection: BankSelection,
}

/// Create or replace payload for a bank record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankRecordRequest {
    pub holder_name: String,
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
    #[serde(default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerLoginRequest {
    pub customer_id: String,
    pub password: String,
}
