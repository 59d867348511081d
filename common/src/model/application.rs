use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle stage of a franchise application.
///
/// `Pending` is the initial stage. `OneTimeFee` and `Rejected` are terminal.
/// Which moves between stages are legal is decided by the backend workflow engine;
/// this type only carries the value and its wire/database spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Agreement,
    OneTimeFee,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Agreement => "agreement",
            ApplicationStatus::OneTimeFee => "one-time-fee",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::OneTimeFee | ApplicationStatus::Rejected
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "agreement" => Ok(ApplicationStatus::Agreement),
            "one-time-fee" => Ok(ApplicationStatus::OneTimeFee),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(format!("unknown application status '{}'", other)),
        }
    }
}

/// When each workflow stage was reached.
///
/// Every timestamp except `submitted_at` is written in the same update that moves
/// `status`, so the legacy flags derived from them can never disagree with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub agreement_at: Option<DateTime<Utc>>,
    pub one_time_fee_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
}

impl Timeline {
    pub fn submitted(at: DateTime<Utc>) -> Self {
        Timeline {
            submitted_at: at,
            approved_at: None,
            agreement_at: None,
            one_time_fee_at: None,
            rejected_at: None,
        }
    }
}

/// One franchise application submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// UUID assigned on submission. Canonical lookup key.
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Applicant profile (address, business, financial details, document references).
    /// Opaque to the workflow.
    pub profile: serde_json::Value,
    pub status: ApplicationStatus,
    /// Name of the agent or admin who performed the last transition.
    pub reviewed_by: Option<String>,
    pub timeline: Timeline,
}

impl Application {
    pub fn flags(&self) -> ApplicationFlags {
        ApplicationFlags {
            approved: self.timeline.approved_at.is_some(),
            rejected: self.status == ApplicationStatus::Rejected,
            agreement_sent: self.timeline.agreement_at.is_some(),
            one_time_fee_mail: self.timeline.one_time_fee_at.is_some(),
        }
    }

    pub fn view(self) -> ApplicationView {
        let flags = self.flags();
        ApplicationView {
            application: self,
            flags,
        }
    }
}

/// Boolean projection of the status kept for older dashboard code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationFlags {
    pub approved: bool,
    pub rejected: bool,
    pub agreement_sent: bool,
    pub one_time_fee_mail: bool,
}

/// An application as returned by the API: the record plus its flag projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: Application,
    #[serde(flatten)]
    pub flags: ApplicationFlags,
}

/// How a caller identifies an application.
///
/// The id is the canonical form. The `(email, full_name)` pair is accepted for
/// callers that only know the applicant, and matches case-insensitively on email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplicationRef {
    Id(String),
    Applicant { email: String, full_name: String },
}

impl fmt::Display for ApplicationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationRef::Id(id) => write!(f, "application {}", id),
            ApplicationRef::Applicant { email, full_name } => {
                write!(f, "application of {} <{}>", full_name, email)
            }
        }
    }
}
