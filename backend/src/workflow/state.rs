use crate::error::WorkflowError;
use common::model::application::ApplicationStatus;
use common::model::notification::NotificationStage;

/// A guarded status change of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    InitiateAgreement,
    InitiateOneTimeFee,
    Reject,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Approve => "approve",
            Transition::InitiateAgreement => "agreement",
            Transition::InitiateOneTimeFee => "one-time-fee",
            Transition::Reject => "reject",
        }
    }

    pub fn target(&self) -> ApplicationStatus {
        match self {
            Transition::Approve => ApplicationStatus::Approved,
            Transition::InitiateAgreement => ApplicationStatus::Agreement,
            Transition::InitiateOneTimeFee => ApplicationStatus::OneTimeFee,
            Transition::Reject => ApplicationStatus::Rejected,
        }
    }

    /// Statuses this transition may start from.
    pub fn sources(&self) -> &'static [ApplicationStatus] {
        match self {
            Transition::Approve => &[ApplicationStatus::Pending],
            Transition::InitiateAgreement => &[ApplicationStatus::Approved],
            Transition::InitiateOneTimeFee => &[ApplicationStatus::Agreement],
            Transition::Reject => &[
                ApplicationStatus::Pending,
                ApplicationStatus::Approved,
                ApplicationStatus::Agreement,
            ],
        }
    }

    /// Mail queued when the transition commits, if any.
    pub fn notification_stage(&self) -> Option<NotificationStage> {
        match self {
            Transition::Approve => Some(NotificationStage::Approval),
            Transition::InitiateAgreement => Some(NotificationStage::Agreement),
            Transition::InitiateOneTimeFee => Some(NotificationStage::OneTimeFee),
            Transition::Reject => None,
        }
    }

    /// Whether the agreement and fee stages need the provisioned customer account.
    pub fn requires_customer(&self) -> bool {
        matches!(
            self,
            Transition::InitiateAgreement | Transition::InitiateOneTimeFee
        )
    }

    /// Checks that an application in `current` may take this transition.
    pub fn guard(&self, current: ApplicationStatus) -> Result<(), WorkflowError> {
        if self.sources().contains(&current) {
            return Ok(());
        }
        let message = match (self, current) {
            (Transition::Approve, _) => {
                format!("Franchise cannot be approved while it is {}", current)
            }
            (Transition::InitiateAgreement, ApplicationStatus::Pending) => {
                "Franchise is not yet approved".to_string()
            }
            (Transition::InitiateAgreement, _) => {
                format!("Agreement cannot be initiated while the franchise is {}", current)
            }
            (Transition::InitiateOneTimeFee, _) => format!(
                "One-time fee requires the agreement stage, the franchise is {}",
                current
            ),
            (Transition::Reject, ApplicationStatus::OneTimeFee) => {
                "Franchise has already reached the one-time fee stage".to_string()
            }
            (Transition::Reject, _) => format!("Franchise is already {}", current),
        };
        Err(WorkflowError::InvalidTransition(message))
    }
}
