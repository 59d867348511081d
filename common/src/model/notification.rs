use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The workflow stage a notification belongs to. Each stage has its own template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationStage {
    Submitted,
    Approval,
    Agreement,
    OneTimeFee,
}

impl NotificationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationStage::Submitted => "submitted",
            NotificationStage::Approval => "approval",
            NotificationStage::Agreement => "agreement",
            NotificationStage::OneTimeFee => "one-time-fee",
        }
    }
}

impl FromStr for NotificationStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(NotificationStage::Submitted),
            "approval" => Ok(NotificationStage::Approval),
            "agreement" => Ok(NotificationStage::Agreement),
            "one-time-fee" => Ok(NotificationStage::OneTimeFee),
            other => Err(format!("unknown notification stage '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Queued, no attempt made yet.
    Pending,
    /// Claimed by one sender. Nobody else attempts it until the claim goes stale.
    Sending,
    Sent,
    /// At least one attempt failed. Retried until the attempt limit.
    Failed,
}

impl DeliveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::Pending => "pending",
            DeliveryState::Sending => "sending",
            DeliveryState::Sent => "sent",
            DeliveryState::Failed => "failed",
        }
    }
}

impl FromStr for DeliveryState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DeliveryState::Pending),
            "sending" => Ok(DeliveryState::Sending),
            "sent" => Ok(DeliveryState::Sent),
            "failed" => Ok(DeliveryState::Failed),
            other => Err(format!("unknown delivery state '{}'", other)),
        }
    }
}

/// A rendered email waiting in (or delivered from) the outbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundNotification {
    pub id: String,
    pub application_id: Option<String>,
    pub stage: NotificationStage,
    pub recipient: String,
    pub subject: String,
    /// Rendered body. May carry credentials, so it is not serialized to API callers.
    #[serde(skip)]
    pub body: String,
    pub state: DeliveryState,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
