//! # Notifications
//!
//! Outbound mail for the application workflow.
//!
//! - `templates`: subject and body per workflow stage, rendered from a variable map.
//! - `sender`: the `NotificationSender` implementations (HTTP relay, log only).
//! - `outbox`: delivery of queued notifications and the background retry worker.
//!
//! Notifications are written to the outbox in the same store transaction as the
//! transition that caused them, then delivered. A failed delivery leaves the row in
//! the outbox for the worker and never affects the transition.

pub mod outbox;
pub mod sender;
pub mod templates;

use async_trait::async_trait;
use common::model::notification::OutboundNotification;
use thiserror::Error;

/// A rendered email ready to hand to a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl From<&OutboundNotification> for Mail {
    fn from(n: &OutboundNotification) -> Self {
        Mail {
            to: n.recipient.clone(),
            subject: n.subject.clone(),
            body: n.body.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("mail transport error: {0}")]
    Transport(String),
    #[error("mail relay answered {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("mail relay did not answer in time")]
    Timeout,
}

/// Delivers one mail. Implementations report failure through the result and never panic.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, mail: &Mail) -> Result<(), NotificationError>;
}
