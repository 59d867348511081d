//! Delivery of queued notifications.
//!
//! `deliver` claims one outbox entry, makes one attempt and records the outcome on the
//! row. `start_outbox_worker` is spawned from `main.rs` and periodically retries
//! every entry that is not yet sent and still below the attempt limit. The claim
//! keeps the worker and an in-request dispatch from mailing the same entry twice.

use super::{Mail, NotificationError, NotificationSender};
use crate::config::OutboxConfig;
use crate::store::RecordStore;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use common::model::notification::OutboundNotification;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// How long a `sending` claim holds before the entry is considered abandoned.
const CLAIM_LEASE_MINUTES: i64 = 5;

/// What `deliver` did with an entry that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Another sender holds the entry, or it was already sent. Nothing was attempted.
    Skipped,
}

fn stale_before(now: DateTime<Utc>) -> DateTime<Utc> {
    now - ChronoDuration::minutes(CLAIM_LEASE_MINUTES)
}

/// Claims one notification, sends it and records the attempt.
///
/// The delivery result is returned for callers that want it (the retry route).
/// Failing to record the attempt is only logged: the claim then goes stale and the
/// worker picks the entry up again.
pub async fn deliver(
    store: &dyn RecordStore,
    sender: &dyn NotificationSender,
    notification: &OutboundNotification,
) -> Result<Delivery, NotificationError> {
    let now = Utc::now();
    match store.claim_notification(&notification.id, now, stale_before(now)) {
        Ok(true) => {}
        Ok(false) => {
            debug!(
                "Notification {} is claimed elsewhere, skipping",
                notification.id
            );
            return Ok(Delivery::Skipped);
        }
        Err(e) => {
            error!("Could not claim notification {}: {}", notification.id, e);
            return Ok(Delivery::Skipped);
        }
    }

    let result = sender.send(&Mail::from(notification)).await;
    let error_text = result.as_ref().err().map(|e| e.to_string());

    match &error_text {
        None => info!(
            "Notification {} ({}) delivered to {}",
            notification.id,
            notification.stage.as_str(),
            notification.recipient
        ),
        Some(e) => warn!(
            "Notification {} ({}) to {} failed: {}",
            notification.id,
            notification.stage.as_str(),
            notification.recipient,
            e
        ),
    }

    if let Err(e) = store.record_delivery(&notification.id, error_text.as_deref(), Utc::now()) {
        error!(
            "Could not record delivery attempt for notification {}: {}",
            notification.id, e
        );
    }
    result.map(|()| Delivery::Sent)
}

/// Delivers one batch of due notifications. Returns how many were delivered.
pub async fn flush_due(
    store: &dyn RecordStore,
    sender: &dyn NotificationSender,
    config: &OutboxConfig,
) -> usize {
    let due = match store.due_notifications(
        config.max_attempts,
        config.batch,
        stale_before(Utc::now()),
    ) {
        Ok(due) => due,
        Err(e) => {
            error!("Could not read the notification outbox: {}", e);
            return 0;
        }
    };

    let mut delivered = 0;
    for notification in &due {
        if let Ok(Delivery::Sent) = deliver(store, sender, notification).await {
            delivered += 1;
        }
    }
    delivered
}

/// Long-running retry loop. Spawn it once at startup.
pub async fn start_outbox_worker(
    store: Arc<dyn RecordStore>,
    sender: Arc<dyn NotificationSender>,
    config: OutboxConfig,
) {
    let mut ticker = tokio::time::interval(config.interval);
    loop {
        ticker.tick().await;
        let delivered = flush_due(store.as_ref(), sender.as_ref(), &config).await;
        if delivered > 0 {
            info!("Outbox worker delivered {} notification(s)", delivered);
        }
    }
}
