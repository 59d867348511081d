use super::{Mail, NotificationError, NotificationSender};
use crate::config::MailConfig;
use async_trait::async_trait;
use log::info;
use serde::Serialize;
use std::sync::Arc;

/// Posts mails as JSON to an HTTP mail relay.
pub struct HttpMailSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

impl HttpMailSender {
    pub fn new(endpoint: String, config: &MailConfig) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::Transport(e.to_string()))?;
        Ok(HttpMailSender {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        })
    }
}

#[async_trait]
impl NotificationSender for HttpMailSender {
    async fn send(&self, mail: &Mail) -> Result<(), NotificationError> {
        let mut request = self.client.post(&self.endpoint).json(&RelayPayload {
            from: &self.from,
            to: &mail.to,
            subject: &mail.subject,
            text: &mail.body,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                NotificationError::Timeout
            } else {
                NotificationError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(NotificationError::Rejected {
                status: status.as_u16(),
                detail,
            })
        }
    }
}

/// Writes who would have been mailed to the log. Used when no relay is configured.
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, mail: &Mail) -> Result<(), NotificationError> {
        info!("Mail (log only) to {}: {}", mail.to, mail.subject);
        Ok(())
    }
}

/// Picks the relay sender when an endpoint is configured, the log sender otherwise.
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn NotificationSender>, NotificationError> {
    match &config.endpoint {
        Some(endpoint) => Ok(Arc::new(HttpMailSender::new(endpoint.clone(), config)?)),
        None => Ok(Arc::new(LogSender)),
    }
}
