//! Mail templates for each workflow stage.
//!
//! Templates use `{{variable}}` placeholders. Rendering replaces every placeholder with
//! the matching entry of the variable map; placeholders without a value render empty
//! so a missing variable never leaks template syntax to a customer.

use chrono::{DateTime, Utc};
use common::model::notification::{DeliveryState, NotificationStage, OutboundNotification};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;
use uuid::Uuid;

pub type Variables = HashMap<&'static str, String>;

struct Template {
    subject: &'static str,
    body: &'static str,
}

const SUBMITTED: Template = Template {
    subject: "We received your franchise application",
    body: "Dear {{name}},

Thank you for applying for a franchise. Your application reference is {{application_id}}.
Our team will review it and get back to you shortly.

Regards,
Franchise Team",
};

const APPROVAL: Template = Template {
    subject: "Your franchise application has been approved",
    body: "Dear {{name}},

Congratulations! Your franchise application has been approved by {{approver_name}}.

Your customer portal account:
  Customer ID: {{customer_id}}
  Password: {{password}}

To proceed, please pay the approval fee of {{approval_fee}} from your dashboard at
{{portal_url}}.

For any questions contact {{approver_name}} at {{approver_email}} {{approver_phone}}.

Regards,
Franchise Team",
};

const AGREEMENT: Template = Template {
    subject: "Franchise agreement: next steps",
    body: "Dear {{name}},

Your franchise agreement is ready. Please pay the agreement fee of {{agreement_fee}} to
continue.

Log in at {{portal_url}} with your Customer ID {{customer_id}} and the password sent with
your approval mail to see the payment details.

For any questions contact {{approver_name}} at {{approver_email}} {{approver_phone}}.

Regards,
Franchise Team",
};

const ONE_TIME_FEE: Template = Template {
    subject: "Franchise setup: one-time fee",
    body: "Dear {{name}},

The last step of your franchise onboarding is the one-time setup fee of {{one_time_fee}}.

Log in at {{portal_url}} with your Customer ID {{customer_id}} to see the payment
instructions assigned to you.

For any questions contact {{approver_name}} at {{approver_email}} {{approver_phone}}.

Regards,
Franchise Team",
};

fn template_for(stage: NotificationStage) -> &'static Template {
    match stage {
        NotificationStage::Submitted => &SUBMITTED,
        NotificationStage::Approval => &APPROVAL,
        NotificationStage::Agreement => &AGREEMENT,
        NotificationStage::OneTimeFee => &ONE_TIME_FEE,
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([a-z_]+)\s*\}\}").unwrap_or_else(|e| panic!("placeholder regex: {e}"))
    })
}

/// Replaces every `{{name}}` in `text` with its value from `variables`.
pub fn render_text(text: &str, variables: &Variables) -> String {
    placeholder()
        .replace_all(text, |caps: &Captures| {
            variables.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned()
}

/// Renders the stage template into a queued outbox entry.
pub fn render(
    stage: NotificationStage,
    application_id: Option<&str>,
    recipient: &str,
    variables: &Variables,
    at: DateTime<Utc>,
) -> OutboundNotification {
    let template = template_for(stage);
    OutboundNotification {
        id: Uuid::new_v4().to_string(),
        application_id: application_id.map(str::to_string),
        stage,
        recipient: recipient.to_string(),
        subject: render_text(template.subject, variables),
        body: render_text(template.body, variables),
        state: DeliveryState::Pending,
        attempts: 0,
        last_error: None,
        created_at: at,
        updated_at: at,
    }
}
