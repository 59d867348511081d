use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A back-office agent who reviews applications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The already-authenticated person performing a transition.
///
/// Its fields are quoted in customer notifications as the point of contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproverContext {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&Agent> for ApproverContext {
    fn from(agent: &Agent) -> Self {
        ApproverContext {
            name: agent.name.clone(),
            email: agent.email.clone(),
            phone: agent.phone.clone(),
        }
    }
}
