use crate::error::WorkflowError;
use crate::services::{optional, required, respond};
use crate::store::RecordStore;
use crate::workflow::engine::{validate_email, WorkflowEngine};
use actix_web::{web, Responder};
use chrono::Utc;
use common::model::agent::Agent;
use common::requests::AgentRequest;
use uuid::Uuid;

pub async fn list(engine: web::Data<WorkflowEngine>) -> impl Responder {
    respond(engine.store().list_agents().map_err(WorkflowError::from))
}

pub async fn create(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<AgentRequest>,
) -> impl Responder {
    respond(create_agent(engine.store(), payload.into_inner()))
}

pub async fn delete(engine: web::Data<WorkflowEngine>, id: web::Path<String>) -> impl Responder {
    let id = id.into_inner();
    respond(match engine.store().delete_agent(&id) {
        Ok(true) => Ok(id),
        Ok(false) => Err(WorkflowError::NotFound(format!("agent {}", id))),
        Err(e) => Err(e.into()),
    })
}

fn create_agent(store: &dyn RecordStore, request: AgentRequest) -> Result<Agent, WorkflowError> {
    let email = validate_email(&request.email)?;
    let taken = store
        .list_agents()?
        .iter()
        .any(|agent| agent.email.eq_ignore_ascii_case(email));
    if taken {
        return Err(WorkflowError::InvalidInput(format!(
            "an agent with email {} already exists",
            email
        )));
    }

    let agent = Agent {
        id: Uuid::new_v4().to_string(),
        name: required("name", &request.name)?.to_string(),
        email: email.to_string(),
        phone: optional(request.phone),
        created_at: Utc::now(),
    };
    store.insert_agent(&agent)?;
    log::info!("Agent {} <{}> registered", agent.name, agent.email);
    Ok(agent)
}
