use crate::error::WorkflowError;
use crate::services::respond;
use crate::workflow::engine::WorkflowEngine;
use actix_web::{web, Responder};
use common::model::application::{ApplicationRef, ApplicationStatus, ApplicationView};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Handler for `GET /api/applications`.
pub async fn list(
    engine: web::Data<WorkflowEngine>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    respond(list_applications(&engine, query.into_inner()))
}

fn list_applications(
    engine: &WorkflowEngine,
    query: ListQuery,
) -> Result<Vec<ApplicationView>, WorkflowError> {
    let status = match query.status.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<ApplicationStatus>()
                .map_err(WorkflowError::InvalidInput)?,
        ),
    };
    Ok(engine
        .store()
        .list_applications(status)?
        .into_iter()
        .map(|a| a.view())
        .collect())
}

/// Handler for `GET /api/applications/{id}`.
pub async fn get(engine: web::Data<WorkflowEngine>, id: web::Path<String>) -> impl Responder {
    let reference = ApplicationRef::Id(id.into_inner());
    respond(
        engine
            .store()
            .find_application(&reference)
            .map_err(WorkflowError::from)
            .and_then(|found| found.ok_or_else(|| WorkflowError::NotFound(reference.to_string())))
            .map(|a| a.view()),
    )
}

/// Handler for `DELETE /api/applications/{id}`.
///
/// Removes the application row only. A provisioned customer account and its bank
/// assignments stay, as they belong to the customer.
pub async fn delete(engine: web::Data<WorkflowEngine>, id: web::Path<String>) -> impl Responder {
    let id = id.into_inner();
    respond(match engine.store().delete_application(&id) {
        Ok(true) => {
            log::info!("Application {} deleted", id);
            Ok(id)
        }
        Ok(false) => Err(WorkflowError::NotFound(format!("application {}", id))),
        Err(e) => Err(e.into()),
    })
}
