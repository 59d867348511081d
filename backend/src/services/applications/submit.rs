use crate::services::respond;
use crate::workflow::engine::WorkflowEngine;
use actix_web::{web, Responder};
use common::requests::SubmitApplicationRequest;

/// Handler for `POST /api/applications`.
///
/// Returns the new application with its flag projection. Duplicate (email, full name)
/// pairs and malformed emails answer `400` with kind `InvalidInput`.
pub async fn process(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<SubmitApplicationRequest>,
) -> impl Responder {
    respond(
        engine
            .submit(payload.into_inner())
            .await
            .map(|application| application.view()),
    )
}
