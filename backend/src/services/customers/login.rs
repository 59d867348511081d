use crate::services::{required, respond};
use crate::workflow::engine::WorkflowEngine;
use actix_web::{web, Responder};
use common::requests::CustomerLoginRequest;

/// Handler for `POST /api/customers/login`.
///
/// Answers the `Customer` (without its password hash) or `NotFound` for any bad pair.
pub async fn process(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<CustomerLoginRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    respond(
        required("customer_id", &request.customer_id)
            .and_then(|id| engine.authenticate_customer(id, &request.password)),
    )
}
