//! Workflow transition endpoints.
//!
//! The approve, agreement and one-time-fee routes take a `TransitionRequest`: the
//! application (by id, or by `{email, full_name}`) plus the approver, given inline or
//! as an `agent_id`. The approver's contact details are quoted in the customer mail.
//!
//! A transition answers `200` as soon as its state change is committed. Whether the
//! notification mail went out is not part of the answer; see `/api/notifications`.

use crate::error::WorkflowError;
use crate::services::respond;
use crate::workflow::engine::WorkflowEngine;
use actix_web::{web, Responder};
use common::model::agent::ApproverContext;
use common::model::application::ApplicationView;
use common::requests::{RejectRequest, TransitionRequest};

fn approver_of(
    engine: &WorkflowEngine,
    request: &TransitionRequest,
) -> Result<ApproverContext, WorkflowError> {
    engine.resolve_approver(request.approver.clone(), request.agent_id.as_deref())
}

async fn approve_application(
    engine: &WorkflowEngine,
    request: TransitionRequest,
) -> Result<ApplicationView, WorkflowError> {
    let approver = approver_of(engine, &request)?;
    Ok(engine.approve(&request.application, &approver).await?.view())
}

async fn start_agreement(
    engine: &WorkflowEngine,
    request: TransitionRequest,
) -> Result<ApplicationView, WorkflowError> {
    let approver = approver_of(engine, &request)?;
    Ok(engine
        .initiate_agreement(&request.application, &approver)
        .await?
        .view())
}

async fn start_one_time_fee(
    engine: &WorkflowEngine,
    request: TransitionRequest,
) -> Result<ApplicationView, WorkflowError> {
    let approver = approver_of(engine, &request)?;
    Ok(engine
        .initiate_one_time_fee(&request.application, &approver)
        .await?
        .view())
}

/// Handler for `POST /api/applications/approve`.
pub async fn approve(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<TransitionRequest>,
) -> impl Responder {
    respond(approve_application(&engine, payload.into_inner()).await)
}

/// Handler for `POST /api/applications/agreement`.
pub async fn agreement(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<TransitionRequest>,
) -> impl Responder {
    respond(start_agreement(&engine, payload.into_inner()).await)
}

/// Handler for `POST /api/applications/one-time-fee`.
pub async fn one_time_fee(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<TransitionRequest>,
) -> impl Responder {
    respond(start_one_time_fee(&engine, payload.into_inner()).await)
}

/// Handler for `POST /api/applications/reject`. The approver is optional here.
pub async fn reject(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<RejectRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    respond(
        engine
            .reject(&request.application, request.approver.as_ref())
            .await
            .map(|application| application.view()),
    )
}
