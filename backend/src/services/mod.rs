//! HTTP routes, one sub-module per resource. Each exposes `configure_routes()`
//! returning the Actix `Scope` that `main.rs` mounts.
//!
//! Every handler answers with the `Outcome` envelope from `common::outcome`, built by
//! `respond` so that the status code always matches the error kind.

pub mod agents;
pub mod applications;
pub mod banks;
pub mod customers;
pub mod notifications;

use crate::error::WorkflowError;
use actix_web::HttpResponse;
use common::outcome::Outcome;
use serde::Serialize;

pub(crate) fn respond<T: Serialize>(result: Result<T, WorkflowError>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(Outcome::success(data)),
        Err(e) => HttpResponse::build(e.status_code())
            .json(Outcome::<()>::failure(e.kind(), e.to_string())),
    }
}

/// Rejects blank required text fields with the field name in the message.
pub(crate) fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, WorkflowError> {
    let value = value.trim();
    if value.is_empty() {
        Err(WorkflowError::InvalidInput(format!(
            "{} must not be empty",
            field
        )))
    } else {
        Ok(value)
    }
}

/// Trims an optional text field, treating blank as absent.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::testing::{engine_with, RecordingSender};
    use crate::workflow::engine::WorkflowEngine;
    use actix_web::dev::ServiceResponse;
    use actix_web::web;
    use common::outcome::Outcome;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;

    pub fn engine_data() -> web::Data<WorkflowEngine> {
        let (engine, _) = engine_with(Arc::new(RecordingSender::default()));
        web::Data::new(engine)
    }

    pub async fn outcome<T: DeserializeOwned>(response: ServiceResponse) -> Outcome<T> {
        actix_web::test::read_body_json(response).await
    }
}
