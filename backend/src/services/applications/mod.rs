//! # Application Service Module
//!
//! Routes under `/api/applications`: submission, back-office listing, and the
//! workflow transitions.
//!
//! ## Sub-modules:
//! - `submit`: creates a `pending` application from the public form.
//! - `query`: list, fetch and administrative delete.
//! - `transition`: approve, agreement, one-time fee and reject. These only translate
//!   the request into a `WorkflowEngine` call; all guards live in the engine.

mod query;
mod submit;
mod transition;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/applications";

/// Configures and returns the Actix `Scope` for application routes.
///
/// # Registered Routes:
///
/// *   **`POST /`**: `submit::process`. Body: `SubmitApplicationRequest`.
/// *   **`GET /?status=`**: `query::list`. Optional status filter (`pending`, `approved`,
///     `agreement`, `one-time-fee`, `rejected`). Newest first, with legacy flags.
/// *   **`GET /{id}`**: `query::get`.
/// *   **`DELETE /{id}`**: `query::delete`. Administrative removal, outside the workflow.
/// *   **`POST /approve`**, **`POST /agreement`**, **`POST /one-time-fee`**:
///     `transition::*`. Body: `TransitionRequest`.
/// *   **`POST /reject`**: `transition::reject`. Body: `RejectRequest`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", post().to(submit::process))
        .route("", get().to(query::list))
        .route("/approve", post().to(transition::approve))
        .route("/agreement", post().to(transition::agreement))
        .route("/one-time-fee", post().to(transition::one_time_fee))
        .route("/reject", post().to(transition::reject))
        .route("/{id}", get().to(query::get))
        .route("/{id}", delete().to(query::delete))
}
