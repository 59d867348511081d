//! # Notification Service Module
//!
//! Read and retry access to the outbox under `/api/notifications`. Bodies are never
//! returned, as approval mails carry the customer's initial password.

mod outbox;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/notifications";

/// # Registered Routes:
///
/// *   **`GET /?state=`**: `outbox::list`. Optional filter: `pending`, `sent`, `failed`.
/// *   **`POST /{id}/retry`**: `outbox::retry`. One immediate attempt, regardless of the
///     worker's attempt limit.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(outbox::list))
        .route("/{id}/retry", post().to(outbox::retry))
}
