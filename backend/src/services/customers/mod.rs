//! # Customer Service Module
//!
//! Routes under `/api/customers`, used by the customer portal.
//!
//! *   **`POST /login`**: checks the credentials mailed at approval.
//! *   **`GET /{email}/banks`**: the customer's payment targets, newest first.

mod login;
mod payments;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/customers";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/login", post().to(login::process))
        .route("/{email}/banks", get().to(payments::list))
}
