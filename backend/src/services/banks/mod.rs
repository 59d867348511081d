//! # Bank Service Module
//!
//! Routes under `/api/banks`: admin maintenance of reusable bank records, the payment
//! QR code, and assignment of either to a customer.
//!
//! ## Sub-modules:
//! - `records`: CRUD for `BankRecord`.
//! - `qr`: multipart upload and retrieval of the current QR code.
//! - `assign`: appends `AssignedBank` rows through the workflow engine.

mod assign;
mod qr;
mod records;

use actix_web::web::{delete, get, post, put, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/banks";

/// Configures and returns the Actix `Scope` for bank routes.
///
/// `/assign` and `/qr` are registered before `/{id}` so they are not taken for ids.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(records::list))
        .route("", post().to(records::create))
        .route("/assign", post().to(assign::process))
        .route("/qr", post().to(qr::upload))
        .route("/qr", get().to(qr::current))
        .route("/{id}", get().to(records::get))
        .route("/{id}", put().to(records::update))
        .route("/{id}", delete().to(records::delete))
}
