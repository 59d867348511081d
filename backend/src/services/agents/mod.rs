//! # Agent Service Module
//!
//! Routes under `/api/agents`. Agents are the back-office reviewers whose contact
//! details are quoted in customer mails when a transition names them by `agent_id`.

mod manage;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/agents";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(manage::list))
        .route("", post().to(manage::create))
        .route("/{id}", delete().to(manage::delete))
}
