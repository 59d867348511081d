mod config;
mod error;
mod notifications;
mod services;
mod store;
mod workflow;

#[cfg(test)]
mod testing;

use crate::config::Config;
use crate::notifications::{outbox, sender};
use crate::store::sqlite::SqliteStore;
use crate::store::RecordStore;
use crate::workflow::engine::WorkflowEngine;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;
use std::sync::Arc;

fn startup_error(context: &str, e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| startup_error("configuration", e))?;

    let store: Arc<dyn RecordStore> = Arc::new(
        SqliteStore::open(&config.database_path, config.db_busy_timeout)
            .map_err(|e| startup_error("database", e))?,
    );
    info!("Database opened at {}", config.database_path);

    let mail_sender =
        sender::from_config(&config.mail).map_err(|e| startup_error("mail relay", e))?;
    match &config.mail.endpoint {
        Some(endpoint) => info!("Mail relay: {}", endpoint),
        None => info!("No mail relay configured, notifications are only logged"),
    }

    // Start outbox retry worker
    tokio::spawn(outbox::start_outbox_worker(
        store.clone(),
        mail_sender.clone(),
        config.outbox.clone(),
    ));

    let engine = web::Data::new(WorkflowEngine::new(
        store,
        mail_sender,
        config.workflow.clone(),
    ));

    let json_limit = config.json_limit;
    info!("Server running at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(engine.clone())
            .service(services::applications::configure_routes())
            .service(services::banks::configure_routes())
            .service(services::customers::configure_routes())
            .service(services::agents::configure_routes())
            .service(services::notifications::configure_routes())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
