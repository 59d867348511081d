use crate::error::WorkflowError;
use crate::services::{optional, required, respond};
use crate::store::RecordStore;
use crate::workflow::engine::WorkflowEngine;
use actix_web::{web, Responder};
use chrono::Utc;
use common::model::bank::BankRecord;
use common::requests::BankRecordRequest;
use uuid::Uuid;

pub async fn list(engine: web::Data<WorkflowEngine>) -> impl Responder {
    respond(engine.store().list_bank_records().map_err(WorkflowError::from))
}

pub async fn get(engine: web::Data<WorkflowEngine>, id: web::Path<String>) -> impl Responder {
    let id = id.into_inner();
    respond(
        engine
            .store()
            .find_bank_record(&id)
            .map_err(WorkflowError::from)
            .and_then(|found| {
                found.ok_or_else(|| WorkflowError::NotFound(format!("bank record {}", id)))
            }),
    )
}

pub async fn create(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<BankRecordRequest>,
) -> impl Responder {
    respond(save_bank_record(engine.store(), None, payload.into_inner()))
}

pub async fn update(
    engine: web::Data<WorkflowEngine>,
    id: web::Path<String>,
    payload: web::Json<BankRecordRequest>,
) -> impl Responder {
    respond(save_bank_record(
        engine.store(),
        Some(id.into_inner()),
        payload.into_inner(),
    ))
}

pub async fn delete(engine: web::Data<WorkflowEngine>, id: web::Path<String>) -> impl Responder {
    let id = id.into_inner();
    respond(match engine.store().delete_bank_record(&id) {
        Ok(true) => Ok(id),
        Ok(false) => Err(WorkflowError::NotFound(format!("bank record {}", id))),
        Err(e) => Err(e.into()),
    })
}

/// Validates the payload and inserts (`id == None`) or replaces a bank record.
///
/// Account numbers are unique; a clash answers `InvalidInput` instead of surfacing
/// the constraint violation.
fn save_bank_record(
    store: &dyn RecordStore,
    id: Option<String>,
    request: BankRecordRequest,
) -> Result<BankRecord, WorkflowError> {
    let account_number = required("account_number", &request.account_number)?.to_string();
    let mut record = BankRecord {
        id: Uuid::new_v4().to_string(),
        holder_name: required("holder_name", &request.holder_name)?.to_string(),
        account_number,
        ifsc: required("ifsc", &request.ifsc)?.to_uppercase(),
        bank_name: required("bank_name", &request.bank_name)?.to_string(),
        branch_name: optional(request.branch_name),
        upi_id: optional(request.upi_id),
        created_at: Utc::now(),
    };

    if let Some(id) = &id {
        let existing = store
            .find_bank_record(id)?
            .ok_or_else(|| WorkflowError::NotFound(format!("bank record {}", id)))?;
        record.id = existing.id;
        record.created_at = existing.created_at;
    }

    let clash = store
        .list_bank_records()?
        .into_iter()
        .any(|other| other.account_number == record.account_number && other.id != record.id);
    if clash {
        return Err(WorkflowError::InvalidInput(format!(
            "account number {} is already registered",
            record.account_number
        )));
    }

    if id.is_some() {
        store.update_bank_record(&record)?;
    } else {
        store.insert_bank_record(&record)?;
    }
    Ok(record)
}
