use crate::services::respond;
use crate::workflow::engine::WorkflowEngine;
use actix_web::{web, Responder};
use common::requests::AssignBankRequest;

/// Handler for `POST /api/banks/assign`.
///
/// Body: `{ "customer_email": "...", "selection": { "type": "records", "bank_ids": [...] } }`
/// or `{ ..., "selection": { "type": "current_qr" } }`. Returns the rows written.
pub async fn process(
    engine: web::Data<WorkflowEngine>,
    payload: web::Json<AssignBankRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    respond(engine.assign_bank(&request.customer_email, &request.selection))
}

#[cfg(test)]
mod tests {
    use crate::services::test_support::{engine_data, outcome};
    use actix_web::{test, App};
    use common::model::bank::{AssignedBank, BankRecord};
    use common::outcome::ErrorKind;

    #[actix_web::test]
    async fn records_are_created_then_assigned() {
        let app = test::init_service(
            App::new()
                .app_data(engine_data())
                .service(crate::services::banks::configure_routes()),
        )
        .await;

        let mut ids = Vec::new();
        for account in ["1111", "2222"] {
            let req = test::TestRequest::post()
                .uri("/api/banks")
                .set_json(serde_json::json!({
                    "holder_name": "Franchise Pvt Ltd",
                    "account_number": account,
                    "ifsc": "HDFC0001234",
                    "bank_name": "HDFC"
                }))
                .to_request();
            let record = outcome::<BankRecord>(test::call_service(&app, req).await)
                .await
                .into_result()
                .unwrap();
            ids.push(record.id);
        }

        let req = test::TestRequest::post()
            .uri("/api/banks/assign")
            .set_json(serde_json::json!({
                "customer_email": "alice@example.com",
                "selection": { "type": "records", "bank_ids": ids }
            }))
            .to_request();
        let rows = outcome::<Vec<AssignedBank>>(test::call_service(&app, req).await)
            .await
            .into_result()
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[actix_web::test]
    async fn current_qr_without_upload_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(engine_data())
                .service(crate::services::banks::configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/banks/assign")
            .set_json(serde_json::json!({
                "customer_email": "alice@example.com",
                "selection": { "type": "current_qr" }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);
        let (kind, _) = outcome::<serde_json::Value>(resp)
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(kind, ErrorKind::NotFound);
    }
}
