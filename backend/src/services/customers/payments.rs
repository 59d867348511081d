use crate::error::WorkflowError;
use crate::services::respond;
use crate::workflow::engine::{validate_email, WorkflowEngine};
use actix_web::{web, Responder};
use common::model::bank::AssignedBank;

/// Handler for `GET /api/customers/{email}/banks`.
pub async fn list(engine: web::Data<WorkflowEngine>, email: web::Path<String>) -> impl Responder {
    respond(assigned_to(&engine, &email))
}

fn assigned_to(engine: &WorkflowEngine, email: &str) -> Result<Vec<AssignedBank>, WorkflowError> {
    let email = validate_email(email)?;
    Ok(engine.store().assigned_banks(email)?)
}

#[cfg(test)]
mod tests {
    use crate::services::test_support::{engine_data, outcome};
    use crate::store::RecordStore;
    use actix_web::{test, App};
    use chrono::Utc;
    use common::model::bank::{AssignedBank, BankSelection, QrImage};

    #[actix_web::test]
    async fn newest_assignment_comes_first() {
        let data = engine_data();
        data.store()
            .insert_qr_image(&QrImage {
                id: "qr-1".to_string(),
                content_type: "image/png".to_string(),
                md5: "900150983cd24fb0d6963f7d28e17f72".to_string(),
                base64: "YWJj".to_string(),
                uploaded_at: Utc::now(),
            })
            .unwrap();
        data.assign_bank("alice@example.com", &BankSelection::CurrentQr)
            .unwrap();
        let second = data
            .assign_bank("alice@example.com", &BankSelection::CurrentQr)
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(data.clone())
                .service(crate::services::customers::configure_routes()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/customers/alice@example.com/banks")
            .to_request();
        let rows = outcome::<Vec<AssignedBank>>(test::call_service(&app, req).await)
            .await
            .into_result()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second[0].id);
        assert_eq!(rows[0].qr_image_id.as_deref(), Some("qr-1"));

        let req = test::TestRequest::get()
            .uri("/api/customers/not-an-email/banks")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);
    }
}
