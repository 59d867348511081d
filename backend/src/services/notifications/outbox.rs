use crate::error::WorkflowError;
use crate::notifications::outbox::{deliver, Delivery};
use crate::services::respond;
use crate::workflow::engine::WorkflowEngine;
use actix_web::{web, Responder};
use common::model::notification::{DeliveryState, OutboundNotification};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ListQuery {
    pub state: Option<String>,
}

pub async fn list(
    engine: web::Data<WorkflowEngine>,
    query: web::Query<ListQuery>,
) -> impl Responder {
    let state = match query.into_inner().state.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<DeliveryState>()
            .map(Some)
            .map_err(WorkflowError::InvalidInput),
    };
    respond(state.and_then(|state| Ok(engine.store().list_notifications(state)?)))
}

pub async fn retry(engine: web::Data<WorkflowEngine>, id: web::Path<String>) -> impl Responder {
    respond(retry_notification(&engine, &id).await)
}

/// Makes one delivery attempt for an unsent notification and returns the updated row.
async fn retry_notification(
    engine: &WorkflowEngine,
    id: &str,
) -> Result<OutboundNotification, WorkflowError> {
    let notification = engine
        .store()
        .find_notification(id)?
        .ok_or_else(|| WorkflowError::NotFound(format!("notification {}", id)))?;
    if notification.state == DeliveryState::Sent {
        return Err(WorkflowError::InvalidInput(format!(
            "notification {} was already sent",
            id
        )));
    }

    if deliver(engine.store(), engine.sender(), &notification).await? == Delivery::Skipped {
        return Err(WorkflowError::InvalidInput(format!(
            "notification {} is already being delivered",
            id
        )));
    }
    engine
        .store()
        .find_notification(id)?
        .ok_or_else(|| WorkflowError::NotFound(format!("notification {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::outcome;
    use crate::testing::{engine_with, settle, FailingSender, RecordingSender};
    use chrono::Utc;
    use actix_web::{test, App};
    use common::outcome::ErrorKind;
    use common::requests::SubmitApplicationRequest;
    use std::sync::Arc;

    fn alice() -> SubmitApplicationRequest {
        SubmitApplicationRequest {
            email: "alice@example.com".to_string(),
            full_name: "Alice Kumar".to_string(),
            phone: None,
            profile: serde_json::Value::Null,
        }
    }

    #[actix_web::test]
    async fn failed_mail_is_listed_and_reports_the_retry_failure() {
        let (engine, _) = engine_with(Arc::new(FailingSender));
        engine.submit(alice()).await.unwrap();
        settle().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(engine))
                .service(crate::services::notifications::configure_routes()),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/notifications?state=failed")
            .to_request();
        let failed = outcome::<Vec<OutboundNotification>>(test::call_service(&app, req).await)
            .await
            .into_result()
            .unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].attempts, 1);
        assert!(failed[0].body.is_empty());

        let req = test::TestRequest::post()
            .uri(&format!("/api/notifications/{}/retry", failed[0].id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 502);
        let (kind, _) = outcome::<OutboundNotification>(resp)
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(kind, ErrorKind::NotificationError);

        let req = test::TestRequest::get()
            .uri("/api/notifications?state=bounced")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status().as_u16(), 400);
    }

    #[actix_web::test]
    async fn sent_mail_cannot_be_retried() {
        let sender = Arc::new(RecordingSender::default());
        let (engine, _) = engine_with(sender.clone());
        engine.submit(alice()).await.unwrap();
        settle().await;
        let sent = engine
            .store()
            .list_notifications(Some(DeliveryState::Sent))
            .unwrap();
        assert_eq!(sent.len(), 1);

        let err = retry_notification(&engine, &sent[0].id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = retry_notification(&engine, "missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(sender.sent().len(), 1);
    }

    #[actix_web::test]
    async fn mail_claimed_by_another_sender_is_not_retried() {
        let (engine, _) = engine_with(Arc::new(FailingSender));
        engine.submit(alice()).await.unwrap();
        settle().await;
        let failed = engine
            .store()
            .list_notifications(Some(DeliveryState::Failed))
            .unwrap();
        assert!(engine
            .store()
            .claim_notification(&failed[0].id, Utc::now(), Utc::now())
            .unwrap());

        let err = retry_notification(&engine, &failed[0].id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let row = engine.store().find_notification(&failed[0].id).unwrap().unwrap();
        assert_eq!(row.state, DeliveryState::Sending);
        assert_eq!(row.attempts, 1);
    }
}
