use crate::error::WorkflowError;
use crate::services::respond;
use crate::store::RecordStore;
use crate::workflow::engine::WorkflowEngine;
use actix_multipart::Multipart;
use actix_web::{web, Responder};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use common::model::bank::QrImage;
use futures_util::StreamExt;
use md5::Context;
use uuid::Uuid;

const MAX_QR_BYTES: usize = 2 * 1024 * 1024;
const ACCEPTED_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Handler for `POST /api/banks/qr`.
///
/// Expects a multipart form with a `file` part holding a PNG or JPEG image. Every
/// upload is kept; the newest one is "the current QR" used by assignments.
pub async fn upload(engine: web::Data<WorkflowEngine>, payload: Multipart) -> impl Responder {
    respond(receive_qr(engine.store(), payload).await)
}

/// Handler for `GET /api/banks/qr`.
pub async fn current(engine: web::Data<WorkflowEngine>) -> impl Responder {
    respond(
        engine
            .store()
            .latest_qr_image()
            .map_err(WorkflowError::from)
            .and_then(|found| {
                found.ok_or_else(|| WorkflowError::NotFound("QR code".to_string()))
            }),
    )
}

fn multipart_error(e: actix_multipart::MultipartError) -> WorkflowError {
    WorkflowError::InvalidInput(format!("malformed upload: {}", e))
}

async fn receive_qr(
    store: &dyn RecordStore,
    mut payload: Multipart,
) -> Result<QrImage, WorkflowError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if name.as_deref() != Some("file") {
            // Unknown parts are drained and ignored.
            while let Some(chunk) = field.next().await {
                chunk.map_err(multipart_error)?;
            }
            continue;
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();

        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            if bytes.len() + chunk.len() > MAX_QR_BYTES {
                return Err(WorkflowError::InvalidInput(format!(
                    "QR image exceeds {} bytes",
                    MAX_QR_BYTES
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        return save_qr(store, &filename, &bytes);
    }
    Err(WorkflowError::InvalidInput(
        "multipart field 'file' is missing".to_string(),
    ))
}

fn save_qr(
    store: &dyn RecordStore,
    filename: &str,
    bytes: &[u8],
) -> Result<QrImage, WorkflowError> {
    let lower = filename.to_ascii_lowercase();
    if !ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return Err(WorkflowError::InvalidInput(
            "The file must end with .png, .jpg or .jpeg".to_string(),
        ));
    }
    if bytes.is_empty() {
        return Err(WorkflowError::InvalidInput("QR image is empty".to_string()));
    }

    let mut md5_hasher = Context::new();
    md5_hasher.consume(bytes);

    let image = QrImage {
        id: Uuid::new_v4().to_string(),
        content_type: mime_guess::from_path(&lower)
            .first_or_octet_stream()
            .to_string(),
        md5: format!("{:x}", md5_hasher.finalize()),
        base64: BASE64.encode(bytes),
        uploaded_at: Utc::now(),
    };
    store.insert_qr_image(&image)?;
    log::info!(
        "QR image {} stored ({} bytes, md5 {})",
        image.id,
        bytes.len(),
        image.md5
    );
    Ok(image)
}
