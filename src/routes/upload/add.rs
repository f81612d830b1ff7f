use crate::configuration::Settings;
use crate::connectors::ObjectStorage;
use crate::helpers::JsonResponse;
use crate::routes::{require_user, workflow_error};
use crate::services::{Identity, SelectedFile, UploadController, UploadError, WorkflowRegistry};
use actix_web::{http::header::CONTENT_TYPE, post, web, HttpRequest, Responder, Result};
use std::sync::Arc;

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// POST /upload
/// The raw body is the file; `Content-Type` is its type and `X-File-Name` its name.
#[tracing::instrument(name = "Upload palm image.", skip(req, body, registry, storage, settings))]
#[post("")]
pub async fn add(
    req: HttpRequest,
    body: web::Bytes,
    identity: Identity,
    registry: web::Data<WorkflowRegistry>,
    storage: web::Data<Arc<dyn ObjectStorage>>,
    settings: web::Data<Settings>,
) -> Result<impl Responder> {
    let user = require_user(&identity)?;
    let file = SelectedFile {
        name: header(&req, "x-file-name"),
        content_type: header(&req, CONTENT_TYPE.as_str()).unwrap_or_default(),
        bytes: body,
    };

    let controller = UploadController::new(storage.get_ref().clone(), settings.upload.clone());
    let workflow = registry.get_or_create(&user.id).await;

    if let Err(err) = controller.validate(&file) {
        let err = UploadError::from(err);
        let notice = err.notice();
        if workflow.lock().await.upload_failed(notice.clone()).is_err() {
            tracing::info!("Rejected file left a running reading untouched");
        }
        return Err(upload_error(&err, notice.message));
    }

    // Held until the photo is staged so a run cannot start in between.
    let mut workflow = workflow.lock().await;
    workflow.ensure_idle().map_err(workflow_error)?;

    match controller.select_file(&user.id, file).await {
        Ok(image) => {
            workflow.image_ready(image).map_err(workflow_error)?;
            Ok(JsonResponse::build()
                .set_item(workflow.view())
                .ok("Image uploaded successfully!"))
        }
        Err(err) => {
            let notice = err.notice();
            workflow.upload_failed(notice.clone()).map_err(workflow_error)?;
            Err(upload_error(&err, notice.message))
        }
    }
}

fn upload_error(err: &UploadError, message: String) -> actix_web::Error {
    match err {
        UploadError::Storage(_) => JsonResponse::bad_gateway(message),
        UploadError::Validation(_) | UploadError::Compress(_) => JsonResponse::bad_request(message),
    }
}
