use crate::helpers::JsonResponse;
use crate::routes::{require_user, workflow_error};
use crate::services::{Identity, WorkflowRegistry};
use actix_web::{delete, web, Responder, Result};

/// DELETE /upload
/// Forget the selected photo. The stored original stays where it is.
#[tracing::instrument(name = "Clear palm image.", skip(registry))]
#[delete("")]
pub async fn item(identity: Identity, registry: web::Data<WorkflowRegistry>) -> Result<impl Responder> {
    let user = require_user(&identity)?;
    let workflow = registry.get_or_create(&user.id).await;
    let mut workflow = workflow.lock().await;
    workflow.clear_image().map_err(workflow_error)?;

    Ok(JsonResponse::build().set_item(workflow.view()).ok("Image cleared"))
}
