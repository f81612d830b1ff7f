use crate::helpers::JsonResponse;
use crate::routes::require_user;
use crate::services::{Identity, WorkflowRegistry};
use actix_web::{get, web, Responder, Result};

/// GET /workflow
/// Current step, progress and last notice of the user's reading flow.
#[tracing::instrument(name = "Get workflow.", skip(registry))]
#[get("")]
pub async fn item(identity: Identity, registry: web::Data<WorkflowRegistry>) -> Result<impl Responder> {
    let user = require_user(&identity)?;
    let workflow = registry.get_or_create(&user.id).await;
    let view = workflow.lock().await.view();

    Ok(JsonResponse::build().set_item(view).ok("OK"))
}
