use crate::helpers::JsonResponse;
use crate::routes::require_user;
use crate::services::{Identity, WorkflowRegistry};
use actix_web::{delete, web, Responder, Result};

/// DELETE /workflow
/// Sign-out: drop the photo, profile and reading held for the user.
#[tracing::instrument(name = "Reset workflow.", skip(registry))]
#[delete("")]
pub async fn item(identity: Identity, registry: web::Data<WorkflowRegistry>) -> Result<impl Responder> {
    let user = require_user(&identity)?;
    if registry.remove(&user.id).await {
        tracing::info!("Workflow of {} discarded", user.id);
    }

    Ok(JsonResponse::<String>::build().ok("Workflow reset"))
}
