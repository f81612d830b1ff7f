use crate::db::ReadingStore;
use crate::helpers::JsonResponse;
use crate::routes::require_user;
use crate::services::report::{self, ReportPage};
use crate::services::{Identity, WorkflowRegistry};
use actix_web::{get, web, Responder, Result};
use std::sync::Arc;

/// GET /reading/latest
/// Most recent reading. Also moves the workflow to the report step.
#[tracing::instrument(name = "Get latest palm reading.", skip(registry, store))]
#[get("/latest")]
pub async fn latest(
    identity: Identity,
    registry: web::Data<WorkflowRegistry>,
    store: web::Data<Arc<dyn ReadingStore>>,
) -> Result<impl Responder> {
    let user = require_user(&identity)?;
    let reading = store
        .fetch_latest_reading(&user.id)
        .await
        .map_err(JsonResponse::internal_server_error)?
        .ok_or_else(|| JsonResponse::not_found("No palm reading yet."))?;

    let workflow = registry.get_or_create(&user.id).await;
    if let Err(err) = workflow.lock().await.restore(reading.clone()) {
        // a run in flight keeps its step
        tracing::debug!("Workflow not restored: {}", err);
    }

    Ok(JsonResponse::build().set_item(reading).ok("OK"))
}

/// GET /reading/latest/report/{page}
#[tracing::instrument(name = "Get palm reading report page.", skip(store))]
#[get("/latest/report/{page}")]
pub async fn report_page(
    identity: Identity,
    path: web::Path<(u8,)>,
    store: web::Data<Arc<dyn ReadingStore>>,
) -> Result<impl Responder> {
    let user = require_user(&identity)?;
    let page = ReportPage::try_from(path.into_inner().0).map_err(JsonResponse::not_found)?;

    let reading = store
        .fetch_latest_reading(&user.id)
        .await
        .map_err(JsonResponse::internal_server_error)?
        .ok_or_else(|| JsonResponse::not_found("No palm reading yet."))?;
    let profile = store
        .fetch_profile(&user.id)
        .await
        .map_err(|err| tracing::error!("Report without profile: {}", err))
        .ok()
        .flatten();

    let view = report::render(page, &reading, profile);
    Ok(JsonResponse::build().set_item(view).ok("OK"))
}
