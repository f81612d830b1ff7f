use crate::configuration::Settings;
use crate::connectors::AnalysisConnector;
use crate::db::ReadingStore;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models::UserProfile;
use crate::routes::{require_user, workflow_error};
use crate::services::{spawn_reading, Identity, ReadingOrchestrator, WorkflowRegistry};
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;
use std::sync::Arc;

/// POST /reading
/// Submit the profile form and start generating a reading from the staged
/// photo. Progress is polled through GET /workflow.
#[tracing::instrument(name = "Start palm reading.", skip(registry, store, analysis, settings))]
#[post("")]
pub async fn add(
    identity: Identity,
    form: web::Json<forms::ProfileForm>,
    registry: web::Data<WorkflowRegistry>,
    store: web::Data<Arc<dyn ReadingStore>>,
    analysis: web::Data<Arc<dyn AnalysisConnector>>,
    settings: web::Data<Settings>,
) -> Result<impl Responder> {
    let user = require_user(&identity)?;

    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        tracing::debug!("Invalid profile form: {}", errors);
        return Err(JsonResponse::form_error(errors.to_string()));
    }
    let profile = UserProfile::try_from(form).map_err(JsonResponse::form_error)?;

    let workflow = registry.get_or_create(&user.id).await;
    let (image, progress, view) = {
        let mut guard = workflow.lock().await;
        let image = guard.start_reading(profile.clone()).map_err(workflow_error)?;
        (image, guard.progress().clone(), guard.view())
    };

    let orchestrator = ReadingOrchestrator::new(
        identity,
        store.get_ref().clone(),
        analysis.get_ref().clone(),
        settings.progress.clone(),
    );
    spawn_reading(workflow, orchestrator, profile, image, progress);

    Ok(JsonResponse::build()
        .set_item(view)
        .accepted("Generating your palm reading"))
}
