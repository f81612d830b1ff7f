use super::chat_error;
use crate::connectors::ChatConnector;
use crate::db::ReadingStore;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::routes::require_user;
use crate::services::{ChatController, ChatStart, Exchange, Identity, WorkflowRegistry};
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;
use std::sync::Arc;
use uuid::Uuid;

/// Reading the session is about: the form's, else the one on screen, else the latest.
async fn reading_for_session(
    user_id: &str,
    form: &forms::StartChatForm,
    registry: &WorkflowRegistry,
    store: &dyn ReadingStore,
) -> Option<Uuid> {
    if form.palm_reading_id.is_some() {
        return form.palm_reading_id;
    }

    if let Some(workflow) = registry.get(user_id).await {
        if let Ok(id) = workflow.lock().await.open_chat() {
            return Some(id);
        }
    }

    store
        .fetch_latest_reading(user_id)
        .await
        .map_err(|err| tracing::error!("Chat session without reading: {}", err))
        .ok()
        .flatten()
        .map(|reading| reading.id)
}

/// POST /chat/sessions
/// Every call opens a new session seeded with the welcome message.
#[tracing::instrument(name = "Start chat session.", skip(body, registry, store, connector))]
#[post("/sessions")]
pub async fn start(
    identity: Identity,
    body: web::Bytes,
    registry: web::Data<WorkflowRegistry>,
    store: web::Data<Arc<dyn ReadingStore>>,
    connector: web::Data<Arc<dyn ChatConnector>>,
) -> Result<impl Responder> {
    let form: forms::StartChatForm = if body.is_empty() {
        forms::StartChatForm::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|err| JsonResponse::bad_request(format!("Invalid chat form: {err}")))?
    };

    let palm_reading_id = match identity.user() {
        Some(user) => {
            reading_for_session(&user.id, &form, registry.get_ref(), store.get_ref().as_ref()).await
        }
        None => None,
    };

    let controller = ChatController::new(identity, store.get_ref().clone(), connector.get_ref().clone());
    match controller.start(palm_reading_id).await.map_err(chat_error)? {
        ChatStart::Started(started) => Ok(JsonResponse::build()
            .set_id(started.session.id)
            .set_item(started)
            .created("Chat session started")),
        ChatStart::AwaitingIdentity => Ok(JsonResponse::<String>::build().accepted("Waiting for sign-in")),
    }
}

/// POST /chat/sessions/{id}/messages
#[tracing::instrument(name = "Send chat message.", skip(form, store, connector))]
#[post("/sessions/{id}/messages")]
pub async fn send(
    identity: Identity,
    path: web::Path<(Uuid,)>,
    form: web::Json<forms::SendMessageForm>,
    store: web::Data<Arc<dyn ReadingStore>>,
    connector: web::Data<Arc<dyn ChatConnector>>,
) -> Result<impl Responder> {
    require_user(&identity)?;
    let session_id = path.into_inner().0;

    let form = form.into_inner();
    if let Err(errors) = form.validate() {
        return Err(JsonResponse::form_error(errors.to_string()));
    }

    let controller = ChatController::new(identity, store.get_ref().clone(), connector.get_ref().clone());
    let exchange = controller
        .send(Some(session_id), &form.message)
        .await
        .map_err(chat_error)?;

    Ok(match exchange {
        Some(exchange) => JsonResponse::build().set_item(exchange).ok("OK"),
        None => JsonResponse::<Exchange>::build().ok("Nothing to send"),
    })
}
