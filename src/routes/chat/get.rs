use super::chat_error;
use crate::connectors::ChatConnector;
use crate::db::ReadingStore;
use crate::helpers::JsonResponse;
use crate::routes::require_user;
use crate::services::{ChatController, Identity};
use actix_web::{get, web, Responder, Result};
use std::sync::Arc;
use uuid::Uuid;

/// GET /chat/sessions/{id}/messages
/// Oldest first, welcome message included.
#[tracing::instrument(name = "Get chat history.", skip(store, connector))]
#[get("/sessions/{id}/messages")]
pub async fn history(
    identity: Identity,
    path: web::Path<(Uuid,)>,
    store: web::Data<Arc<dyn ReadingStore>>,
    connector: web::Data<Arc<dyn ChatConnector>>,
) -> Result<impl Responder> {
    require_user(&identity)?;
    let controller = ChatController::new(identity, store.get_ref().clone(), connector.get_ref().clone());
    let messages = controller
        .history(path.into_inner().0)
        .await
        .map_err(chat_error)?;

    Ok(JsonResponse::build().set_list(messages).ok("OK"))
}
