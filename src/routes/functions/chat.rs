use super::check_api_key;
use crate::configuration::Settings;
use crate::forms::{ChatReply, ChatRequest, FunctionError};
use crate::services::Palmist;
use actix_web::{post, web, HttpRequest, HttpResponse};
use std::sync::Arc;

/// POST /functions/v1/chat-with-ai
/// 200 `{response}` or 500 `{error}`.
#[tracing::instrument(name = "Chat with AI function.", skip_all)]
#[post("/chat-with-ai")]
pub async fn chat_with_ai(
    req: HttpRequest,
    body: web::Json<ChatRequest>,
    palmist: web::Data<Arc<Palmist>>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    if let Err(response) = check_api_key(&req, &settings) {
        return response;
    }

    match palmist.chat(&body).await {
        Ok(response) => HttpResponse::Ok().json(ChatReply { response }),
        Err(err) => {
            tracing::error!("Error in chat-with-ai function: {}", err);
            HttpResponse::InternalServerError().json(FunctionError {
                error: err.to_string(),
                details: None,
            })
        }
    }
}
