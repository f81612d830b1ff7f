mod add;
mod get;

pub use add::*;
pub use get::*;

use crate::helpers::JsonResponse;
use crate::services::ChatError;

pub(crate) fn chat_error(err: ChatError) -> actix_web::Error {
    match err {
        ChatError::AuthRequired => JsonResponse::unauthorized(err.to_string()),
        ChatError::SessionNotFound => JsonResponse::not_found(err.to_string()),
        ChatError::Persistence(_) | ChatError::Unavailable(_) => {
            JsonResponse::internal_server_error(err.to_string())
        }
        ChatError::Transport(_) => JsonResponse::bad_gateway(err.to_string()),
    }
}
