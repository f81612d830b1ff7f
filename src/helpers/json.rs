use actix_web::error::{Error, InternalError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Serialize;

/// Uniform response envelope.
#[derive(Debug, Serialize)]
pub struct JsonResponse<T> {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<T>>,
}

pub struct JsonResponseBuilder<T> {
    message: String,
    id: Option<String>,
    item: Option<T>,
    list: Option<Vec<T>>,
}

impl<T> Default for JsonResponseBuilder<T> {
    fn default() -> Self {
        Self {
            message: String::new(),
            id: None,
            item: None,
            list: None,
        }
    }
}

impl<T: Serialize> JsonResponseBuilder<T> {
    pub fn set_msg<I: Into<String>>(mut self, msg: I) -> Self {
        self.message = msg.into();
        self
    }

    pub fn set_id<I: ToString>(mut self, id: I) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    fn envelope(self, status: &str, msg: Option<String>) -> JsonResponse<T> {
        JsonResponse {
            status: status.to_string(),
            message: msg.unwrap_or(self.message),
            id: self.id,
            item: self.item,
            list: self.list,
        }
    }

    pub fn ok<I: Into<String>>(self, msg: I) -> web::Json<JsonResponse<T>> {
        web::Json(self.envelope("OK", Some(msg.into())))
    }

    pub fn created<I: Into<String>>(self, msg: I) -> HttpResponse {
        HttpResponse::Created().json(self.envelope("OK", Some(msg.into())))
    }

    /// Work started in the background.
    pub fn accepted<I: Into<String>>(self, msg: I) -> HttpResponse {
        HttpResponse::Accepted().json(self.envelope("OK", Some(msg.into())))
    }

    pub fn error(self, status: StatusCode) -> Error {
        let body = self.envelope("Error", None);
        let message = body.message.clone();
        InternalError::from_response(message, HttpResponse::build(status).json(body)).into()
    }

    pub fn bad_request<I: Into<String>>(self, msg: I) -> Error {
        self.set_msg(msg).error(StatusCode::BAD_REQUEST)
    }

    pub fn form_error<I: Into<String>>(self, msg: I) -> Error {
        self.set_msg(msg).error(StatusCode::UNPROCESSABLE_ENTITY)
    }

    pub fn unauthorized<I: Into<String>>(self, msg: I) -> Error {
        self.set_msg(msg).error(StatusCode::UNAUTHORIZED)
    }

    pub fn not_found<I: Into<String>>(self, msg: I) -> Error {
        self.set_msg(msg).error(StatusCode::NOT_FOUND)
    }

    pub fn conflict<I: Into<String>>(self, msg: I) -> Error {
        self.set_msg(msg).error(StatusCode::CONFLICT)
    }

    pub fn internal_server_error<I: Into<String>>(self, msg: I) -> Error {
        self.set_msg(msg).error(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn bad_gateway<I: Into<String>>(self, msg: I) -> Error {
        self.set_msg(msg).error(StatusCode::BAD_GATEWAY)
    }
}

impl<T: Serialize> JsonResponse<T> {
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder::default()
    }
}

impl JsonResponse<String> {
    pub fn bad_request<I: Into<String>>(msg: I) -> Error {
        Self::build().bad_request(msg)
    }

    pub fn form_error<I: Into<String>>(msg: I) -> Error {
        Self::build().form_error(msg)
    }

    pub fn unauthorized<I: Into<String>>(msg: I) -> Error {
        Self::build().unauthorized(msg)
    }

    pub fn not_found<I: Into<String>>(msg: I) -> Error {
        Self::build().not_found(msg)
    }

    pub fn conflict<I: Into<String>>(msg: I) -> Error {
        Self::build().conflict(msg)
    }

    pub fn internal_server_error<I: Into<String>>(msg: I) -> Error {
        Self::build().internal_server_error(msg)
    }

    pub fn bad_gateway<I: Into<String>>(msg: I) -> Error {
        Self::build().bad_gateway(msg)
    }
}
