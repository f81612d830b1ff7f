pub mod chat;
pub mod functions;
pub mod health_checks;
pub mod reading;
pub mod upload;
pub mod workflow;

pub use health_checks::*;

use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{Identity, WorkflowError};
use std::sync::Arc;

pub(crate) fn require_user(identity: &Identity) -> Result<Arc<models::User>, actix_web::Error> {
    identity
        .user()
        .cloned()
        .ok_or_else(|| JsonResponse::unauthorized("Authentication required"))
}

pub(crate) fn workflow_error(err: WorkflowError) -> actix_web::Error {
    match err {
        WorkflowError::InvalidStep(_) => JsonResponse::conflict(err.to_string()),
        WorkflowError::NoImage => JsonResponse::bad_request(err.to_string()),
        WorkflowError::NoReading => JsonResponse::not_found(err.to_string()),
    }
}
