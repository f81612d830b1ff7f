//! The analysis and chat functions, served with their own wire contract
//! (bare JSON bodies, no envelope) so the HTTP connectors can target them.

mod analysis;
mod chat;

pub use analysis::*;
pub use chat::*;

use crate::configuration::Settings;
use crate::forms::FunctionError;
use actix_web::{HttpRequest, HttpResponse};

pub const DETAILS: &str = "Check the function logs for more information";

/// When a functions key is configured, callers must present it as `apikey`.
pub(crate) fn check_api_key(req: &HttpRequest, settings: &Settings) -> Result<(), HttpResponse> {
    let Some(expected) = settings.connectors.analysis_service.api_key.as_deref() else {
        return Ok(());
    };

    let presented = req.headers().get("apikey").and_then(|v| v.to_str().ok());
    if presented == Some(expected) {
        return Ok(());
    }

    tracing::warn!("Function call with a missing or wrong api key");
    Err(HttpResponse::Unauthorized().json(FunctionError {
        error: "Invalid API key".to_string(),
        details: None,
    }))
}
