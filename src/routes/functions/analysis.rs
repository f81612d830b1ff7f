use super::{check_api_key, DETAILS};
use crate::configuration::Settings;
use crate::forms::{AnalysisRequest, AnalysisResponse, FunctionError};
use crate::models::AnalysisOutcome;
use crate::services::Palmist;
use actix_web::{post, web, HttpRequest, HttpResponse};
use std::sync::Arc;

/// POST /functions/v1/generate-palm-reading
/// 200 `{analysisData}`, 400 `{error}` for an unusable photo, 500 `{error, details}`.
#[tracing::instrument(name = "Generate palm reading function.", skip_all)]
#[post("/generate-palm-reading")]
pub async fn generate_palm_reading(
    req: HttpRequest,
    body: web::Json<AnalysisRequest>,
    palmist: web::Data<Arc<Palmist>>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    if let Err(response) = check_api_key(&req, &settings) {
        return response;
    }

    match palmist.generate_reading(&body).await {
        Ok(AnalysisOutcome::Completed(analysis_data)) => {
            HttpResponse::Ok().json(AnalysisResponse { analysis_data })
        }
        Ok(AnalysisOutcome::Rejected(error)) => HttpResponse::BadRequest().json(FunctionError {
            error,
            details: None,
        }),
        Err(err) => {
            tracing::error!("Error in generate-palm-reading function: {}", err);
            HttpResponse::InternalServerError().json(FunctionError {
                error: err.to_string(),
                details: Some(DETAILS.to_string()),
            })
        }
    }
}
