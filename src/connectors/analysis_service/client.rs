use super::AnalysisConnector;
use crate::connectors::config::AnalysisServiceConfig;
use crate::connectors::errors::{error_message, ConnectorError};
use crate::forms::{AnalysisRequest, AnalysisResponse};
use crate::models::AnalysisOutcome;
use async_trait::async_trait;
use tracing::Instrument;

/// Calls a deployed `generate-palm-reading` function.
pub struct AnalysisServiceClient {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl AnalysisServiceClient {
    pub fn new(config: AnalysisServiceConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            http_client,
        }
    }
}

/// Interpret the function answer.
///
/// `{analysisData}` on 2xx is a completed reading; `{error}` on 2xx or 400 is
/// the content sentinel; anything else, including a body carrying both keys
/// or a partial result, is a transport failure.
pub(crate) fn read_outcome(status: u16, body: &str) -> Result<AnalysisOutcome, ConnectorError> {
    let value: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let sentinel = value
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.as_str())
        .map(|s| s.to_string());
    let has_data = value
        .as_ref()
        .map_or(false, |v| v.get("analysisData").is_some());

    let success = (200..300).contains(&status);
    if !success && status != 400 {
        return Err(ConnectorError::HttpError {
            status,
            message: error_message(body)
                .unwrap_or_else(|| format!("Analysis failed with status {}", status)),
        });
    }

    match (sentinel, has_data) {
        (Some(_), true) => Err(ConnectorError::InvalidResponse(
            "Analysis response carries both a result and an error".to_string(),
        )),
        (Some(message), false) => Ok(AnalysisOutcome::Rejected(message)),
        (None, true) if success => {
            let response: AnalysisResponse = serde_json::from_str(body).map_err(|e| {
                ConnectorError::InvalidResponse(format!("Incomplete analysis data: {}", e))
            })?;
            response
                .analysis_data
                .check()
                .map_err(ConnectorError::InvalidResponse)?;
            Ok(AnalysisOutcome::Completed(response.analysis_data))
        }
        _ => Err(ConnectorError::InvalidResponse(format!(
            "Unexpected analysis response (status {})",
            status
        ))),
    }
}

#[async_trait]
impl AnalysisConnector for AnalysisServiceClient {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, ConnectorError> {
        let span = tracing::info_span!(
            "analysis_service_analyze",
            image_len = request.palm_image_base64.len()
        );

        let url = format!("{}/generate-palm-reading", self.base_url);
        let mut req = self.http_client.post(&url).json(request);
        if let Some(key) = self.api_key.as_deref() {
            req = req.header("apikey", key).bearer_auth(key);
        }

        let resp = req.send().instrument(span).await.map_err(|e| {
            tracing::error!("analysis request failed: {:?}", e);
            ConnectorError::from(e)
        })?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;

        let outcome = read_outcome(status, &body);
        match &outcome {
            Ok(AnalysisOutcome::Rejected(message)) => {
                tracing::warn!("Analysis rejected the image: {}", message)
            }
            Err(err) => tracing::error!("Analysis failed: {}", err),
            _ => {}
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnalysisResult;
    use serde_json::json;

    fn completed_body() -> String {
        json!({ "analysisData": AnalysisResult::sample() }).to_string()
    }

    #[test]
    fn completed_result() {
        let outcome = read_outcome(200, &completed_body()).unwrap();
        assert_eq!(outcome, AnalysisOutcome::Completed(AnalysisResult::sample()));
    }

    #[test]
    fn sentinel_on_bad_request_is_a_rejection() {
        let outcome = read_outcome(400, r#"{"error":"blurry"}"#).unwrap();
        assert_eq!(outcome, AnalysisOutcome::Rejected("blurry".to_string()));
    }

    #[test]
    fn sentinel_on_success_is_a_rejection() {
        let outcome = read_outcome(200, r#"{"error":"not a palm"}"#).unwrap();
        assert_eq!(outcome, AnalysisOutcome::Rejected("not a palm".to_string()));
    }

    #[test]
    fn server_error_is_transport() {
        let err = read_outcome(500, r#"{"error":"OpenAI API error: 503"}"#).unwrap_err();
        assert_eq!(
            err,
            ConnectorError::HttpError {
                status: 500,
                message: "OpenAI API error: 503".to_string()
            }
        );
    }

    #[test]
    fn both_keys_is_invalid() {
        let mut value: serde_json::Value = serde_json::from_str(&completed_body()).unwrap();
        value["error"] = json!("blurry");

        let err = read_outcome(200, &value.to_string()).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidResponse(_)));
    }

    #[test]
    fn partial_result_is_invalid() {
        let mut value: serde_json::Value = serde_json::from_str(&completed_body()).unwrap();
        value["analysisData"].as_object_mut().unwrap().remove("spiritual");

        let err = read_outcome(200, &value.to_string()).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidResponse(_)));
    }

    #[test]
    fn out_of_range_score_is_invalid() {
        let mut value: serde_json::Value = serde_json::from_str(&completed_body()).unwrap();
        value["analysisData"]["career"]["score"] = json!(140);

        let err = read_outcome(200, &value.to_string()).unwrap_err();
        assert!(matches!(err, ConnectorError::InvalidResponse(_)));
    }
}
