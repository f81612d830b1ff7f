use crate::models::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One successful orchestration run. Never mutated after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PalmReading {
    pub id: Uuid,
    pub user_id: String,
    /// Object storage key of the original upload
    pub palm_image_url: Option<String>,
    #[sqlx(json)]
    pub analysis_data: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPalmReading {
    pub user_id: String,
    pub palm_image_url: Option<String>,
    pub analysis_data: AnalysisResult,
}
