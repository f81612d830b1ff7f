use crate::models::{NewPalmReading, PalmReading};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn insert(pool: &PgPool, reading: NewPalmReading) -> Result<PalmReading, String> {
    let query_span = tracing::info_span!("Saving palm reading", user_id = %reading.user_id);
    let analysis_data = serde_json::to_value(&reading.analysis_data).map_err(|err| {
        tracing::error!("Failed to serialize analysis: {:?}", err);
        "Failed to save your reading.".to_string()
    })?;

    sqlx::query_as::<_, PalmReading>(
        r#"
        INSERT INTO palm_readings (id, user_id, palm_image_url, analysis_data, created_at)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING id, user_id, palm_image_url, analysis_data, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&reading.user_id)
    .bind(&reading.palm_image_url)
    .bind(analysis_data)
    .fetch_one(pool)
    .instrument(query_span)
    .await
    .map(|saved| {
        tracing::info!("Palm reading {} has been saved", saved.id);
        saved
    })
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        "Failed to save your reading.".to_string()
    })
}

pub async fn fetch_latest(pool: &PgPool, user_id: &str) -> Result<Option<PalmReading>, String> {
    let query_span = tracing::info_span!("Fetching latest palm reading", user_id = %user_id);
    sqlx::query_as::<_, PalmReading>(
        r#"
        SELECT id, user_id, palm_image_url, analysis_data, created_at
        FROM palm_readings
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch palm reading: {:?}", err);
        "Failed to load your reading.".to_string()
    })
}

pub async fn fetch(pool: &PgPool, id: Uuid, user_id: &str) -> Result<Option<PalmReading>, String> {
    let query_span = tracing::info_span!("Fetching palm reading by ID", id = %id);
    sqlx::query_as::<_, PalmReading>(
        r#"
        SELECT id, user_id, palm_image_url, analysis_data, created_at
        FROM palm_readings
        WHERE id = $1 AND user_id = $2
        LIMIT 1
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch palm reading: {:?}", err);
        "Failed to load your reading.".to_string()
    })
}
