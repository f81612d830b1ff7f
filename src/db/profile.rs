use crate::models::{Gender, HandPreference, UserProfile};
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::Instrument;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    date_of_birth: Option<NaiveDate>,
    hand_preference: Option<String>,
    gender: Option<String>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = String;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let hand_preference = row
            .hand_preference
            .as_deref()
            .ok_or_else(|| "profile has no hand preference".to_string())?
            .parse::<HandPreference>()?;
        let gender = row.gender.as_deref().map(str::parse::<Gender>).transpose()?;

        Ok(UserProfile {
            date_of_birth: row.date_of_birth,
            hand_preference,
            gender,
        })
    }
}

/// Insert or overwrite; the profile row id is the user id.
pub async fn upsert(pool: &PgPool, user_id: &str, profile: &UserProfile) -> Result<(), String> {
    let query_span = tracing::info_span!("Saving user profile", user_id = %user_id);
    sqlx::query(
        r#"
        INSERT INTO profiles (id, date_of_birth, hand_preference, gender, created_at, updated_at)
        VALUES ($1, $2, $3, $4, NOW(), NOW())
        ON CONFLICT (id) DO UPDATE SET
            date_of_birth = EXCLUDED.date_of_birth,
            hand_preference = EXCLUDED.hand_preference,
            gender = EXCLUDED.gender,
            updated_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(profile.date_of_birth)
    .bind(profile.hand_preference.as_str())
    .bind(profile.gender.map(|g| g.as_str()))
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| {
        tracing::info!("Profile of {} has been saved", user_id);
    })
    .map_err(|err| {
        tracing::error!("Failed to execute query: {:?}", err);
        "Failed to save your profile.".to_string()
    })
}

pub async fn fetch(pool: &PgPool, user_id: &str) -> Result<Option<UserProfile>, String> {
    let query_span = tracing::info_span!("Fetching user profile", user_id = %user_id);
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT date_of_birth, hand_preference, gender
        FROM profiles
        WHERE id = $1
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .instrument(query_span)
    .await
    .map_err(|err| {
        tracing::error!("Failed to fetch profile: {:?}", err);
        "Failed to load your profile.".to_string()
    })?;

    // a half-filled row is treated as absent
    Ok(row.and_then(|row| {
        UserProfile::try_from(row)
            .map_err(|err| tracing::warn!("Ignoring stored profile of {}: {}", user_id, err))
            .ok()
    }))
}
