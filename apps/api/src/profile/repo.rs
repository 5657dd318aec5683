use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::taste_profile::{TasteProfile, TasteProfileRow};

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<TasteProfileRow>, AppError> {
    Ok(
        sqlx::query_as::<_, TasteProfileRow>("SELECT * FROM taste_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Like [`get_profile`] but converted to the domain type.
pub async fn load_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<TasteProfile>, AppError> {
    Ok(get_profile(pool, user_id).await?.map(TasteProfile::from))
}

/// Inserts or replaces the user's profile. The learning history is never
/// overwritten; a missing `mapped` keeps the previously stored mapping.
pub async fn upsert_profile(
    pool: &PgPool,
    user_id: Uuid,
    profile: &TasteProfile,
    mapped: Option<Value>,
) -> Result<TasteProfileRow, AppError> {
    let row = sqlx::query_as::<_, TasteProfileRow>(
        r#"
        INSERT INTO taste_profiles
            (user_id, red_wine_preferences, white_wine_preferences, sparkling_preferences,
             general_preferences, confidence_score, mapped_profile)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET
            red_wine_preferences = EXCLUDED.red_wine_preferences,
            white_wine_preferences = EXCLUDED.white_wine_preferences,
            sparkling_preferences = EXCLUDED.sparkling_preferences,
            general_preferences = EXCLUDED.general_preferences,
            confidence_score = EXCLUDED.confidence_score,
            mapped_profile = COALESCE(EXCLUDED.mapped_profile, taste_profiles.mapped_profile),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(Json(&profile.red_wine_preferences))
    .bind(Json(&profile.white_wine_preferences))
    .bind(Json(&profile.sparkling_preferences))
    .bind(Json(&profile.general_preferences))
    .bind(profile.confidence_score)
    .bind(mapped)
    .fetch_one(pool)
    .await?;

    info!(
        "Stored taste profile for user {user_id} (confidence {:.2})",
        row.confidence_score
    );
    Ok(row)
}
