use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::models::taste_profile::{FlavorProfile, TasteProfile};
use crate::profile::eval::{evaluate, expectations_from_answers, EvalReport};
use crate::profile::mapping::{map_answers, to_taste_profile};
use crate::profile::repo;
use crate::profile::schema::{MappedProfile, QuizAnswers};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MappingResponse {
    pub profile: TasteProfile,
    pub mapped: MappedProfile,
    pub evaluation: EvalReport,
}

async fn run_mapping(state: &AppState, answers: &QuizAnswers) -> Result<MappingResponse, AppError> {
    let mapped = map_answers(&state.llm, answers).await?;
    let evaluation = evaluate(&mapped, &expectations_from_answers(answers));
    let profile = to_taste_profile(&mapped, answers);
    Ok(MappingResponse {
        profile,
        mapped,
        evaluation,
    })
}

/// POST /api/profile/map
pub async fn handle_map_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(answers): AppJson<QuizAnswers>,
) -> Result<Json<MappingResponse>, AppError> {
    let mut response = run_mapping(&state, &answers).await?;

    let mapped_json = serde_json::to_value(&response.mapped)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize mapping: {e}")))?;
    let row = repo::upsert_profile(&state.db, user.user_id, &response.profile, Some(mapped_json))
        .await?;
    response.profile = row.into();

    Ok(Json(response))
}

/// POST /api/profile/preview
pub async fn handle_preview_profile(
    State(state): State<AppState>,
    _user: AuthUser,
    AppJson(answers): AppJson<QuizAnswers>,
) -> Result<Json<MappingResponse>, AppError> {
    Ok(Json(run_mapping(&state, &answers).await?))
}

/// GET /api/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<TasteProfile>, AppError> {
    repo::load_profile(&state.db, user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No taste profile yet".to_string()))
}

/// PUT /api/profile
pub async fn handle_put_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(profile): AppJson<TasteProfile>,
) -> Result<Json<TasteProfile>, AppError> {
    validate_profile(&profile)?;
    let row = repo::upsert_profile(&state.db, user.user_id, &profile, None).await?;
    Ok(Json(row.into()))
}

fn check_scale(field: &str, value: u8) -> Result<(), AppError> {
    if (1..=10).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field}: must be between 1 and 10"
        )))
    }
}

fn validate_flavor(prefix: &str, f: &FlavorProfile) -> Result<(), AppError> {
    for (name, value) in [
        ("fruitiness", f.fruitiness),
        ("earthiness", f.earthiness),
        ("oakiness", f.oakiness),
        ("acidity", f.acidity),
        ("tannins", f.tannins),
        ("sweetness", f.sweetness),
        ("body", f.body),
    ] {
        check_scale(&format!("{prefix}.{name}"), value)?;
    }
    Ok(())
}

/// Manual recalibration rules: every scale 1–10, a sane price band,
/// confidence in [0,1].
pub fn validate_profile(profile: &TasteProfile) -> Result<(), AppError> {
    validate_flavor("red_wine_preferences", &profile.red_wine_preferences)?;
    validate_flavor("white_wine_preferences", &profile.white_wine_preferences)?;
    validate_flavor("sparkling_preferences", &profile.sparkling_preferences)?;

    let general = &profile.general_preferences;
    check_scale(
        "general_preferences.food_pairing_importance",
        general.food_pairing_importance,
    )?;
    let band = &general.price_range;
    if band.min < 0.0 || band.min > band.max {
        return Err(AppError::Validation(
            "general_preferences.price_range: min must be >= 0 and <= max".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&profile.confidence_score) {
        return Err(AppError::Validation(
            "confidence_score: must be between 0 and 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::taste_profile::PriceRange;

    #[test]
    fn test_default_profile_is_valid() {
        assert!(validate_profile(&TasteProfile::default()).is_ok());
    }

    #[test]
    fn test_zero_scale_rejected_with_field_name() {
        let mut profile = TasteProfile::default();
        profile.white_wine_preferences.acidity = 0;
        match validate_profile(&profile) {
            Err(AppError::Validation(msg)) => {
                assert!(msg.starts_with("white_wine_preferences.acidity"))
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_inverted_price_band_rejected() {
        let mut profile = TasteProfile::default();
        profile.general_preferences.price_range = PriceRange {
            min: 80.0,
            max: 20.0,
        };
        assert!(validate_profile(&profile).is_err());
    }
}
