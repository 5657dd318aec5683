use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::extractors::{AppJson, AuthUser};
use crate::inventory::repo::list_in_stock;
use crate::models::taste_profile::PriceRange;
use crate::pairing::tables::infer_main_ingredient;
use crate::profile::repo::load_profile;
use crate::restaurant::ocr::{extract_entries, image_data_url};
use crate::restaurant::{analyze_list, AnalysisContext, RankedEntry, WineListEntry};
use crate::state::AppState;

const MAX_ENTRIES: usize = 200;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Entries typed or pasted by the client.
    #[serde(default)]
    pub entries: Option<Vec<WineListEntry>>,
    /// Photo of the list, base64 or a data URL. Used when `entries` is absent.
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub image_mime_type: Option<String>,
    #[serde(default)]
    pub food: Option<String>,
    /// Overrides the profile's price range for this meal.
    #[serde(default)]
    pub budget: Option<PriceRange>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub entries_read: usize,
    pub recommendations: Vec<RankedEntry>,
}

/// POST /api/restaurant/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if let Some(band) = &request.budget {
        if band.min < 0.0 || band.min > band.max {
            return Err(AppError::Validation(
                "budget: min must be >= 0 and <= max".to_string(),
            ));
        }
    }

    let entries = match (request.entries, request.image_base64.as_deref()) {
        (Some(entries), _) => entries,
        (None, Some(image)) => {
            let data_url = image_data_url(image, request.image_mime_type.as_deref())?;
            let read = extract_entries(&state.llm, &data_url).await?;
            if read.is_empty() {
                return Err(AppError::UnprocessableEntity(
                    "No wines could be read from the photo".to_string(),
                ));
            }
            read
        }
        (None, None) => {
            return Err(AppError::Validation(
                "entries or image_base64 is required".to_string(),
            ))
        }
    };
    if entries.len() > MAX_ENTRIES {
        return Err(AppError::Validation(format!(
            "entries: at most {MAX_ENTRIES} wines per list"
        )));
    }
    if let Some(i) = entries.iter().position(|e| e.name.trim().is_empty()) {
        return Err(AppError::Validation(format!(
            "entries[{i}].name: must not be empty"
        )));
    }

    let (inventory, profile) = tokio::try_join!(
        list_in_stock(&state.db, user.user_id),
        load_profile(&state.db, user.user_id),
    )?;

    let price_band = request
        .budget
        .as_ref()
        .or(profile.as_ref().map(|p| &p.general_preferences.price_range));
    let ctx = AnalysisContext {
        inventory: &inventory,
        profile: profile.as_ref(),
        ingredient: request.food.as_deref().and_then(infer_main_ingredient),
        price_band,
    };

    let entries_read = entries.len();
    let recommendations = analyze_list(entries, &ctx, request.limit);
    info!(
        "Analyzed wine list of {entries_read} entries for user {}",
        user.user_id
    );

    Ok(Json(AnalyzeResponse {
        entries_read,
        recommendations,
    }))
}
