//! Cellar persistence. Every statement is scoped by the owning `user_id`.

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::inventory::validation::{check_stock, ConsumeRequest, WineDraft};
use crate::models::consumption::ConsumptionRecordRow;
use crate::models::taste_profile::TastingRecord;
use crate::models::wine::{WineRow, WineType};

#[derive(Debug, Default, Deserialize)]
pub struct WineFilter {
    pub wine_type: Option<WineType>,
    pub search: Option<String>,
    #[serde(default)]
    pub in_stock: bool,
}

pub async fn insert_wine(
    pool: &PgPool,
    user_id: Uuid,
    draft: &WineDraft,
) -> Result<WineRow, AppError> {
    let row = sqlx::query_as::<_, WineRow>(
        r#"
        INSERT INTO wines
            (user_id, name, producer, vintage, region, country, varietal, wine_type,
             quantity, purchase_price, purchase_date, purchase_location, storage_location,
             drinking_window, personal_notes, personal_rating, external_data)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&draft.name)
    .bind(&draft.producer)
    .bind(draft.vintage)
    .bind(&draft.region)
    .bind(&draft.country)
    .bind(&draft.varietal)
    .bind(draft.wine_type.as_str())
    .bind(draft.quantity)
    .bind(draft.purchase_price)
    .bind(draft.purchase_date)
    .bind(&draft.purchase_location)
    .bind(&draft.storage_location)
    .bind(draft.drinking_window.as_ref().map(Json))
    .bind(&draft.personal_notes)
    .bind(draft.personal_rating)
    .bind(&draft.external_data)
    .fetch_one(pool)
    .await?;

    info!("Added wine {} for user {user_id}", row.id);
    Ok(row)
}

pub async fn get_wine(pool: &PgPool, user_id: Uuid, wine_id: Uuid) -> Result<WineRow, AppError> {
    sqlx::query_as::<_, WineRow>("SELECT * FROM wines WHERE id = $1 AND user_id = $2")
        .bind(wine_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Wine {wine_id} not found")))
}

pub async fn list_wines(
    pool: &PgPool,
    user_id: Uuid,
    filter: &WineFilter,
) -> Result<Vec<WineRow>, AppError> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"));

    Ok(sqlx::query_as::<_, WineRow>(
        r#"
        SELECT * FROM wines
        WHERE user_id = $1
          AND ($2::text IS NULL OR wine_type = $2)
          AND ($3::text IS NULL OR name ILIKE $3 OR producer ILIKE $3 OR region ILIKE $3)
          AND (NOT $4 OR quantity > 0)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(filter.wine_type.map(|t| t.as_str()))
    .bind(search)
    .bind(filter.in_stock)
    .fetch_all(pool)
    .await?)
}

pub async fn list_in_stock(pool: &PgPool, user_id: Uuid) -> Result<Vec<WineRow>, AppError> {
    list_wines(
        pool,
        user_id,
        &WineFilter {
            in_stock: true,
            ..Default::default()
        },
    )
    .await
}

pub async fn update_wine(
    pool: &PgPool,
    user_id: Uuid,
    wine_id: Uuid,
    draft: &WineDraft,
) -> Result<WineRow, AppError> {
    sqlx::query_as::<_, WineRow>(
        r#"
        UPDATE wines SET
            name = $3, producer = $4, vintage = $5, region = $6, country = $7,
            varietal = $8, wine_type = $9, quantity = $10, purchase_price = $11,
            purchase_date = $12, purchase_location = $13, storage_location = $14,
            drinking_window = $15, personal_notes = $16, personal_rating = $17,
            external_data = $18, updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(wine_id)
    .bind(user_id)
    .bind(&draft.name)
    .bind(&draft.producer)
    .bind(draft.vintage)
    .bind(&draft.region)
    .bind(&draft.country)
    .bind(&draft.varietal)
    .bind(draft.wine_type.as_str())
    .bind(draft.quantity)
    .bind(draft.purchase_price)
    .bind(draft.purchase_date)
    .bind(&draft.purchase_location)
    .bind(&draft.storage_location)
    .bind(draft.drinking_window.as_ref().map(Json))
    .bind(&draft.personal_notes)
    .bind(draft.personal_rating)
    .bind(&draft.external_data)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Wine {wine_id} not found")))
}

pub async fn delete_wine(pool: &PgPool, user_id: Uuid, wine_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM wines WHERE id = $1 AND user_id = $2")
        .bind(wine_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Wine {wine_id} not found")));
    }
    info!("Deleted wine {wine_id} for user {user_id}");
    Ok(())
}

/// Marks bottles as consumed: decrements stock and records one history row,
/// atomically. A rating is also appended to the taste-profile learning history.
pub async fn consume_wine(
    pool: &PgPool,
    user_id: Uuid,
    wine_id: Uuid,
    request: &ConsumeRequest,
    today: NaiveDate,
) -> Result<ConsumptionRecordRow, AppError> {
    let mut tx = pool.begin().await?;

    let wine = sqlx::query_as::<_, WineRow>(
        "SELECT * FROM wines WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(wine_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Wine {wine_id} not found")))?;

    check_stock(wine.quantity, request.quantity)?;

    sqlx::query(
        "UPDATE wines SET quantity = quantity - $1, updated_at = now() WHERE id = $2 AND user_id = $3",
    )
    .bind(request.quantity)
    .bind(wine_id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let consumed_date = request.consumed_date.unwrap_or(today);
    let record = sqlx::query_as::<_, ConsumptionRecordRow>(
        r#"
        INSERT INTO consumption_history
            (user_id, wine_id, consumed_date, quantity, rating, notes, occasion, food_pairing, companions)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(wine_id)
    .bind(consumed_date)
    .bind(request.quantity)
    .bind(request.rating)
    .bind(&request.notes)
    .bind(&request.occasion)
    .bind(&request.food_pairing)
    .bind(&request.companions)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(rating) = request.rating {
        let tasting = TastingRecord {
            wine_id,
            rating,
            notes: request.notes.clone(),
            date: consumed_date,
        };
        // No-op for users who have not completed onboarding yet.
        sqlx::query(
            r#"
            UPDATE taste_profiles
            SET learning_history = learning_history || $1, updated_at = now()
            WHERE user_id = $2
            "#,
        )
        .bind(Json(vec![tasting]))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "User {user_id} consumed {} bottle(s) of wine {wine_id} ({} left)",
        request.quantity,
        wine.quantity - request.quantity
    );
    Ok(record)
}

pub async fn list_consumption(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<ConsumptionRecordRow>, AppError> {
    Ok(sqlx::query_as::<_, ConsumptionRecordRow>(
        r#"
        SELECT * FROM consumption_history
        WHERE user_id = $1
        ORDER BY consumed_date DESC, created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

pub async fn count_consumed_since(
    pool: &PgPool,
    user_id: Uuid,
    since: NaiveDate,
) -> Result<i64, AppError> {
    let total: Option<i64> = sqlx::query_scalar(
        "SELECT SUM(quantity)::BIGINT FROM consumption_history WHERE user_id = $1 AND consumed_date >= $2",
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(pool)
    .await?;
    Ok(total.unwrap_or(0))
}

/// Users with at least one bottle in stock, for scheduled jobs.
pub async fn users_with_stock(pool: &PgPool) -> Result<Vec<Uuid>, AppError> {
    Ok(
        sqlx::query_scalar("SELECT DISTINCT user_id FROM wines WHERE quantity > 0")
            .fetch_all(pool)
            .await?,
    )
}
