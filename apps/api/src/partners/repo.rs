use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::partner::DrinkingPartnerRow;
use crate::partners::NewPartner;

pub async fn list_partners(pool: &PgPool, user_id: Uuid) -> Result<Vec<DrinkingPartnerRow>, AppError> {
    Ok(sqlx::query_as::<_, DrinkingPartnerRow>(
        "SELECT * FROM drinking_partners WHERE user_id = $1 ORDER BY name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn insert_partner(
    pool: &PgPool,
    user_id: Uuid,
    partner: &NewPartner,
) -> Result<DrinkingPartnerRow, AppError> {
    Ok(sqlx::query_as::<_, DrinkingPartnerRow>(
        r#"
        INSERT INTO drinking_partners (user_id, name, notes, taste_notes)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&partner.name)
    .bind(&partner.notes)
    .bind(&partner.taste_notes)
    .fetch_one(pool)
    .await?)
}

pub async fn delete_partner(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM drinking_partners WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Partner {id} not found")));
    }
    Ok(())
}
