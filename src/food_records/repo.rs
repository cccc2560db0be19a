use anyhow::Context;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use super::repo_types::{FoodRecord, ServeCounts};

const RECORD_COLUMNS: &str = "record_id, user_id, record_date, image_url, meal_type, \
     vegetables, fruit, grains, meat, dairy, extras, created_at";

pub async fn insert(
    db: &PgPool,
    user_id: i64,
    record_date: PrimitiveDateTime,
    image_url: Option<&str>,
    meal_type: &str,
    counts: &ServeCounts,
) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO food_records
            (user_id, record_date, image_url, meal_type, vegetables, fruit, grains, meat, dairy, extras)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING record_id
        "#,
    )
    .bind(user_id)
    .bind(record_date)
    .bind(image_url)
    .bind(meal_type)
    .bind(counts.vegetables)
    .bind(counts.fruit)
    .bind(counts.grains)
    .bind(counts.meat)
    .bind(counts.dairy)
    .bind(counts.extras)
    .fetch_one(db)
    .await
    .context("insert food record")?;
    Ok(id)
}

pub async fn list_by_user(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<FoodRecord>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM food_records WHERE user_id = $1 ORDER BY record_date DESC"
    );
    let rows = sqlx::query_as::<_, FoodRecord>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list food records")?;
    Ok(rows)
}

pub async fn find(db: &PgPool, record_id: i64) -> anyhow::Result<Option<FoodRecord>> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM food_records WHERE record_id = $1");
    let row = sqlx::query_as::<_, FoodRecord>(&sql)
        .bind(record_id)
        .fetch_optional(db)
        .await
        .context("find food record")?;
    Ok(row)
}

/// Overwrites date, meal type and counts. A `None` image keeps the stored
/// one. Returns the resulting image url, or `None` when no row matched.
pub async fn update(
    db: &PgPool,
    record_id: i64,
    record_date: PrimitiveDateTime,
    image_url: Option<&str>,
    meal_type: &str,
    counts: &ServeCounts,
) -> anyhow::Result<Option<Option<String>>> {
    let row = sqlx::query_scalar::<_, Option<String>>(
        r#"
        UPDATE food_records
           SET record_date = $1,
               meal_type = $2,
               vegetables = $3,
               fruit = $4,
               grains = $5,
               meat = $6,
               dairy = $7,
               extras = $8,
               image_url = COALESCE($9, image_url)
         WHERE record_id = $10
        RETURNING image_url
        "#,
    )
    .bind(record_date)
    .bind(meal_type)
    .bind(counts.vegetables)
    .bind(counts.fruit)
    .bind(counts.grains)
    .bind(counts.meat)
    .bind(counts.dairy)
    .bind(counts.extras)
    .bind(image_url)
    .bind(record_id)
    .fetch_optional(db)
    .await
    .context("update food record")?;
    Ok(row)
}

pub async fn delete(db: &PgPool, record_id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM food_records WHERE record_id = $1")
        .bind(record_id)
        .execute(db)
        .await
        .context("delete food record")?;
    Ok(res.rows_affected())
}
