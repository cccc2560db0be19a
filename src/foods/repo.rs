use anyhow::Context;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use time::{Date, PrimitiveDateTime};

use super::repo_types::{Food, MealRecordLink, MealRecordRow};

pub async fn list_foods(db: &PgPool) -> anyhow::Result<Vec<Food>> {
    let rows = sqlx::query_as::<_, Food>(
        r#"
        SELECT id, name, calories, unit, amount, user_id, food_category, created_at
          FROM foods
         ORDER BY id DESC
        "#,
    )
    .fetch_all(db)
    .await
    .context("list foods")?;
    Ok(rows)
}

pub async fn insert_food_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    calories: i32,
    unit: &str,
    amount: f64,
    user_id: i64,
    food_category: Option<&str>,
) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO foods (name, calories, unit, amount, user_id, food_category)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(calories)
    .bind(unit)
    .bind(amount)
    .bind(user_id)
    .bind(food_category)
    .fetch_one(&mut **tx)
    .await
    .context("insert food")?;
    Ok(id)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_meal_record_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    food_id: i64,
    amount: f64,
    meal_type: &str,
    food_category: Option<&str>,
    image_url: Option<&str>,
    record_date: PrimitiveDateTime,
) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO meal_records (user_id, food_id, amount, meal_type, food_category, image_url, record_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(food_id)
    .bind(amount)
    .bind(meal_type)
    .bind(food_category)
    .bind(image_url)
    .bind(record_date)
    .fetch_one(&mut **tx)
    .await
    .context("insert meal record")?;
    Ok(id)
}

/// Meal records of a user joined with their foods, newest first.
pub async fn list_meal_records(
    db: &PgPool,
    user_id: i64,
    day: Option<Date>,
    meal_type: Option<&str>,
) -> anyhow::Result<Vec<MealRecordRow>> {
    let mut qb = QueryBuilder::<Postgres>::new(
        r#"
        SELECT mr.id, mr.food_id, f.name, f.calories, f.unit, mr.amount,
               mr.meal_type, mr.record_date, mr.food_category, mr.image_url
          FROM meal_records mr
          JOIN foods f ON mr.food_id = f.id
         WHERE mr.user_id = "#,
    );
    qb.push_bind(user_id);
    if let Some(day) = day {
        qb.push(" AND mr.record_date::date = ").push_bind(day);
    }
    if let Some(meal_type) = meal_type {
        qb.push(" AND mr.meal_type = ").push_bind(meal_type.to_string());
    }
    qb.push(" ORDER BY mr.record_date DESC, mr.meal_type");

    let rows = qb
        .build_query_as::<MealRecordRow>()
        .fetch_all(db)
        .await
        .context("list meal records")?;
    Ok(rows)
}

pub async fn food_category_tx(
    tx: &mut Transaction<'_, Postgres>,
    food_id: i64,
) -> anyhow::Result<Option<Option<String>>> {
    let row = sqlx::query_scalar::<_, Option<String>>(
        "SELECT food_category FROM foods WHERE id = $1 FOR UPDATE",
    )
    .bind(food_id)
    .fetch_optional(&mut **tx)
    .await
    .context("select food category")?;
    Ok(row)
}

pub async fn update_food_tx(
    tx: &mut Transaction<'_, Postgres>,
    food_id: i64,
    name: &str,
    calories: i32,
    unit: &str,
    amount: f64,
    food_category: Option<&str>,
) -> anyhow::Result<u64> {
    let res = sqlx::query(
        r#"
        UPDATE foods
           SET name = $1, calories = $2, unit = $3, amount = $4, food_category = $5
         WHERE id = $6
        "#,
    )
    .bind(name)
    .bind(calories)
    .bind(unit)
    .bind(amount)
    .bind(food_category)
    .bind(food_id)
    .execute(&mut **tx)
    .await
    .context("update food")?;
    Ok(res.rows_affected())
}

pub async fn meal_record_link_tx(
    tx: &mut Transaction<'_, Postgres>,
    food_id: i64,
) -> anyhow::Result<Option<MealRecordLink>> {
    let row = sqlx::query_as::<_, MealRecordLink>(
        "SELECT food_category, image_url FROM meal_records WHERE food_id = $1 ORDER BY id LIMIT 1",
    )
    .bind(food_id)
    .fetch_optional(&mut **tx)
    .await
    .context("select meal record link")?;
    Ok(row)
}

/// A `None` image keeps the stored one.
pub async fn update_meal_records_for_food_tx(
    tx: &mut Transaction<'_, Postgres>,
    food_id: i64,
    amount: f64,
    food_category: Option<&str>,
    image_url: Option<&str>,
) -> anyhow::Result<u64> {
    let res = sqlx::query(
        r#"
        UPDATE meal_records
           SET amount = $1,
               food_category = $2,
               image_url = COALESCE($3, image_url)
         WHERE food_id = $4
        "#,
    )
    .bind(amount)
    .bind(food_category)
    .bind(image_url)
    .bind(food_id)
    .execute(&mut **tx)
    .await
    .context("update meal records")?;
    Ok(res.rows_affected())
}

pub async fn food_exists_tx(tx: &mut Transaction<'_, Postgres>, food_id: i64) -> anyhow::Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM foods WHERE id = $1)")
        .bind(food_id)
        .fetch_one(&mut **tx)
        .await
        .context("check food exists")?;
    Ok(exists)
}

pub async fn delete_meal_records_for_food_tx(
    tx: &mut Transaction<'_, Postgres>,
    food_id: i64,
) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM meal_records WHERE food_id = $1")
        .bind(food_id)
        .execute(&mut **tx)
        .await
        .context("delete meal records")?;
    Ok(res.rows_affected())
}

pub async fn delete_food_tx(tx: &mut Transaction<'_, Postgres>, food_id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM foods WHERE id = $1")
        .bind(food_id)
        .execute(&mut **tx)
        .await
        .context("delete food")?;
    Ok(res.rows_affected())
}
