use anyhow::Context;
use sqlx::PgPool;
use time::PrimitiveDateTime;
use tracing::{debug, info};

use super::dto::{DeletedRows, NewFood, UpdateFoodRequest};
use super::repo;

pub struct AddedIds {
    pub food_id: i64,
    pub meal_record_id: i64,
}

/// Inserts the food and its meal record in one transaction.
pub async fn add_food(
    db: &PgPool,
    record_date: PrimitiveDateTime,
    food: &NewFood,
) -> anyhow::Result<AddedIds> {
    let mut tx = db.begin().await.context("begin tx")?;
    let food_id = repo::insert_food_tx(
        &mut tx,
        &food.name,
        food.calories,
        &food.unit,
        food.amount,
        food.user_id,
        food.food_category.as_deref(),
    )
    .await?;
    let meal_record_id = repo::insert_meal_record_tx(
        &mut tx,
        food.user_id,
        food_id,
        food.amount,
        &food.meal_type,
        food.food_category.as_deref(),
        food.image_url.as_deref(),
        record_date,
    )
    .await?;
    tx.commit().await.context("commit tx")?;

    info!(user_id = food.user_id, food_id, meal_record_id, "food added");
    Ok(AddedIds {
        food_id,
        meal_record_id,
    })
}

pub struct UpdatedFoodLinks {
    pub food_category: Option<String>,
    pub image_url: Option<String>,
}

/// Updates a food and the meal records pointing at it. Category and image
/// fall back to what is already stored when the request leaves them out.
/// Returns `None` when the food does not exist.
pub async fn update_food(
    db: &PgPool,
    food_id: i64,
    req: &UpdateFoodRequest,
) -> anyhow::Result<Option<UpdatedFoodLinks>> {
    let mut tx = db.begin().await.context("begin tx")?;

    let Some(current_category) = repo::food_category_tx(&mut tx, food_id).await? else {
        tx.rollback().await.context("rollback tx")?;
        return Ok(None);
    };
    let requested = req.requested_category().map(str::to_string);
    let food_category = requested.clone().or(current_category);

    repo::update_food_tx(
        &mut tx,
        food_id,
        &req.name,
        req.calories,
        &req.unit,
        req.amount,
        food_category.as_deref(),
    )
    .await?;

    let link = repo::meal_record_link_tx(&mut tx, food_id).await?;
    let meal_category = requested.or_else(|| link.as_ref().and_then(|l| l.food_category.clone()));
    let image_url = req
        .image_url
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| link.and_then(|l| l.image_url));

    let meals = repo::update_meal_records_for_food_tx(
        &mut tx,
        food_id,
        req.amount,
        meal_category.as_deref(),
        image_url.as_deref(),
    )
    .await?;
    tx.commit().await.context("commit tx")?;

    debug!(food_id, meals, "food updated");
    Ok(Some(UpdatedFoodLinks {
        food_category,
        image_url,
    }))
}

/// Deletes a food together with its meal records. `None` when there is no such food.
pub async fn delete_food(db: &PgPool, food_id: i64) -> anyhow::Result<Option<DeletedRows>> {
    let mut tx = db.begin().await.context("begin tx")?;

    if !repo::food_exists_tx(&mut tx, food_id).await? {
        tx.rollback().await.context("rollback tx")?;
        return Ok(None);
    }

    let meals = repo::delete_meal_records_for_food_tx(&mut tx, food_id).await?;
    let foods = repo::delete_food_tx(&mut tx, food_id).await?;
    tx.commit().await.context("commit tx")?;

    info!(food_id, meals, foods, "food deleted");
    Ok(Some(DeletedRows { meals, foods }))
}

/// Deletes the meal records of a food, and the food itself only if any
/// meal record was removed.
pub async fn delete_meal_records_by_food(db: &PgPool, food_id: i64) -> anyhow::Result<DeletedRows> {
    let mut tx = db.begin().await.context("begin tx")?;

    let meals = repo::delete_meal_records_for_food_tx(&mut tx, food_id).await?;
    let foods = if meals > 0 {
        repo::delete_food_tx(&mut tx, food_id).await?
    } else {
        0
    };
    tx.commit().await.context("commit tx")?;

    info!(food_id, meals, foods, "meal records deleted");
    Ok(DeletedRows { meals, foods })
}
