use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{instrument, warn};

use super::dto::{
    AddFoodRequest, AddedFood, DeletedRows, FoodItem, MealRecordFilter, MealRecordItem,
    UpdateFoodRequest, UpdatedFood,
};
use super::{repo, services};
use crate::{
    dates,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::Envelope,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/foods", get(list_foods).post(add_food))
        .route("/foods/:id", put(update_food).delete(delete_food))
        // GET takes a user id, DELETE a food id
        .route(
            "/meal-records/:id",
            get(list_meal_records).delete(delete_meal_records),
        )
}

#[instrument(skip(state))]
pub async fn list_foods(State(state): State<AppState>) -> ApiResult<Json<Envelope<Vec<FoodItem>>>> {
    let foods = repo::list_foods(&state.db).await?;
    let items = foods
        .into_iter()
        .map(|f| FoodItem {
            local_id: f.id.to_string(),
            db_id: f.id,
            name: f.name,
            calories: f.calories,
            unit: f.unit,
            amount: f.amount,
            food_category: f.food_category,
        })
        .collect();
    Ok(Json(Envelope::ok("Query successful", items)))
}

#[instrument(skip(state, body))]
pub async fn add_food(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddFoodRequest>,
) -> ApiResult<Json<Envelope<AddedFood>>> {
    let food = body.validate().map_err(|e| {
        warn!(error = %e, "add food rejected");
        ApiError::bad_request(e.to_string())
    })?;
    let instant = food.date.unwrap_or_else(OffsetDateTime::now_utc);
    let record_date = dates::meal_record_timestamp(instant, state.config.record_offset_hours)
        .ok_or_else(|| ApiError::bad_request("date is out of range"))?;

    let ids = services::add_food(&state.db, record_date, &food).await?;

    Ok(Json(Envelope::ok(
        "Added successfully",
        AddedFood {
            id: ids.meal_record_id.to_string(),
            food_id: ids.food_id,
            name: food.name,
            calories: food.calories,
            unit: food.unit,
            amount: food.amount,
            meal_type: food.meal_type,
            record_date: dates::format_timestamp(record_date),
            food_category: food.food_category,
            image_url: state.config.image_url(food.image_url.as_deref()),
        },
    )))
}

#[instrument(skip(state))]
pub async fn list_meal_records(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(filter): Query<MealRecordFilter>,
) -> ApiResult<Json<Envelope<Vec<MealRecordItem>>>> {
    let day = match filter.date.as_deref().filter(|d| !d.is_empty()) {
        Some(raw) => Some(
            dates::parse_day(raw)
                .map_err(|_| ApiError::bad_request("date must be formatted as YYYY-MM-DD"))?,
        ),
        None => None,
    };
    let meal_type = filter.meal_type.as_deref().filter(|m| !m.is_empty());

    let rows = repo::list_meal_records(&state.db, user_id, day, meal_type).await?;
    let items = rows
        .into_iter()
        .map(|r| MealRecordItem {
            id: r.id.to_string(),
            food_id: r.food_id,
            name: r.name,
            calories: r.calories,
            unit: r.unit,
            amount: r.amount,
            meal_type: r.meal_type,
            record_date: dates::format_day(r.record_date.date()),
            food_category: r.food_category,
            image_url: state.config.image_url(r.image_url.as_deref()),
        })
        .collect();
    Ok(Json(Envelope::ok("Query successful", items)))
}

#[instrument(skip(state, body))]
pub async fn update_food(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateFoodRequest>,
) -> ApiResult<Json<Envelope<UpdatedFood>>> {
    body.validate().map_err(|e| {
        warn!(food_id = id, error = %e, "update food rejected");
        ApiError::bad_request(e.to_string())
    })?;

    let links = services::update_food(&state.db, id, &body)
        .await?
        .ok_or_else(|| ApiError::not_found("Food not found"))?;

    Ok(Json(Envelope::ok(
        "Record updated",
        UpdatedFood {
            id,
            name: body.name,
            calories: body.calories,
            unit: body.unit,
            amount: body.amount,
            food_category: links.food_category,
            image_url: state.config.image_url(links.image_url.as_deref()),
        },
    )))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Envelope<DeletedRows>>> {
    match services::delete_food(&state.db, id).await? {
        Some(rows) => Ok(Json(Envelope::ok("Food deleted successfully", rows))),
        None => Ok(Json(Envelope::rejected("Food not found", DeletedRows::default()))),
    }
}

#[instrument(skip(state))]
pub async fn delete_meal_records(
    State(state): State<AppState>,
    Path(food_id): Path<i64>,
) -> ApiResult<Json<Envelope<DeletedRows>>> {
    let rows = services::delete_meal_records_by_food(&state.db, food_id).await?;
    let message = if rows.meals > 0 {
        "Record completely deleted"
    } else {
        "No records found to delete"
    };
    Ok(Json(Envelope::ok(message, rows)))
}
