use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use time::{OffsetDateTime, PrimitiveDateTime};
use tracing::{info, instrument, warn};

use super::dto::{
    CreateRecordRequest, CreatedRecord, DeletedRecords, RecordInput, RecordItem,
    UpdateRecordRequest, UpdatedRecord,
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
        .route("/food-records", post(create_record))
        .route("/food-records/user/:user_id", get(list_records))
        .route(
            "/food-records/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
}

fn invalid_count(category: &'static str) -> ApiError {
    warn!(category, "negative serve count");
    ApiError::bad_request(format!("Invalid quantity for {category}"))
}

fn parse_record_date(raw: &str) -> ApiResult<OffsetDateTime> {
    services::parse_capture_instant(raw)
        .map_err(|_| ApiError::bad_request("recordDate must be an RFC 3339 timestamp"))
}

fn capture_date(state: &AppState, captured_at: OffsetDateTime) -> ApiResult<PrimitiveDateTime> {
    dates::capture_timestamp(captured_at, state.config.record_offset_hours)
        .ok_or_else(|| ApiError::bad_request("recordDate is out of range"))
}

fn meal_type(raw: Option<&str>) -> Option<String> {
    raw.map(|m| m.trim().to_string()).filter(|m| !m.is_empty())
}

/// POST /food-records
#[instrument(skip(state, body))]
pub async fn create_record(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateRecordRequest>,
) -> ApiResult<Json<Envelope<CreatedRecord>>> {
    let missing =
        || ApiError::bad_request("Missing required fields: userId/user_id, recordDate, or mealType");
    let user_id = body.user_id().ok_or_else(missing)?;
    let raw_date = body
        .record_date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(missing)?;
    let meal_type = meal_type(body.meal_type.as_deref()).ok_or_else(missing)?;

    let input = RecordInput {
        record_date: capture_date(&state, parse_record_date(raw_date)?)?,
        meal_type,
        image_url: body.image_url.clone().filter(|u| !u.is_empty()),
        counts: body.counts().map_err(invalid_count)?,
    };

    let record_id = services::create(&state.db, user_id, &input).await?;
    Ok(Json(Envelope::ok(
        "Food record created successfully",
        CreatedRecord { record_id },
    )))
}

/// GET /food-records/user/:user_id
#[instrument(skip(state))]
pub async fn list_records(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Envelope<Vec<RecordItem>>>> {
    let rows = repo::list_by_user(&state.db, user_id).await?;
    let items = rows
        .into_iter()
        .map(|r| {
            let image = state.config.image_url(r.image_url.as_deref());
            RecordItem::from_row(r, image)
        })
        .collect();
    Ok(Json(Envelope::ok("Query successful", items)))
}

/// GET /food-records/:id
#[instrument(skip(state))]
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Envelope<RecordItem>>> {
    let row = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Food record not found"))?;
    let image = state.config.image_url(row.image_url.as_deref());
    Ok(Json(Envelope::ok("Query successful", RecordItem::from_row(row, image))))
}

/// PUT /food-records/:id
#[instrument(skip(state, body))]
pub async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<UpdateRecordRequest>,
) -> ApiResult<Json<Envelope<UpdatedRecord>>> {
    let meal_type = meal_type(body.meal_type.as_deref())
        .ok_or_else(|| ApiError::bad_request("Missing required field: mealType"))?;
    let captured_at = match body.record_date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_record_date(raw)?,
        None => OffsetDateTime::now_utc(),
    };

    let input = RecordInput {
        record_date: capture_date(&state, captured_at)?,
        meal_type,
        image_url: body.image_url().map(str::to_string),
        counts: body.counts.resolve().map_err(invalid_count)?,
    };

    let image = services::update(&state.db, id, &input)
        .await?
        .ok_or_else(|| ApiError::not_found("Food record not found"))?;

    Ok(Json(Envelope::ok(
        "Record updated successfully",
        UpdatedRecord {
            image_url: state.config.image_url(image.as_deref()),
        },
    )))
}

/// DELETE /food-records/:id
#[instrument(skip(state))]
pub async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Envelope<DeletedRecords>>> {
    let food_records = repo::delete(&state.db, id).await?;
    if food_records == 0 {
        return Ok(Json(Envelope::rejected(
            "Record not found",
            DeletedRecords::default(),
        )));
    }
    info!(record_id = id, "food record deleted");
    Ok(Json(Envelope::ok(
        "Food record deleted successfully",
        DeletedRecords { food_records },
    )))
}
