use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use time::Date;
use tracing::{info, instrument};

use super::dto::{Category, DayQuery, ProgressData, UpdateGoalRequest, UserQuery};
use super::repo_types::Servings;
use super::services;
use crate::{
    dates,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::Envelope,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition_progress", get(nutrition_progress))
        .route("/goal_settings", get(goal_settings))
        .route("/update_goal", post(update_goal))
        .route("/daily_intake", get(daily_intake))
        .route("/daily_nutrition", get(daily_nutrition))
}

/// GET /nutrition_progress?userId=..&date=YYYY-MM-DD (date defaults to today)
#[instrument(skip(state))]
pub async fn nutrition_progress(
    State(state): State<AppState>,
    Query(q): Query<DayQuery>,
) -> ApiResult<Json<Envelope<ProgressData>>> {
    let user_id = parse_user_id(q.user_id.as_deref())?;
    let day = match q.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => parse_date(raw)?,
        None => dates::today_utc(),
    };

    let progress = services::compute_progress(state.nutrition.as_ref(), user_id, day).await?;

    Ok(Json(Envelope::ok(
        "Nutrition progress data fetched successfully",
        ProgressData {
            user_id,
            date: dates::format_day(day),
            total_progress: progress.total_progress,
            categories: progress.categories,
        },
    )))
}

/// GET /goal_settings?userId=..
#[instrument(skip(state))]
pub async fn goal_settings(
    State(state): State<AppState>,
    Query(q): Query<UserQuery>,
) -> ApiResult<Json<Servings>> {
    let user_id = parse_user_id(q.user_id.as_deref())?;
    let goals = services::goals_or_defaults(state.nutrition.as_ref(), user_id).await?;
    Ok(Json(goals))
}

/// POST /update_goal {userId, vegetables, fruits, grains, meat, dairy, extras}
#[instrument(skip(state, body))]
pub async fn update_goal(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateGoalRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    let user_id = match body.user_id {
        Some(id) if id > 0 => id,
        Some(_) => return Err(ApiError::bad_request("User ID must be a positive integer")),
        None => return Err(ApiError::bad_request("User ID cannot be null!")),
    };
    let goals = body
        .goals()
        .map_err(|category| ApiError::bad_request(format!("Missing goal value: {category}")))?;
    validate_goals(&goals)?;

    services::upsert_goals(state.nutrition.as_ref(), user_id, &goals).await?;
    info!(user_id, "goals updated");
    Ok(Json(Envelope::done("Goals updated successfully!")))
}

/// GET /daily_intake?userId=..&date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn daily_intake(
    State(state): State<AppState>,
    Query(q): Query<DayQuery>,
) -> ApiResult<Json<Servings>> {
    let (user_id, day) = required_day(&q)?;
    let intake = services::compute_daily_intake(state.nutrition.as_ref(), user_id, day).await?;
    Ok(Json(intake))
}

/// GET /daily_nutrition?userId=..&date=YYYY-MM-DD (photo captures only)
#[instrument(skip(state))]
pub async fn daily_nutrition(
    State(state): State<AppState>,
    Query(q): Query<DayQuery>,
) -> ApiResult<Json<Servings>> {
    let (user_id, day) = required_day(&q)?;
    let intake = services::compute_legacy_intake(state.nutrition.as_ref(), user_id, day).await?;
    Ok(Json(intake))
}

fn required_day(q: &DayQuery) -> ApiResult<(i64, Date)> {
    let raw_date = q
        .date
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("User ID and date are required"))?;
    let user_id = parse_user_id(q.user_id.as_deref())?;
    Ok((user_id, parse_date(raw_date)?))
}

fn parse_user_id(raw: Option<&str>) -> ApiResult<i64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("User ID is required"))?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::bad_request("User ID must be a positive integer")),
    }
}

const MAX_GOAL: f64 = 999.99;

fn parse_date(raw: &str) -> ApiResult<Date> {
    dates::parse_day(raw).map_err(|_| ApiError::bad_request("date must be formatted as YYYY-MM-DD"))
}

/// Goal columns are NUMERIC(5,2); anything above 999.99 would round out of range.
fn validate_goals(goals: &Servings) -> ApiResult<()> {
    for category in Category::ALL {
        let value = goals.get(category);
        if !value.is_finite() || !(0.0..=MAX_GOAL).contains(&value) {
            return Err(ApiError::bad_request(format!(
                "{} goal must be between 0 and 999.99",
                category.key()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app::build_app, nutrition::repo::MemoryNutritionStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use time::macros::date;
    use tower::ServiceExt;

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn app_with(store: Arc<MemoryNutritionStore>) -> Router {
        build_app(AppState::fake_with_nutrition(store))
    }

    #[test]
    fn user_id_parsing() {
        assert_eq!(parse_user_id(Some("42")).unwrap(), 42);
        assert_eq!(parse_user_id(Some(" 7 ")).unwrap(), 7);
        assert!(parse_user_id(None).is_err());
        assert!(parse_user_id(Some("")).is_err());
        assert!(parse_user_id(Some("0")).is_err());
        assert!(parse_user_id(Some("abc")).is_err());
    }

    #[test]
    fn goal_validation_rejects_out_of_range_values() {
        assert!(validate_goals(&crate::nutrition::dto::DEFAULT_GOALS).is_ok());
        let mut goals = Servings::default();
        goals.meat = -1.0;
        assert!(validate_goals(&goals).is_err());
        goals.meat = 1000.0;
        assert!(validate_goals(&goals).is_err());
        goals.meat = 999.996;
        assert!(validate_goals(&goals).is_err());
        goals.meat = 999.99;
        assert!(validate_goals(&goals).is_ok());
    }

    #[tokio::test]
    async fn progress_requires_user_id() {
        let app = app_with(Arc::default());
        let (status, body) = send(app, get("/api/nutrition_progress?date=2025-03-14")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "User ID is required");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn progress_rejects_malformed_date() {
        let app = app_with(Arc::default());
        let (status, _) = send(app, get("/api/nutrition_progress?userId=1&date=14-03-2025")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn progress_response_shape() {
        let store = Arc::new(MemoryNutritionStore::default());
        store.push_meal_record(9, date!(2025 - 03 - 14), Some("vegetables"), 10.0);
        let app = app_with(store.clone());

        let (status, body) = send(app, get("/api/nutrition_progress?userId=9&date=2025-03-14")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["userId"], 9);
        assert_eq!(body["data"]["date"], "2025-03-14");

        let categories = body["data"]["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0]["name"], "Vegetables");
        assert_eq!(categories[0]["goalValue"], 5.0);
        assert_eq!(categories[0]["consumedValue"], 10.0);
        assert_eq!(categories[0]["progress"], 1.0);
        assert_eq!(categories[1]["name"], "Fruit");

        let total = body["data"]["totalProgress"].as_f64().unwrap();
        assert!((total - 1.0 / 6.0).abs() < 1e-9);
        assert!(store.stored_goals(9).is_some());
    }

    #[tokio::test]
    async fn progress_defaults_to_today() {
        let app = app_with(Arc::default());
        let (status, body) = send(app, get("/nutrition_progress?userId=3")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["date"], dates::format_day(dates::today_utc()));
    }

    #[tokio::test]
    async fn update_goal_then_read_back() {
        let store = Arc::new(MemoryNutritionStore::default());

        let (status, body) = send(
            app_with(store.clone()),
            post_json(
                "/api/update_goal",
                serde_json::json!({
                    "userId": 12, "vegetables": 6, "fruits": 3, "grains": 4,
                    "meat": 2, "dairy": 1.5, "extras": 0.25
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send(app_with(store), get("/api/goal_settings?userId=12")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vegetables"], 6.0);
        assert_eq!(body["dairy"], 1.5);
        assert_eq!(body["extras"], 0.25);
    }

    #[tokio::test]
    async fn update_goal_requires_user_id() {
        let app = app_with(Arc::default());
        let (status, body) = send(
            app,
            post_json("/update_goal", serde_json::json!({ "vegetables": 6 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn partial_goal_update_is_rejected_and_stores_nothing() {
        let store = Arc::new(MemoryNutritionStore::default());
        let (status, body) = send(
            app_with(store.clone()),
            post_json(
                "/api/update_goal",
                serde_json::json!({ "userId": 1, "vegetables": 6 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Missing goal value: fruits");
        assert_eq!(store.stored_goals(1), None);
    }

    #[tokio::test]
    async fn partial_goal_update_keeps_existing_goals() {
        let store = Arc::new(MemoryNutritionStore::default());
        let saved = crate::nutrition::dto::DEFAULT_GOALS;
        services::upsert_goals(store.as_ref(), 2, &saved).await.unwrap();

        let (status, _) = send(
            app_with(store.clone()),
            post_json(
                "/api/update_goal",
                serde_json::json!({ "userId": 2, "vegetables": 9, "extras": 1 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(store.stored_goals(2), Some(saved));
    }

    #[tokio::test]
    async fn goal_settings_falls_back_to_defaults() {
        let app = app_with(Arc::default());
        let (status, body) = send(app, get("/api/goal_settings?userId=77")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({
                "vegetables": 5.0, "fruits": 2.0, "grains": 5.0,
                "meat": 2.5, "dairy": 2.5, "extras": 0.5
            })
        );
    }

    #[tokio::test]
    async fn daily_intake_is_zero_without_rows() {
        let app = app_with(Arc::default());
        let (status, body) = send(app, get("/api/daily_intake?userId=5&date=2025-03-14")).await;
        assert_eq!(status, StatusCode::OK);
        for key in ["vegetables", "fruits", "grains", "meat", "dairy", "extras"] {
            assert_eq!(body[key], 0.0, "{key}");
        }
    }

    #[tokio::test]
    async fn daily_intake_requires_date() {
        let app = app_with(Arc::default());
        let (status, _) = send(app, get("/api/daily_intake?userId=5")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
