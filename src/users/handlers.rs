use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use time::Date;
use tracing::{info, instrument, warn};

use super::dto::{
    LoggedIn, LoginRequest, SignedUp, SignupRequest, UpdatePasswordRequest, UpdateUserRequest,
    UserProfile,
};
use super::password::is_valid_email;
use super::repo::ProfileUpdate;
use super::repo_types::User;
use super::services::{self, Signup, SignupOutcome};
use crate::{
    dates,
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::Envelope,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/user/:user_id", get(get_user).put(update_user))
        .route("/user/:user_id/updatePassword", put(update_password))
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_dob(raw: Option<&str>) -> ApiResult<Option<Date>> {
    raw.map(dates::parse_day)
        .transpose()
        .map_err(|_| ApiError::bad_request("dob must be formatted as YYYY-MM-DD"))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> ApiResult<Json<Envelope<SignedUp>>> {
    let (Some(username), Some(password), Some(email)) = (
        non_empty(&payload.username),
        payload.password.as_deref().filter(|p| !p.is_empty()),
        non_empty(&payload.email),
    ) else {
        return Err(ApiError::bad_request(
            "Username, password and email are required",
        ));
    };

    if !is_valid_email(email) {
        warn!(%email, "invalid email");
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let req = Signup {
        username,
        password,
        email,
        phone: non_empty(&payload.phone),
        first_name: non_empty(&payload.first_name),
        last_name: non_empty(&payload.last_name),
        dob: parse_dob(non_empty(&payload.dob))?,
    };

    Ok(Json(match services::signup(&state.db, &req).await? {
        SignupOutcome::Created(user_id) => {
            Envelope::ok("Registration successful", SignedUp { user_id })
        }
        SignupOutcome::UsernameTaken => Envelope::declined("Username already exists"),
        SignupOutcome::EmailTaken => Envelope::declined("Email already exists"),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<Json<Envelope<LoggedIn>>> {
    match services::login(&state.db, &payload.username, &payload.password).await? {
        Some(user) => Ok(Json(Envelope::ok(
            "Login successful",
            LoggedIn {
                id: user.user_id,
                username: user.username.unwrap_or(user.email),
            },
        ))),
        None => {
            warn!("login failed: invalid credentials");
            Ok(Json(Envelope::declined("Invalid username or password")))
        }
    }
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Envelope<UserProfile>>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(Envelope::ok("Query successful", UserProfile::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    let (Some(first_name), Some(last_name), Some(email)) = (
        non_empty(&payload.first_name),
        non_empty(&payload.last_name),
        non_empty(&payload.email),
    ) else {
        return Err(ApiError::bad_request(
            "Missing required fields: firstName, lastName, email",
        ));
    };
    if !is_valid_email(email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }

    let joined_year = non_empty(&payload.joined_year)
        .map(str::to_string)
        .unwrap_or_else(services::current_year);
    let update = ProfileUpdate {
        first_name,
        last_name,
        gender: non_empty(&payload.gender),
        dob: parse_dob(non_empty(&payload.dob))?,
        phone: non_empty(&payload.phone),
        email,
        username: non_empty(&payload.username).unwrap_or(email),
        joined_year: &joined_year,
    };

    if User::update_profile(&state.db, user_id, &update).await? == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    info!(user_id, "profile updated");
    Ok(Json(Envelope::done("User information updated successfully")))
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    ApiJson(payload): ApiJson<UpdatePasswordRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    let new_password = payload
        .new_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required field: newPassword"))?;

    if services::update_password(&state.db, user_id, new_password).await? == 0 {
        return Err(ApiError::not_found("User not found"));
    }
    info!(user_id, "password updated");
    Ok(Json(Envelope::done("Password updated successfully")))
}
