use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, info, instrument};

use super::dto::{FavoriteRequest, RecipeIdsRequest, SearchRequest};
use super::repo;
use super::repo_types::{Favorite, Recipe};
use crate::{
    error::{ApiError, ApiResult},
    extract::ApiJson,
    response::Envelope,
    state::AppState,
};

// Recipe listings are bare arrays; the app decodes `[Recipe]` directly.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recommended))
        .route("/search", post(search))
        .route("/favorites/:user_id", get(list_favorites))
        .route("/favorites/add", post(add_favorite))
        .route("/favorites/remove", post(remove_favorite))
        .route("/user-favorite-recipes/:user_id", get(favorite_recipes))
        .route("/recipes/favorites", post(recipes_by_ids))
}

#[instrument(skip(state))]
pub async fn list_recommended(State(state): State<AppState>) -> ApiResult<Json<Vec<Recipe>>> {
    Ok(Json(repo::list_recommended(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SearchRequest>,
) -> ApiResult<Json<Vec<Recipe>>> {
    let query = body
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Search parameter cannot be empty"))?;
    let recipes = repo::search_by_name(&state.db, query).await?;
    debug!(query, hits = recipes.len(), "recipe search");
    Ok(Json(recipes))
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Favorite>>> {
    Ok(Json(repo::list_favorites(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn add_favorite(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FavoriteRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    let (user_id, recipe_id) = body
        .ids()
        .ok_or_else(|| ApiError::bad_request("User ID and Recipe ID cannot be empty"))?;
    repo::add_favorite(&state.db, user_id, recipe_id).await?;
    info!(user_id, recipe_id, "favorite added");
    Ok(Json(Envelope::done("Successfully added to favorites")))
}

#[instrument(skip(state))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FavoriteRequest>,
) -> ApiResult<Json<Envelope<()>>> {
    let (user_id, recipe_id) = body
        .ids()
        .ok_or_else(|| ApiError::bad_request("User ID and Recipe ID cannot be empty"))?;
    let removed = repo::remove_favorite(&state.db, user_id, recipe_id).await?;
    info!(user_id, recipe_id, removed, "favorite removed");
    Ok(Json(Envelope::done("Successfully removed from favorites")))
}

#[instrument(skip(state))]
pub async fn favorite_recipes(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Recipe>>> {
    Ok(Json(repo::favorite_recipes(&state.db, user_id).await?))
}

#[instrument(skip(state, body))]
pub async fn recipes_by_ids(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RecipeIdsRequest>,
) -> ApiResult<Json<Vec<Recipe>>> {
    if body.recipe_ids.is_empty() {
        return Err(ApiError::bad_request("Recipe ID list cannot be empty"));
    }
    Ok(Json(repo::find_by_ids(&state.db, &body.recipe_ids).await?))
}
