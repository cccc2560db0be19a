use anyhow::Context;
use sqlx::PgPool;

use super::repo_types::{Favorite, Recipe};

const RECIPE_COLUMNS: &str = "r.recipe_id, r.recipe_name, r.short_instruction, r.instructions, \
     r.image_url, r.traffic_lights, r.food_type, r.source, r.ingredients, r.method, r.hint, \
     r.dressing, r.variation, r.is_recommend";

pub async fn list_recommended(db: &PgPool) -> anyhow::Result<Vec<Recipe>> {
    let sql = format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.is_recommend ORDER BY r.recipe_id"
    );
    let rows = sqlx::query_as::<_, Recipe>(&sql)
        .fetch_all(db)
        .await
        .context("list recommended recipes")?;
    Ok(rows)
}

/// Case-insensitive substring match on the recipe name. `pattern` is
/// matched literally.
pub async fn search_by_name(db: &PgPool, pattern: &str) -> anyhow::Result<Vec<Recipe>> {
    let sql = format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r \
         WHERE r.recipe_name ILIKE '%' || $1 || '%' ORDER BY r.recipe_id"
    );
    let rows = sqlx::query_as::<_, Recipe>(&sql)
        .bind(escape_like(pattern))
        .fetch_all(db)
        .await
        .context("search recipes")?;
    Ok(rows)
}

pub async fn find_by_ids(db: &PgPool, ids: &[i64]) -> anyhow::Result<Vec<Recipe>> {
    let sql = format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.recipe_id = ANY($1) ORDER BY r.recipe_id"
    );
    let rows = sqlx::query_as::<_, Recipe>(&sql)
        .bind(ids)
        .fetch_all(db)
        .await
        .context("recipes by id")?;
    Ok(rows)
}

pub async fn favorite_recipes(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<Recipe>> {
    let sql = format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r \
         JOIN user_favorites uf ON uf.recipe_id = r.recipe_id \
         WHERE uf.user_id = $1 ORDER BY uf.created_at DESC"
    );
    let rows = sqlx::query_as::<_, Recipe>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("favorite recipes")?;
    Ok(rows)
}

pub async fn list_favorites(db: &PgPool, user_id: i64) -> anyhow::Result<Vec<Favorite>> {
    let rows = sqlx::query_as::<_, Favorite>(
        "SELECT user_id, recipe_id, created_at FROM user_favorites WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list favorites")?;
    Ok(rows)
}

/// Adding an existing favorite refreshes its timestamp.
pub async fn add_favorite(db: &PgPool, user_id: i64, recipe_id: i64) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_favorites (user_id, recipe_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, recipe_id) DO UPDATE SET created_at = now()
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .execute(db)
    .await
    .context("add favorite")?;
    Ok(())
}

pub async fn remove_favorite(db: &PgPool, user_id: i64, recipe_id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM user_favorites WHERE user_id = $1 AND recipe_id = $2")
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await
        .context("remove favorite")?;
    Ok(res.rows_affected())
}

pub(crate) fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
