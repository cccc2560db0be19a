use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Row in `recipes`. Field names on the wire match what the app decodes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    #[serde(rename = "recipe_ID")]
    pub recipe_id: i64,
    pub recipe_name: String,
    pub short_instruction: Option<String>,
    pub instructions: Option<String>,
    #[serde(rename = "image_URL")]
    pub image_url: String,
    pub traffic_lights: Value,
    pub food_type: String,
    pub source: Option<String>,
    pub ingredients: Option<Value>,
    pub method: Option<String>,
    pub hint: Option<String>,
    pub dressing: Option<Value>,
    pub variation: Option<String>,
    pub is_recommend: bool,
}

/// Row in `user_favorites`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Favorite {
    pub user_id: i64,
    #[serde(rename = "recipe_ID")]
    pub recipe_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
