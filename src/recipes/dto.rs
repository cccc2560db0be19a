use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

/// Body of `/favorites/add` and `/favorites/remove`.
#[derive(Debug, Deserialize)]
pub struct FavoriteRequest {
    pub user_id: Option<i64>,
    #[serde(rename = "recipe_ID")]
    pub recipe_id: Option<i64>,
}

impl FavoriteRequest {
    pub fn ids(&self) -> Option<(i64, i64)> {
        match (self.user_id, self.recipe_id) {
            (Some(u), Some(r)) if u > 0 && r > 0 => Some((u, r)),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecipeIdsRequest {
    #[serde(default)]
    pub recipe_ids: Vec<i64>,
}
