use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Six per-category serve values. Used both for consumed totals and for goals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Servings {
    pub vegetables: f64,
    pub fruits: f64,
    pub grains: f64,
    pub meat: f64,
    pub dairy: f64,
    pub extras: f64,
}

/// One normalized-path entry: a meal record's amount and the category of its food.
#[derive(Debug, Clone, FromRow)]
pub struct MealAmountRow {
    pub food_category: Option<String>,
    pub amount: f64,
}
