use sqlx::FromRow;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Row in `foods`.
#[derive(Debug, Clone, FromRow)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub calories: i32,
    pub unit: String,
    pub amount: f64,
    pub user_id: i64,
    pub food_category: Option<String>,
    pub created_at: OffsetDateTime,
}

/// `meal_records` joined with its food.
#[derive(Debug, Clone, FromRow)]
pub struct MealRecordRow {
    pub id: i64,
    pub food_id: i64,
    pub name: String,
    pub calories: i32,
    pub unit: String,
    pub amount: f64,
    pub meal_type: String,
    pub record_date: PrimitiveDateTime,
    pub food_category: Option<String>,
    pub image_url: Option<String>,
}

/// Category and image currently attached to a food's meal record.
#[derive(Debug, Clone, FromRow)]
pub struct MealRecordLink {
    pub food_category: Option<String>,
    pub image_url: Option<String>,
}
