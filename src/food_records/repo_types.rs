use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{OffsetDateTime, PrimitiveDateTime};

/// Row in `food_records`.
#[derive(Debug, Clone, FromRow)]
pub struct FoodRecord {
    pub record_id: i64,
    pub user_id: i64,
    pub record_date: PrimitiveDateTime,
    pub image_url: Option<String>,
    pub meal_type: String,
    pub vegetables: i32,
    pub fruit: i32,
    pub grains: i32,
    pub meat: i32,
    pub dairy: i32,
    pub extras: i32,
    pub created_at: OffsetDateTime,
}

/// The six serve counts of one capture, named after the `food_records` columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServeCounts {
    pub vegetables: i32,
    pub fruit: i32,
    pub grains: i32,
    pub meat: i32,
    pub dairy: i32,
    pub extras: i32,
}

impl ServeCounts {
    pub fn named(&self) -> [(&'static str, i32); 6] {
        [
            ("vegetables", self.vegetables),
            ("fruit", self.fruit),
            ("grains", self.grains),
            ("meat", self.meat),
            ("dairy", self.dairy),
            ("extras", self.extras),
        ]
    }
}
