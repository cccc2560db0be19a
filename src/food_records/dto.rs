use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

use super::repo_types::{FoodRecord, ServeCounts};
use crate::dates;

/// Serve counts as clients send them; any of the six may be left out.
#[derive(Debug, Default, Deserialize)]
pub struct CountsInput {
    pub vegetables: Option<i32>,
    pub fruit: Option<i32>,
    pub grains: Option<i32>,
    pub meat: Option<i32>,
    pub dairy: Option<i32>,
    pub extras: Option<i32>,
}

impl CountsInput {
    /// Missing counts become 0. The error names the first negative one.
    pub fn resolve(&self) -> Result<ServeCounts, &'static str> {
        let counts = ServeCounts {
            vegetables: self.vegetables.unwrap_or(0),
            fruit: self.fruit.unwrap_or(0),
            grains: self.grains.unwrap_or(0),
            meat: self.meat.unwrap_or(0),
            dairy: self.dairy.unwrap_or(0),
            extras: self.extras.unwrap_or(0),
        };
        match counts.named().into_iter().find(|(_, v)| *v < 0) {
            Some((name, _)) => Err(name),
            None => Ok(counts),
        }
    }
}

/// Body of `POST /food-records`. Counts come either nested under
/// `categories` or as top-level fields; the nested object wins.
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub user_id: Option<i64>,
    #[serde(rename = "userId")]
    pub user_id_camel: Option<i64>,
    #[serde(rename = "recordDate")]
    pub record_date: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(rename = "mealType")]
    pub meal_type: Option<String>,
    pub categories: Option<CountsInput>,
    #[serde(flatten)]
    pub counts: CountsInput,
}

impl CreateRecordRequest {
    pub fn user_id(&self) -> Option<i64> {
        self.user_id.or(self.user_id_camel).filter(|id| *id > 0)
    }

    pub fn counts(&self) -> Result<ServeCounts, &'static str> {
        self.categories.as_ref().unwrap_or(&self.counts).resolve()
    }
}

/// Body of `PUT /food-records/:id`.
#[derive(Debug, Deserialize)]
pub struct UpdateRecordRequest {
    #[serde(rename = "recordDate")]
    pub record_date: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url_camel: Option<String>,
    pub image_url: Option<String>,
    #[serde(rename = "mealType")]
    pub meal_type: Option<String>,
    #[serde(flatten)]
    pub counts: CountsInput,
}

impl UpdateRecordRequest {
    pub fn image_url(&self) -> Option<&str> {
        self.image_url_camel
            .as_deref()
            .filter(|u| !u.is_empty())
            .or(self.image_url.as_deref().filter(|u| !u.is_empty()))
    }
}

/// Validated input shared by create and update.
#[derive(Debug, Clone)]
pub struct RecordInput {
    pub record_date: PrimitiveDateTime,
    pub meal_type: String,
    pub image_url: Option<String>,
    pub counts: ServeCounts,
}

#[derive(Debug, Serialize)]
pub struct CreatedRecord {
    #[serde(rename = "recordId")]
    pub record_id: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdatedRecord {
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct DeletedRecords {
    #[serde(rename = "foodRecords")]
    pub food_records: u64,
}

#[derive(Debug, Serialize)]
pub struct RecordItem {
    pub record_id: i64,
    pub record_date: String,
    pub image_url: Option<String>,
    pub meal_type: String,
    pub vegetables: i32,
    pub fruit: i32,
    pub grains: i32,
    pub meat: i32,
    pub dairy: i32,
    pub extras: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl RecordItem {
    pub fn from_row(row: FoodRecord, image_url: Option<String>) -> Self {
        Self {
            record_id: row.record_id,
            record_date: dates::format_timestamp(row.record_date),
            image_url,
            meal_type: row.meal_type,
            vegetables: row.vegetables,
            fruit: row.fruit,
            grains: row.grains,
            meat: row.meat,
            dairy: row.dairy,
            extras: row.extras,
            created_at: row.created_at,
        }
    }
}
