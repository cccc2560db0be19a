use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum FoodInputError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),
    #[error("amount must be greater than 0")]
    InvalidAmount,
}

/// Meal amounts feed the daily totals, so only positive finite values are stored.
fn check_amount(amount: f64) -> Result<f64, FoodInputError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(FoodInputError::InvalidAmount)
    }
}

/// Entry in `GET /foods`.
#[derive(Debug, Serialize)]
pub struct FoodItem {
    pub local_id: String,
    pub db_id: i64,
    pub name: String,
    pub calories: i32,
    pub unit: String,
    pub amount: f64,
    pub food_category: Option<String>,
}

/// Body of `POST /foods`. Every field is optional at the serde level so a
/// missing one is reported as a 400 with our own message.
#[derive(Debug, Deserialize)]
pub struct AddFoodRequest {
    pub name: Option<String>,
    pub calories: Option<i32>,
    pub unit: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date: Option<OffsetDateTime>,
    pub user_id: Option<i64>,
    pub meal_type: Option<String>,
    pub amount: Option<f64>,
    pub food_category: Option<String>,
    pub image_url: Option<String>,
}

/// Validated `POST /foods` input.
#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub calories: i32,
    pub unit: String,
    pub user_id: i64,
    pub meal_type: String,
    pub amount: f64,
    pub food_category: Option<String>,
    pub image_url: Option<String>,
    pub date: Option<OffsetDateTime>,
}

impl AddFoodRequest {
    /// Trims name and unit, lowercases the meal type. Fails on the first
    /// missing required field, then on a non-positive amount.
    pub fn validate(self) -> Result<NewFood, FoodInputError> {
        use FoodInputError::Missing;

        let name = self
            .name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(Missing("name"))?;
        let calories = self.calories.ok_or(Missing("calories"))?;
        let unit = self
            .unit
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(Missing("unit"))?;
        let user_id = self.user_id.filter(|id| *id > 0).ok_or(Missing("user_id"))?;
        let meal_type = self
            .meal_type
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .ok_or(Missing("meal_type"))?;
        let amount = check_amount(self.amount.ok_or(Missing("amount"))?)?;

        Ok(NewFood {
            name,
            calories,
            unit,
            user_id,
            meal_type,
            amount,
            food_category: self.food_category.filter(|c| !c.is_empty()),
            image_url: self.image_url.filter(|u| !u.is_empty()),
            date: self.date,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AddedFood {
    pub id: String,
    pub food_id: i64,
    pub name: String,
    pub calories: i32,
    pub unit: String,
    pub amount: f64,
    pub meal_type: String,
    pub record_date: String,
    pub food_category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MealRecordFilter {
    pub date: Option<String>,
    pub meal_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealRecordItem {
    pub id: String,
    pub food_id: i64,
    pub name: String,
    pub calories: i32,
    pub unit: String,
    pub amount: f64,
    pub meal_type: String,
    pub record_date: String,
    pub food_category: Option<String>,
    pub image_url: Option<String>,
}

/// Body of `PUT /foods/:id`.
#[derive(Debug, Deserialize)]
pub struct UpdateFoodRequest {
    pub name: String,
    pub calories: i32,
    pub unit: String,
    pub amount: f64,
    pub food_category: Option<String>,
    #[serde(rename = "addFoodCategory")]
    pub add_food_category: Option<String>,
    pub image_url: Option<String>,
}

impl UpdateFoodRequest {
    pub fn validate(&self) -> Result<(), FoodInputError> {
        if self.name.trim().is_empty() {
            return Err(FoodInputError::Missing("name"));
        }
        if self.unit.trim().is_empty() {
            return Err(FoodInputError::Missing("unit"));
        }
        check_amount(self.amount).map(|_| ())
    }

    /// `food_category` wins over the older `addFoodCategory` field.
    pub fn requested_category(&self) -> Option<&str> {
        self.food_category
            .as_deref()
            .filter(|c| !c.is_empty())
            .or(self.add_food_category.as_deref().filter(|c| !c.is_empty()))
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedFood {
    pub id: i64,
    pub name: String,
    pub calories: i32,
    pub unit: String,
    pub amount: f64,
    pub food_category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct DeletedRows {
    pub meals: u64,
    pub foods: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> AddFoodRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn validate_normalises_fields() {
        let food = request(serde_json::json!({
            "name": "  Apple ", "calories": 52, "unit": " g ", "user_id": 3,
            "meal_type": "Breakfast", "amount": 1.5, "food_category": "fruits",
            "date": "2025-03-14T20:45:33Z"
        }))
        .validate()
        .unwrap();
        assert_eq!(food.name, "Apple");
        assert_eq!(food.unit, "g");
        assert_eq!(food.meal_type, "breakfast");
        assert_eq!(food.food_category.as_deref(), Some("fruits"));
        assert!(food.date.is_some());
    }

    #[test]
    fn validate_reports_first_missing_field() {
        let err = request(serde_json::json!({ "name": "Apple", "unit": "g" }))
            .validate()
            .unwrap_err();
        assert_eq!(err, FoodInputError::Missing("calories"));

        let err = request(serde_json::json!({
            "name": "Apple", "calories": 0, "unit": "g", "user_id": 1,
            "meal_type": "lunch", "amount": 0
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, FoodInputError::InvalidAmount);

        let err = request(serde_json::json!({
            "name": "Apple", "calories": 0, "unit": "g", "user_id": 1, "meal_type": "lunch"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: amount");
    }

    #[test]
    fn negative_amounts_are_rejected_on_add_and_update() {
        let err = request(serde_json::json!({
            "name": "Carrot", "calories": 25, "unit": "serve", "user_id": 1,
            "meal_type": "dinner", "amount": -3, "food_category": "vegetables"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err, FoodInputError::InvalidAmount);

        let update: UpdateFoodRequest = serde_json::from_value(serde_json::json!({
            "name": "Carrot", "calories": 25, "unit": "serve", "amount": -1.5
        }))
        .unwrap();
        assert_eq!(update.validate().unwrap_err(), FoodInputError::InvalidAmount);

        let update: UpdateFoodRequest = serde_json::from_value(serde_json::json!({
            "name": "Carrot", "calories": 25, "unit": "serve", "amount": 2
        }))
        .unwrap();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn zero_calories_are_allowed() {
        let food = request(serde_json::json!({
            "name": "Water", "calories": 0, "unit": "ml", "user_id": 1,
            "meal_type": "snack", "amount": 250
        }))
        .validate()
        .unwrap();
        assert_eq!(food.calories, 0);
        assert_eq!(food.food_category, None);
    }

    #[test]
    fn requested_category_falls_back_to_add_food_category() {
        let req: UpdateFoodRequest = serde_json::from_value(serde_json::json!({
            "name": "Rice", "calories": 130, "unit": "g", "amount": 1,
            "food_category": "", "addFoodCategory": "grains"
        }))
        .unwrap();
        assert_eq!(req.requested_category(), Some("grains"));
    }
}
