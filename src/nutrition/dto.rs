use serde::{Deserialize, Serialize};

use super::repo_types::Servings;

/// Targets used when a user has never saved goals.
pub const DEFAULT_GOALS: Servings = Servings {
    vegetables: 5.0,
    fruits: 2.0,
    grains: 5.0,
    meat: 2.5,
    dairy: 2.5,
    extras: 0.5,
};

/// Food groups tracked per day, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Vegetables,
    Fruits,
    Grains,
    Meat,
    Dairy,
    Extras,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Vegetables,
        Category::Fruits,
        Category::Grains,
        Category::Meat,
        Category::Dairy,
        Category::Extras,
    ];

    /// Value stored in `foods.food_category`.
    pub fn key(self) -> &'static str {
        match self {
            Category::Vegetables => "vegetables",
            Category::Fruits => "fruits",
            Category::Grains => "grains",
            Category::Meat => "meat",
            Category::Dairy => "dairy",
            Category::Extras => "extras",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Vegetables => "Vegetables",
            Category::Fruits => "Fruit",
            Category::Grains => "Grains",
            Category::Meat => "Meat",
            Category::Dairy => "Dairy",
            Category::Extras => "Extras",
        }
    }

    /// Exact match on the stored key; anything else is uncategorised.
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.key() == key)
    }
}

impl Servings {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Vegetables => self.vegetables,
            Category::Fruits => self.fruits,
            Category::Grains => self.grains,
            Category::Meat => self.meat,
            Category::Dairy => self.dairy,
            Category::Extras => self.extras,
        }
    }

    fn slot_mut(&mut self, category: Category) -> &mut f64 {
        match category {
            Category::Vegetables => &mut self.vegetables,
            Category::Fruits => &mut self.fruits,
            Category::Grains => &mut self.grains,
            Category::Meat => &mut self.meat,
            Category::Dairy => &mut self.dairy,
            Category::Extras => &mut self.extras,
        }
    }

    pub fn add(&mut self, category: Category, amount: f64) {
        *self.slot_mut(category) += amount;
    }

    pub fn merge(&mut self, other: &Servings) {
        for category in Category::ALL {
            self.add(category, other.get(category));
        }
    }

    /// Non-finite totals collapse to zero, each category independently.
    pub fn sanitized(mut self) -> Self {
        for category in Category::ALL {
            let slot = self.slot_mut(category);
            if !slot.is_finite() {
                *slot = 0.0;
            }
        }
        self
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub name: &'static str,
    pub goal_value: f64,
    pub consumed_value: f64,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionProgress {
    pub categories: Vec<CategoryProgress>,
    pub total_progress: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    pub user_id: i64,
    pub date: String,
    pub total_progress: f64,
    pub categories: Vec<CategoryProgress>,
}

/// `userId` and `date` arrive as raw strings so validation errors can be
/// reported in the API's own error shape.
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Body of `POST /update_goal`. All six targets are required; there is no
/// partial update.
#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    pub vegetables: Option<f64>,
    pub fruits: Option<f64>,
    pub grains: Option<f64>,
    pub meat: Option<f64>,
    pub dairy: Option<f64>,
    pub extras: Option<f64>,
}

impl UpdateGoalRequest {
    /// The error is the key of the first missing category.
    pub fn goals(&self) -> Result<Servings, &'static str> {
        let mut goals = Servings::default();
        for (category, value) in Category::ALL.into_iter().zip([
            self.vegetables,
            self.fruits,
            self.grains,
            self.meat,
            self.dairy,
            self.extras,
        ]) {
            *goals.slot_mut(category) = value.ok_or(category.key())?;
        }
        Ok(goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goals_need_every_category() {
        let req: UpdateGoalRequest = serde_json::from_value(serde_json::json!({
            "userId": 1, "vegetables": 6, "fruits": 2, "meat": 1
        }))
        .unwrap();
        assert_eq!(req.goals().unwrap_err(), "grains");

        let req: UpdateGoalRequest = serde_json::from_value(serde_json::json!({
            "userId": 1, "vegetables": 6, "fruits": 2, "grains": 4,
            "meat": 1, "dairy": 2, "extras": 0
        }))
        .unwrap();
        assert_eq!(req.goals().unwrap().grains, 4.0);
    }
}
