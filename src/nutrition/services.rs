use time::Date;
use tracing::{debug, warn};

use super::dto::{Category, CategoryProgress, NutritionProgress, DEFAULT_GOALS};
use super::repo::NutritionStore;
use super::repo_types::{MealAmountRow, Servings};

/// Total intake per category for `day`: every `food_records` row plus every
/// categorised meal-record amount. Rows from the two sources are summed as
/// they are; an entry logged through both paths counts twice.
pub async fn compute_daily_intake(
    store: &dyn NutritionStore,
    user_id: i64,
    day: Date,
) -> anyhow::Result<Servings> {
    let food_records = store.food_record_servings(user_id, day).await?;
    let meal_amounts = store.meal_amounts(user_id, day).await?;
    debug!(
        user_id,
        %day,
        food_records = food_records.len(),
        meal_records = meal_amounts.len(),
        "daily intake sources loaded"
    );
    Ok(combine_sources(&food_records, &meal_amounts))
}

/// Legacy-only intake (`food_records`), kept for older clients.
pub async fn compute_legacy_intake(
    store: &dyn NutritionStore,
    user_id: i64,
    day: Date,
) -> anyhow::Result<Servings> {
    let food_records = store.food_record_servings(user_id, day).await?;
    Ok(combine_sources(&food_records, &[]))
}

fn combine_sources(food_records: &[Servings], meal_amounts: &[MealAmountRow]) -> Servings {
    let mut total = Servings::default();
    for row in food_records {
        total.merge(row);
    }
    for row in meal_amounts {
        if let Some(category) = row.food_category.as_deref().and_then(Category::from_key) {
            total.add(category, row.amount);
        }
    }
    total.sanitized()
}

/// Stored goals, or the defaults. A missing row is created on the way out;
/// failing to create it does not fail the read.
pub async fn get_or_create_goals(store: &dyn NutritionStore, user_id: i64) -> anyhow::Result<Servings> {
    if let Some(goals) = store.find_goals(user_id).await? {
        return Ok(goals);
    }

    if let Err(e) = store.insert_goals_if_absent(user_id, &DEFAULT_GOALS).await {
        warn!(error = %e, user_id, "default goal insert failed; serving defaults");
    } else {
        debug!(user_id, "default goals created");
    }
    Ok(DEFAULT_GOALS)
}

/// Goals for display: stored values or the defaults, without writing.
pub async fn goals_or_defaults(store: &dyn NutritionStore, user_id: i64) -> anyhow::Result<Servings> {
    Ok(store.find_goals(user_id).await?.unwrap_or(DEFAULT_GOALS))
}

pub async fn upsert_goals(store: &dyn NutritionStore, user_id: i64, goals: &Servings) -> anyhow::Result<()> {
    store.upsert_goals(user_id, goals).await
}

pub async fn compute_progress(
    store: &dyn NutritionStore,
    user_id: i64,
    day: Date,
) -> anyhow::Result<NutritionProgress> {
    let goals = get_or_create_goals(store, user_id).await?;
    let intake = compute_daily_intake(store, user_id, day).await?;
    Ok(progress_against(&goals, &intake))
}

/// Goals below one serve are measured against one serve.
pub fn category_progress(consumed: f64, goal: f64) -> f64 {
    let ratio = consumed / goal.max(1.0);
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

pub fn progress_against(goals: &Servings, intake: &Servings) -> NutritionProgress {
    let categories: Vec<CategoryProgress> = Category::ALL
        .into_iter()
        .map(|category| {
            let goal_value = goals.get(category);
            let consumed_value = intake.get(category);
            CategoryProgress {
                name: category.display_name(),
                goal_value,
                consumed_value,
                progress: category_progress(consumed_value, goal_value),
            }
        })
        .collect();

    let total_progress =
        categories.iter().map(|c| c.progress).sum::<f64>() / categories.len() as f64;

    NutritionProgress {
        categories,
        total_progress,
    }
}
