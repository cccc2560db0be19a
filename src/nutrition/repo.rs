use anyhow::Context;
use axum::async_trait;
use sqlx::PgPool;
use time::Date;

use super::repo_types::{MealAmountRow, Servings};

/// Storage the aggregator reads from. Both intake sources are returned
/// row by row; combining them is the caller's job.
#[async_trait]
pub trait NutritionStore: Send + Sync {
    /// Legacy photo-capture rows (`food_records`) for the user on `day`.
    async fn food_record_servings(&self, user_id: i64, day: Date) -> anyhow::Result<Vec<Servings>>;

    /// Normalized meal records joined to their food's category for the user on `day`.
    async fn meal_amounts(&self, user_id: i64, day: Date) -> anyhow::Result<Vec<MealAmountRow>>;

    async fn find_goals(&self, user_id: i64) -> anyhow::Result<Option<Servings>>;

    /// Inserts a goal row unless one already exists for the user.
    async fn insert_goals_if_absent(&self, user_id: i64, goals: &Servings) -> anyhow::Result<()>;

    /// Inserts or overwrites all six goal values for the user.
    async fn upsert_goals(&self, user_id: i64, goals: &Servings) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct PgNutritionStore {
    db: PgPool,
}

impl PgNutritionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NutritionStore for PgNutritionStore {
    async fn food_record_servings(&self, user_id: i64, day: Date) -> anyhow::Result<Vec<Servings>> {
        let rows = sqlx::query_as::<_, Servings>(
            r#"
            SELECT vegetables::float8 AS vegetables,
                   fruit::float8      AS fruits,
                   grains::float8     AS grains,
                   meat::float8       AS meat,
                   dairy::float8      AS dairy,
                   extras::float8     AS extras
              FROM food_records
             WHERE user_id = $1 AND record_date::date = $2
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(&self.db)
        .await
        .context("select food_records servings")?;
        Ok(rows)
    }

    async fn meal_amounts(&self, user_id: i64, day: Date) -> anyhow::Result<Vec<MealAmountRow>> {
        let rows = sqlx::query_as::<_, MealAmountRow>(
            r#"
            SELECT f.food_category, mr.amount
              FROM meal_records mr
              JOIN foods f ON mr.food_id = f.id
             WHERE mr.user_id = $1 AND mr.record_date::date = $2
            "#,
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(&self.db)
        .await
        .context("select meal_records amounts")?;
        Ok(rows)
    }

    async fn find_goals(&self, user_id: i64) -> anyhow::Result<Option<Servings>> {
        let row = sqlx::query_as::<_, Servings>(
            r#"
            SELECT vegetables::float8 AS vegetables,
                   fruits::float8     AS fruits,
                   grains::float8     AS grains,
                   meat::float8       AS meat,
                   dairy::float8      AS dairy,
                   extras::float8     AS extras
              FROM goal_settings
             WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await
        .context("select goal_settings")?;
        Ok(row)
    }

    async fn insert_goals_if_absent(&self, user_id: i64, goals: &Servings) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO goal_settings (user_id, vegetables, fruits, grains, meat, dairy, extras)
            VALUES ($1, $2::numeric, $3::numeric, $4::numeric, $5::numeric, $6::numeric, $7::numeric)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(goals.vegetables)
        .bind(goals.fruits)
        .bind(goals.grains)
        .bind(goals.meat)
        .bind(goals.dairy)
        .bind(goals.extras)
        .execute(&self.db)
        .await
        .context("insert default goal_settings")?;
        Ok(())
    }

    async fn upsert_goals(&self, user_id: i64, goals: &Servings) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO goal_settings (user_id, vegetables, fruits, grains, meat, dairy, extras)
            VALUES ($1, $2::numeric, $3::numeric, $4::numeric, $5::numeric, $6::numeric, $7::numeric)
            ON CONFLICT (user_id) DO UPDATE
               SET vegetables = EXCLUDED.vegetables,
                   fruits     = EXCLUDED.fruits,
                   grains     = EXCLUDED.grains,
                   meat       = EXCLUDED.meat,
                   dairy      = EXCLUDED.dairy,
                   extras     = EXCLUDED.extras,
                   updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(goals.vegetables)
        .bind(goals.fruits)
        .bind(goals.grains)
        .bind(goals.meat)
        .bind(goals.dairy)
        .bind(goals.extras)
        .execute(&self.db)
        .await
        .context("upsert goal_settings")?;
        Ok(())
    }
}

/// In-process store backing `AppState::fake()` and the aggregator tests.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryNutritionStore {
    inner: std::sync::Mutex<MemoryTables>,
}

#[cfg(test)]
#[derive(Default)]
struct MemoryTables {
    food_records: Vec<(i64, Date, Servings)>,
    meal_records: Vec<(i64, Date, MealAmountRow)>,
    goals: std::collections::HashMap<i64, Servings>,
    reject_goal_inserts: bool,
}

#[cfg(test)]
impl MemoryNutritionStore {
    pub fn push_food_record(&self, user_id: i64, day: Date, servings: Servings) {
        self.tables().food_records.push((user_id, day, servings));
    }

    pub fn push_meal_record(&self, user_id: i64, day: Date, category: Option<&str>, amount: f64) {
        self.tables().meal_records.push((
            user_id,
            day,
            MealAmountRow {
                food_category: category.map(str::to_string),
                amount,
            },
        ));
    }

    /// Makes lazy goal inserts fail, as a missing user row would.
    pub fn reject_goal_inserts(&self) {
        self.tables().reject_goal_inserts = true;
    }

    pub fn stored_goals(&self, user_id: i64) -> Option<Servings> {
        self.tables().goals.get(&user_id).copied()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, MemoryTables> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[async_trait]
impl NutritionStore for MemoryNutritionStore {
    async fn food_record_servings(&self, user_id: i64, day: Date) -> anyhow::Result<Vec<Servings>> {
        Ok(self
            .tables()
            .food_records
            .iter()
            .filter(|(u, d, _)| *u == user_id && *d == day)
            .map(|(_, _, s)| *s)
            .collect())
    }

    async fn meal_amounts(&self, user_id: i64, day: Date) -> anyhow::Result<Vec<MealAmountRow>> {
        Ok(self
            .tables()
            .meal_records
            .iter()
            .filter(|(u, d, _)| *u == user_id && *d == day)
            .map(|(_, _, row)| row.clone())
            .collect())
    }

    async fn find_goals(&self, user_id: i64) -> anyhow::Result<Option<Servings>> {
        Ok(self.stored_goals(user_id))
    }

    async fn insert_goals_if_absent(&self, user_id: i64, goals: &Servings) -> anyhow::Result<()> {
        let mut tables = self.tables();
        if tables.reject_goal_inserts {
            anyhow::bail!("insert or update on table \"goal_settings\" violates foreign key constraint");
        }
        tables.goals.entry(user_id).or_insert(*goals);
        Ok(())
    }

    async fn upsert_goals(&self, user_id: i64, goals: &Servings) -> anyhow::Result<()> {
        self.tables().goals.insert(user_id, *goals);
        Ok(())
    }
}

/// Runs the real SQL against a scratch database:
/// `DATABASE_URL=postgres://... cargo test -- --ignored`.
#[cfg(test)]
mod pg_tests {
    use super::*;
    use crate::nutrition::{dto::DEFAULT_GOALS, services};
    use time::macros::{date, datetime};
    use time::OffsetDateTime;

    async fn scratch_db() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = PgPool::connect(&url).await.unwrap();
        crate::db::migrate(&db).await.unwrap();
        db
    }

    async fn insert_user(db: &PgPool) -> i64 {
        let tag = format!("intake-{}", OffsetDateTime::now_utc().unix_timestamp_nanos());
        sqlx::query_scalar(
            "INSERT INTO users (username, password_hash, email, first_name)
             VALUES ($1, 'unused', $2, 'Test') RETURNING user_id",
        )
        .bind(&tag)
        .bind(format!("{tag}@example.com"))
        .fetch_one(db)
        .await
        .unwrap()
    }

    async fn remove_user(db: &PgPool, user_id: i64) {
        for table in ["goal_settings", "meal_records", "foods", "food_records", "users"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
                .bind(user_id)
                .execute(db)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL pointing at a scratch Postgres"]
    async fn daily_intake_sums_both_tables_within_the_day() {
        let db = scratch_db().await;
        let user_id = insert_user(&db).await;

        sqlx::query(
            "INSERT INTO food_records (user_id, record_date, meal_type, vegetables, fruit, dairy)
             VALUES ($1, $2, 'breakfast', 2, 1, 0), ($1, $3, 'dinner', 4, 4, 4)",
        )
        .bind(user_id)
        .bind(datetime!(2025-03-14 08:00))
        .bind(datetime!(2025-03-15 08:00))
        .execute(&db)
        .await
        .unwrap();

        let food_id: i64 = sqlx::query_scalar(
            "INSERT INTO foods (name, calories, unit, amount, user_id, food_category)
             VALUES ('Carrot', 25, 'serve', 1, $1, 'vegetables') RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&db)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO meal_records (user_id, food_id, amount, meal_type, food_category, record_date)
             VALUES ($1, $2, 3, 'lunch', 'vegetables', $3), ($1, $2, 7, 'lunch', 'vegetables', $4)",
        )
        .bind(user_id)
        .bind(food_id)
        .bind(datetime!(2025-03-14 23:59))
        .bind(datetime!(2025-03-15 00:00))
        .execute(&db)
        .await
        .unwrap();

        let store = PgNutritionStore::new(db.clone());
        let intake = services::compute_daily_intake(&store, user_id, date!(2025-03-14))
            .await
            .unwrap();
        let legacy = services::compute_legacy_intake(&store, user_id, date!(2025-03-14))
            .await
            .unwrap();

        remove_user(&db, user_id).await;

        assert_eq!(intake.vegetables, 5.0);
        assert_eq!(intake.fruits, 1.0);
        assert_eq!(intake.dairy, 0.0);
        assert_eq!(legacy.vegetables, 2.0);
    }

    #[tokio::test]
    #[ignore = "needs DATABASE_URL pointing at a scratch Postgres"]
    async fn goal_rows_round_trip_through_numeric_columns() {
        let db = scratch_db().await;
        let user_id = insert_user(&db).await;
        let store = PgNutritionStore::new(db.clone());
        let largest = Servings {
            vegetables: 999.99,
            ..DEFAULT_GOALS
        };

        let before = store.find_goals(user_id).await.unwrap();
        store.insert_goals_if_absent(user_id, &DEFAULT_GOALS).await.unwrap();
        store.insert_goals_if_absent(user_id, &largest).await.unwrap();
        let after_inserts = store.find_goals(user_id).await.unwrap();
        store.upsert_goals(user_id, &largest).await.unwrap();
        let after_upsert = store.find_goals(user_id).await.unwrap();

        remove_user(&db, user_id).await;

        assert_eq!(before, None);
        assert_eq!(after_inserts, Some(DEFAULT_GOALS));
        assert_eq!(after_upsert, Some(largest));
    }
}
