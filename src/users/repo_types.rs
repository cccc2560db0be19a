use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// Row in `users`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub password_hash: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub dob: Option<Date>,
    pub phone: Option<String>,
    pub joined_year: Option<String>,
    pub avatar_path: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Existing account that clashes with a signup.
#[derive(Debug, Clone, FromRow)]
pub struct Taken {
    pub username: Option<String>,
    pub email: String,
}
