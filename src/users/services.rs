use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{info, warn};

use super::password::{hash_password, verify_password};
use super::repo::NewUser;
use super::repo_types::User;
use crate::dates;

pub enum SignupOutcome {
    Created(i64),
    UsernameTaken,
    EmailTaken,
}

pub struct Signup<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub phone: Option<&'a str>,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub dob: Option<time::Date>,
}

pub fn current_year() -> String {
    OffsetDateTime::now_utc().year().to_string()
}

/// Creates an account unless the username (case-insensitive) or email is taken.
pub async fn signup(db: &PgPool, req: &Signup<'_>) -> anyhow::Result<SignupOutcome> {
    let username = req.username.to_lowercase();

    if let Some(taken) = User::find_taken(db, &username, req.email).await? {
        if taken.username.as_deref().map(str::to_lowercase).as_deref() == Some(username.as_str()) {
            warn!(%username, "username already exists");
            return Ok(SignupOutcome::UsernameTaken);
        }
        warn!(email = req.email, "email already exists");
        return Ok(SignupOutcome::EmailTaken);
    }

    let hash = hash_password(req.password)?;
    let joined_year = current_year();
    let user_id = User::create(
        db,
        &NewUser {
            username: &username,
            password_hash: &hash,
            email: req.email,
            phone: req.phone.unwrap_or(""),
            joined_year: &joined_year,
            first_name: req.first_name.unwrap_or(&username),
            last_name: req.last_name.unwrap_or(""),
            dob: req.dob.unwrap_or_else(dates::today_utc),
        },
    )
    .await?;

    info!(user_id, %username, "user registered");
    Ok(SignupOutcome::Created(user_id))
}

/// `None` for an unknown username or a wrong password.
pub async fn login(db: &PgPool, username: &str, password: &str) -> anyhow::Result<Option<User>> {
    let Some(user) = User::find_by_username(db, &username.trim().to_lowercase()).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash)? {
        return Ok(None);
    }
    info!(user_id = user.user_id, "login ok");
    Ok(Some(user))
}

/// Rows changed; 0 means no such user.
pub async fn update_password(db: &PgPool, user_id: i64, new_password: &str) -> anyhow::Result<u64> {
    let hash = hash_password(new_password)?;
    User::set_password_hash(db, user_id, &hash).await
}
