use anyhow::Context;
use sqlx::PgPool;
use time::Date;

use super::repo_types::{Taken, User};

const USER_COLUMNS: &str = "user_id, username, password_hash, email, first_name, last_name, \
     gender, dob, phone, joined_year, avatar_path, created_at";

pub struct NewUser<'a> {
    pub username: &'a str,
    pub password_hash: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub joined_year: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub dob: Date,
}

pub struct ProfileUpdate<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub gender: Option<&'a str>,
    pub dob: Option<Date>,
    pub phone: Option<&'a str>,
    pub email: &'a str,
    pub username: &'a str,
    pub joined_year: &'a str,
}

impl User {
    pub async fn find_by_id(db: &PgPool, user_id: i64) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("find user by id")?;
        Ok(user)
    }

    /// `username` must already be lowercased.
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = $1 LIMIT 1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(db)
            .await
            .context("find user by username")?;
        Ok(user)
    }

    /// First account whose username (case-insensitive) or email is already used.
    pub async fn find_taken(db: &PgPool, username: &str, email: &str) -> anyhow::Result<Option<Taken>> {
        let row = sqlx::query_as::<_, Taken>(
            r#"
            SELECT username, email
              FROM users
             WHERE LOWER(username) = $1 OR email = $2
             LIMIT 1
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_optional(db)
        .await
        .context("check username and email")?;
        Ok(row)
    }

    pub async fn create(db: &PgPool, new: &NewUser<'_>) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users
                (username, password_hash, email, phone, joined_year, first_name, last_name, gender, dob)
            VALUES ($1, $2, $3, $4, $5, $6, $7, '', $8)
            RETURNING user_id
            "#,
        )
        .bind(new.username)
        .bind(new.password_hash)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.joined_year)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.dob)
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(id)
    }

    pub async fn update_profile(
        db: &PgPool,
        user_id: i64,
        update: &ProfileUpdate<'_>,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE users
               SET first_name = $1,
                   last_name = $2,
                   gender = $3,
                   dob = $4,
                   phone = $5,
                   email = $6,
                   username = $7,
                   joined_year = $8
             WHERE user_id = $9
            "#,
        )
        .bind(update.first_name)
        .bind(update.last_name)
        .bind(update.gender)
        .bind(update.dob)
        .bind(update.phone)
        .bind(update.email)
        .bind(update.username)
        .bind(update.joined_year)
        .bind(user_id)
        .execute(db)
        .await
        .context("update user")?;
        Ok(res.rows_affected())
    }

    pub async fn set_password_hash(db: &PgPool, user_id: i64, hash: &str) -> anyhow::Result<u64> {
        let res = sqlx::query("UPDATE users SET password_hash = $1 WHERE user_id = $2")
            .bind(hash)
            .bind(user_id)
            .execute(db)
            .await
            .context("update password")?;
        Ok(res.rows_affected())
    }
}
