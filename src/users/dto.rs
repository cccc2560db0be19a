use serde::{Deserialize, Serialize};

use super::repo_types::User;
use crate::dates;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`; today when absent.
    pub dob: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub joined_year: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub new_password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUp {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LoggedIn {
    pub id: i64,
    pub username: String,
}

/// Profile as shown in the app. Never carries the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub phone: Option<String>,
    pub joined_year: String,
    pub avatar_path: Option<String>,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        let username = u
            .username
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| u.email.clone());
        let joined_year = u
            .joined_year
            .filter(|y| !y.is_empty())
            .unwrap_or_else(|| u.created_at.year().to_string());
        Self {
            user_id: u.user_id,
            username,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            gender: u.gender,
            dob: u.dob.map(dates::format_day),
            phone: u.phone,
            joined_year,
            avatar_path: u.avatar_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    fn user() -> User {
        User {
            user_id: 12,
            username: None,
            password_hash: "$argon2id$v=19$...".into(),
            email: "jo@example.com".into(),
            first_name: "Jo".into(),
            last_name: "".into(),
            gender: None,
            dob: Some(date!(1999 - 07 - 01)),
            phone: None,
            joined_year: None,
            avatar_path: None,
            created_at: datetime!(2024-11-02 03:00:00 UTC),
        }
    }

    #[test]
    fn profile_falls_back_to_email_and_creation_year() {
        let profile = UserProfile::from(user());
        assert_eq!(profile.username, "jo@example.com");
        assert_eq!(profile.joined_year, "2024");
        assert_eq!(profile.dob.as_deref(), Some("1999-07-01"));
    }

    #[test]
    fn profile_serializes_without_password() {
        let json = serde_json::to_value(UserProfile::from(user())).unwrap();
        assert_eq!(json["userId"], 12);
        assert_eq!(json["firstName"], "Jo");
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
