use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row of the `users` table, including the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub hashed_password: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user as returned to clients; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            image: user.image,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub hashed_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl RegisterRequest {
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            "Anonymous".to_string()
        } else {
            name.to_string()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub id: i32,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(first: Option<&str>, last: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: "a@b.c".into(),
            password: "pw".into(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
        }
    }

    #[test]
    fn display_name_joins_and_trims() {
        assert_eq!(request(Some("Ada"), Some("Lovelace")).display_name(), "Ada Lovelace");
        assert_eq!(request(Some("Ada"), None).display_name(), "Ada");
        assert_eq!(request(None, Some("Lovelace")).display_name(), "Lovelace");
    }

    #[test]
    fn display_name_defaults_to_anonymous() {
        assert_eq!(request(None, None).display_name(), "Anonymous");
        assert_eq!(request(Some("  "), Some("")).display_name(), "Anonymous");
    }
}
