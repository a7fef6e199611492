use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// The two permitted roles. ADMIN may mutate recipe data, READER may only read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Reader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Reader => "READER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "READER" => Ok(Role::Reader),
            _ => Err(()),
        }
    }
}

/// Raw `users` row as stored in Postgres.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: i64,
    pub role: String,
    pub email: String,
    pub password: String, // Argon2 hash
    pub name: String,
    pub profile_image: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User record with a validated role.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub role: Role,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // not exposed in JSON
    pub name: String,
    pub profile_image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let role = r
            .role
            .parse::<Role>()
            .map_err(|_| format!("user {} has unknown role {:?}", r.user_id, r.role))?;
        Ok(Self {
            id: r.user_id,
            role,
            email: r.email,
            password_hash: r.password,
            name: r.name,
            profile_image: r.profile_image,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Values needed to insert a user; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub role: Role,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub profile_image: Option<String>,
}
