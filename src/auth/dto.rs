use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{auth::repo_types::Role, error::AppError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn char_len_within(value: &str, min: usize, max: usize) -> bool {
    let n = value.chars().count();
    n >= min && n <= max
}

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub role: String,
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Registration input after boundary validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub role: Role,
    pub email: String,
    pub password: String,
    pub name: String,
    pub profile_image: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, AppError> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|_| AppError::BadRequest("bad request".into()))?;

        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) || email.chars().count() > 60 {
            return Err(AppError::BadRequest("invalid email".into()));
        }
        if !char_len_within(&self.password, 6, 20) {
            return Err(AppError::BadRequest(
                "password must be between 6 and 20 characters".into(),
            ));
        }
        let name = self.name.trim().to_string();
        if !char_len_within(&name, 3, 60) {
            return Err(AppError::BadRequest(
                "name must be between 3 and 60 characters".into(),
            ));
        }

        Ok(Registration {
            role,
            email,
            password: self.password,
            name,
            profile_image: self.profile_image.filter(|p| !p.is_empty()),
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(mut self) -> Result<Self, AppError> {
        self.email = self.email.trim().to_lowercase();
        if !is_valid_email(&self.email) {
            return Err(AppError::BadRequest("invalid email".into()));
        }
        if self.password.is_empty() {
            return Err(AppError::BadRequest("password is required".into()));
        }
        Ok(self)
    }
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub message: String,
    pub code: u16,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub role: Role,
    pub email: String,
    pub name: String,
    pub profile_image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
    pub message: String,
    pub code: u16,
}
