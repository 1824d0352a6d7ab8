use serde::{Deserialize, Serialize};
use validator::Validate;

use super::booking::Booking;

/// `GET /api/users/me/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

/// Кому принадлежит текущая сессия.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    /// Может подтверждать ожидающие платежи.
    pub privileged: bool,
}

impl From<&Profile> for Identity {
    fn from(profile: &Profile) -> Self {
        Identity {
            username: profile.username.clone(),
            privileged: profile.is_staff,
        }
    }
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct Registration {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(max = 15, message = "Phone number is too long"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ProfileUpdate {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(max = 15, message = "Phone number is too long"))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /api/token/`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_rejects_bad_email_and_long_phone() {
        let form = Registration {
            username: "abebe".to_string(),
            email: "not-an-email".to_string(),
            phone: "+2519111111111111".to_string(),
            password: "secret".to_string(),
        };
        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone"));
        assert!(!fields.contains_key("username"));
    }

    #[test]
    fn staff_profile_is_privileged() {
        let profile: Profile = serde_json::from_value(serde_json::json!({
            "id": 1,
            "username": "admin",
            "email": "admin@cinema.test",
            "is_staff": true
        }))
        .unwrap();
        let identity = Identity::from(&profile);
        assert!(identity.privileged);
        assert!(profile.bookings.is_empty());
    }
}
