//! User model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "User name must not be blank"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Partial user update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    #[validate(custom(function = "not_blank", message = "User name must not be blank"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_name_and_valid_email() {
        let ok = CreateUser { name: "Ann".into(), email: "ann@example.com".into() };
        assert!(ok.validate().is_ok());

        let blank = CreateUser { name: "  ".into(), email: "ann@example.com".into() };
        assert!(blank.validate().is_err());

        let missing_email: CreateUser = serde_json::from_str(r#"{"name":"Ann"}"#).unwrap();
        assert!(missing_email.validate().is_err());

        let bad_email = CreateUser { name: "Ann".into(), email: "not-an-email".into() };
        assert!(bad_email.validate().is_err());
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(UpdateUser::default().validate().is_ok());

        let rename = UpdateUser { name: Some("Bob".into()), email: None };
        assert!(rename.validate().is_ok());

        let blank = UpdateUser { name: Some(String::new()), email: None };
        assert!(blank.validate().is_err());

        let bad_email = UpdateUser { name: None, email: Some("bob.example.com".into()) };
        assert!(bad_email.validate().is_err());
    }
}
