use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::{Patch, UserRole};

/// Partial update. Only fields present in the request are written; an
/// explicit `"password": null` clears the stored password.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 25, message = "username must be 1–25 characters"))]
    #[serde(default)]
    pub username: Option<String>,
    #[validate(custom(function = "validate_password_patch"))]
    #[serde(default)]
    pub password: Patch<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl UpdateUserDto {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_unset() && self.role.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangePasswordDto {
    #[validate(length(min = 4, max = 20, message = "password must be 4–20 characters"))]
    pub password: String,
}

fn validate_password_patch(password: &Patch<String>) -> Result<(), ValidationError> {
    match password {
        Patch::Value(value) if !(4..=20).contains(&value.chars().count()) => {
            let mut err = ValidationError::new("length");
            err.message = Some("password must be 4–20 characters".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update() {
        let dto: UpdateUserDto = serde_json::from_str("{}").unwrap();
        assert!(dto.is_empty());
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_null_password_is_a_change() {
        let dto: UpdateUserDto = serde_json::from_str(r#"{"password": null}"#).unwrap();
        assert!(!dto.is_empty());
        assert_eq!(dto.password, Patch::Null);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_short_password_rejected() {
        let dto: UpdateUserDto = serde_json::from_str(r#"{"password": "abc"}"#).unwrap();
        let errors = dto.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_role_only_update() {
        let dto: UpdateUserDto = serde_json::from_str(r#"{"role": "admin"}"#).unwrap();
        assert_eq!(dto.role, Some(UserRole::Admin));
        assert!(dto.username.is_none());
        assert!(dto.password.is_unset());
    }
}
