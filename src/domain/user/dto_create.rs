use serde::Deserialize;
use validator::Validate;

use super::{Identity, UserRole};

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 32, message = "provider must be 1–32 characters"))]
    pub provider: String,
    #[validate(length(min = 1, max = 64, message = "provider user id must be 1–64 characters"))]
    pub provider_user_id: String,
    #[validate(length(min = 1, max = 25, message = "username must be 1–25 characters"))]
    pub username: String,
    #[validate(length(min = 4, max = 20, message = "password must be 4–20 characters"))]
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl CreateUserDto {
    pub fn identity(&self) -> Identity {
        Identity::new(self.provider.clone(), self.provider_user_id.clone())
    }
}
