use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConfirmUserDto {
    #[validate(length(min = 4, max = 20, message = "password must be 4–20 characters"))]
    pub password: String,
}
