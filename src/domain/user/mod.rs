//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod patch;
pub mod repository;

mod dto_confirm;
mod dto_create;
mod dto_get;
mod dto_update;

pub use model::{ConfirmResult, Identity, User, UserCredentials, UserKey, UserRole};
pub use patch::Patch;

pub use dto_confirm::ConfirmUserDto;
pub use dto_create::CreateUserDto;
pub use dto_get::ListUsersQuery;
pub use dto_update::{ChangePasswordDto, UpdateUserDto};

pub use repository::{NewUser, UserChanges, UserRepositoryInterface};
