//! Table and column identifiers for hand-built statements.

use sea_orm::DeriveIden;

#[derive(DeriveIden, Clone, Copy)]
pub enum Users {
    Table,
    Id,
    Tenant,
    Provider,
    ProviderUserId,
    Username,
    Password,
    Role,
    CreatedAt,
}

/// Public columns of a user; `password` is only read for confirmation.
pub const USER_COLUMNS: [Users; 7] = [
    Users::Id,
    Users::Tenant,
    Users::Provider,
    Users::ProviderUserId,
    Users::Username,
    Users::Role,
    Users::CreatedAt,
];

pub const CREDENTIAL_COLUMNS: [Users; 3] = [Users::Provider, Users::ProviderUserId, Users::Password];
