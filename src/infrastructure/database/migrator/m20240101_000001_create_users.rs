//! Migration to create the users table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string_len(36).not_null().primary_key())
                    .col(ColumnDef::new(Users::Tenant).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Provider).string_len(32).not_null())
                    .col(ColumnDef::new(Users::ProviderUserId).string_len(64).not_null())
                    .col(ColumnDef::new(Users::Username).string_len(25).not_null())
                    .col(ColumnDef::new(Users::Password).string_len(255).null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(20)
                            .not_null()
                            .default("default"),
                    )
                    // Fixed-width RFC 3339 text, so lexical order is time order.
                    .col(ColumnDef::new(Users::CreatedAt).string_len(32).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_users_tenant_identity")
                    .table(Users::Table)
                    .col(Users::Tenant)
                    .col(Users::Provider)
                    .col(Users::ProviderUserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_users_tenant_username")
                    .table(Users::Table)
                    .col(Users::Tenant)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_tenant_created_at")
                    .table(Users::Table)
                    .col(Users::Tenant)
                    .col(Users::CreatedAt)
                    .col(Users::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
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
