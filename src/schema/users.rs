use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if manager.has_table("users").await? {
        return Ok(());
    }

    manager
        .create_table(
            Table::create()
                .table(Users::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Users::Id)
                        .uuid()
                        .not_null()
                        .primary_key()
                        .default(SimpleExpr::Custom("gen_random_uuid()".into())),
                )
                .col(ColumnDef::new(Users::Name).string().not_null())
                .col(ColumnDef::new(Users::Email).string().not_null())
                .col(ColumnDef::new(Users::PasswordHash).string())
                .col(
                    ColumnDef::new(Users::Role)
                        .string()
                        .not_null()
                        .default("user"),
                )
                .col(ColumnDef::new(Users::GoogleId).string())
                .col(ColumnDef::new(Users::ProfilePicture).string())
                .col(ColumnDef::new(Users::AssetPublicId).string())
                .col(
                    ColumnDef::new(Users::Provider)
                        .string()
                        .not_null()
                        .default("local"),
                )
                .col(
                    ColumnDef::new(Users::HasCustomAvatar)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Users::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .col(
                    ColumnDef::new(Users::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .to_owned(),
        )
        .await?;

    for statement in [
        "ALTER TABLE users ADD CONSTRAINT users_role_check \
         CHECK (role IN ('user','admin'))",
        "ALTER TABLE users ADD CONSTRAINT users_provider_check \
         CHECK (provider IN ('local','google'))",
        // Every account must be able to sign in somehow.
        "ALTER TABLE users ADD CONSTRAINT users_credential_check \
         CHECK (password_hash IS NOT NULL OR google_id IS NOT NULL)",
        "CREATE UNIQUE INDEX IF NOT EXISTS users_email_unique ON users (email)",
        "CREATE UNIQUE INDEX IF NOT EXISTS users_google_id_unique \
         ON users (google_id) WHERE google_id IS NOT NULL",
    ] {
        conn.execute(Statement::from_string(
            DbBackend::Postgres,
            statement.to_string(),
        ))
        .await?;
    }

    Ok(())
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    GoogleId,
    ProfilePicture,
    AssetPublicId,
    Provider,
    HasCustomAvatar,
    CreatedAt,
    UpdatedAt,
}
