use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if manager.has_table("leads").await? {
        return Ok(());
    }

    manager
        .create_table(
            Table::create()
                .table(Leads::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Leads::Id)
                        .uuid()
                        .not_null()
                        .primary_key()
                        .default(SimpleExpr::Custom("gen_random_uuid()".into())),
                )
                .col(ColumnDef::new(Leads::Name).string().not_null())
                .col(ColumnDef::new(Leads::Email).string().not_null().default(""))
                .col(ColumnDef::new(Leads::Phone).string().not_null())
                .col(ColumnDef::new(Leads::Message).text().not_null().default(""))
                .col(
                    ColumnDef::new(Leads::TradeIn)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Leads::Financing)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(
                    ColumnDef::new(Leads::Vehicle)
                        .json_binary()
                        .not_null()
                        .default(SimpleExpr::Custom("'{}'::jsonb".into())),
                )
                .col(ColumnDef::new(Leads::ProductId).uuid())
                .col(
                    ColumnDef::new(Leads::Status)
                        .string()
                        .not_null()
                        .default("pending"),
                )
                .col(
                    ColumnDef::new(Leads::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .col(
                    ColumnDef::new(Leads::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .to_owned(),
        )
        .await?;

    for statement in [
        "ALTER TABLE leads ADD CONSTRAINT leads_status_check \
         CHECK (status IN ('pending','confirmed','cancelled'))",
        "CREATE INDEX IF NOT EXISTS leads_created_at_idx ON leads (created_at DESC)",
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
enum Leads {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Message,
    TradeIn,
    Financing,
    Vehicle,
    ProductId,
    Status,
    CreatedAt,
    UpdatedAt,
}
