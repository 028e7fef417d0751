use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>, conn: &DatabaseConnection) -> Result<(), DbErr> {
    if manager.has_table("products").await? {
        return Ok(());
    }

    manager
        .create_table(
            Table::create()
                .table(Products::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Products::Id)
                        .uuid()
                        .not_null()
                        .primary_key()
                        .default(SimpleExpr::Custom("gen_random_uuid()".into())),
                )
                .col(ColumnDef::new(Products::Name).string().not_null())
                .col(ColumnDef::new(Products::Category).string().not_null())
                .col(ColumnDef::new(Products::Price).double().not_null())
                .col(ColumnDef::new(Products::Description).text().not_null())
                .col(
                    ColumnDef::new(Products::Image)
                        .string()
                        .not_null()
                        .default("https://placehold.co/400x300"),
                )
                .col(
                    ColumnDef::new(Products::EngineSize)
                        .double()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Products::TopSpeed)
                        .double()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Products::Weight)
                        .double()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Products::Stock)
                        .integer()
                        .not_null()
                        .default(0),
                )
                .col(
                    ColumnDef::new(Products::Available)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(
                    ColumnDef::new(Products::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .col(
                    ColumnDef::new(Products::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .to_owned(),
        )
        .await?;

    for statement in [
        "ALTER TABLE products ADD CONSTRAINT products_category_check \
         CHECK (category IN ('moto','utv','atv'))",
        "ALTER TABLE products ADD CONSTRAINT products_stock_check CHECK (stock >= 0)",
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
enum Products {
    Table,
    Id,
    Name,
    Category,
    Price,
    Description,
    Image,
    EngineSize,
    TopSpeed,
    Weight,
    Stock,
    Available,
    CreatedAt,
    UpdatedAt,
}
