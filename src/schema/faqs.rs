use sea_orm_migration::prelude::*;

pub async fn apply(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    if manager.has_table("faqs").await? {
        return Ok(());
    }

    manager
        .create_table(
            Table::create()
                .table(Faqs::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Faqs::Id)
                        .uuid()
                        .not_null()
                        .primary_key()
                        .default(SimpleExpr::Custom("gen_random_uuid()".into())),
                )
                .col(ColumnDef::new(Faqs::Author).json_binary().not_null())
                .col(ColumnDef::new(Faqs::Question).text().not_null())
                .col(
                    ColumnDef::new(Faqs::Answers)
                        .json_binary()
                        .not_null()
                        .default(SimpleExpr::Custom("'[]'::jsonb".into())),
                )
                .col(
                    ColumnDef::new(Faqs::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(SimpleExpr::Custom("now()".into())),
                )
                .to_owned(),
        )
        .await?;

    Ok(())
}

#[derive(Iden)]
enum Faqs {
    Table,
    Id,
    Author,
    Question,
    Answers,
    CreatedAt,
}
