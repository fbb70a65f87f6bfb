use sea_orm_migration::{
    prelude::*,
    schema::*,
    sea_orm::{ConnectionTrait, Statement},
};

/// Adds `movies.title_key`, the Unicode-lowercased title used to match movies by name.
/// SQLite's `lower()` only folds ASCII, so the key is computed in Rust and stored.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Movies::Table)
                    .add_column(string(Movies::TitleKey).default(""))
                    .to_owned(),
            )
            .await?;

        let backend = manager.get_database_backend();
        let db = manager.get_connection();
        let rows = db
            .query_all(Statement::from_string(backend, "SELECT id, title FROM movies"))
            .await?;
        for row in rows {
            let id: i32 = row.try_get("", "id")?;
            let title: String = row.try_get("", "title")?;
            let update = Query::update()
                .table(Movies::Table)
                .value(Movies::TitleKey, title.trim().to_lowercase())
                .and_where(Expr::col(Movies::Id).eq(id))
                .to_owned();
            db.execute(backend.build(&update)).await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_title_key")
                    .table(Movies::Table)
                    .col(Movies::TitleKey)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    TitleKey,
}
