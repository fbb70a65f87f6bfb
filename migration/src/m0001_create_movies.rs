use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(big_integer_null(Movies::TmdbId).unique_key())
                    .col(string(Movies::Title))
                    .col(integer_null(Movies::Year))
                    .col(string_null(Movies::PosterUrl))
                    .col(string_null(Movies::Director))
                    .col(string_null(Movies::Genre))
                    .col(text_null(Movies::Overview))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movies_title")
                    .table(Movies::Table)
                    .col(Movies::Title)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Movies {
    Table,
    Id,
    TmdbId,
    Title,
    Year,
    PosterUrl,
    Director,
    Genre,
    Overview,
}
