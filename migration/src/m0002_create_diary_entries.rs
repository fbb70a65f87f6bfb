use sea_orm_migration::{prelude::*, schema::*};

use crate::m0001_create_movies::Movies;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DiaryEntries::Table)
                    .if_not_exists()
                    .col(pk_auto(DiaryEntries::Id))
                    .col(integer(DiaryEntries::MovieId))
                    .col(string(DiaryEntries::WatchedAt))
                    .col(string(DiaryEntries::Location).default(""))
                    .col(
                        integer(DiaryEntries::Rating)
                            .check(Expr::col(DiaryEntries::Rating).between(1, 5)),
                    )
                    .col(text(DiaryEntries::Notes).default(""))
                    .col(string(DiaryEntries::WatchedWith).default(""))
                    .col(big_integer(DiaryEntries::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_diary_entries_movie_id")
                            .from(DiaryEntries::Table, DiaryEntries::MovieId)
                            .to(Movies::Table, Movies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_diary_entries_movie_id")
                    .table(DiaryEntries::Table)
                    .col(DiaryEntries::MovieId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_diary_entries_watched_at")
                    .table(DiaryEntries::Table)
                    .col(DiaryEntries::WatchedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(DiaryEntries::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum DiaryEntries {
    Table,
    Id,
    MovieId,
    WatchedAt,
    Location,
    Rating,
    Notes,
    WatchedWith,
    CreatedAt,
}
