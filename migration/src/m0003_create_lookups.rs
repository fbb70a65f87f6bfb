use sea_orm_migration::{prelude::*, schema::*};

use crate::m0002_create_diary_entries::DiaryEntries;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lookups::Table)
                    .if_not_exists()
                    .col(pk_auto(Lookups::Id))
                    .col(integer(Lookups::DiaryEntryId))
                    .col(text(Lookups::Question))
                    .col(text(Lookups::Answer).default(""))
                    .col(
                        string(Lookups::Category)
                            .default("other")
                            .check(Expr::col(Lookups::Category).is_in([
                                "actor", "location", "trivia", "other",
                            ])),
                    )
                    .col(string_null(Lookups::Url))
                    .col(big_integer(Lookups::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lookups_diary_entry_id")
                            .from(Lookups::Table, Lookups::DiaryEntryId)
                            .to(DiaryEntries::Table, DiaryEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lookups_diary_entry_id")
                    .table(Lookups::Table)
                    .col(Lookups::DiaryEntryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Lookups::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Lookups {
    Table,
    Id,
    DiaryEntryId,
    Question,
    Answer,
    Category,
    Url,
    CreatedAt,
}
