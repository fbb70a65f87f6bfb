use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "lookups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub diary_entry_id: i32,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub url: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::diary_entry::Entity",
        from = "Column::DiaryEntryId",
        to = "super::diary_entry::Column::Id",
        on_delete = "Cascade"
    )]
    DiaryEntry,
}

impl Related<super::diary_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiaryEntry.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
