use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub tmdb_id: Option<i64>,
    pub title: String,
    /// Lowercased title used for case-insensitive matching.
    pub title_key: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub overview: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::diary_entry::Entity")]
    DiaryEntries,
}

impl Related<super::diary_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DiaryEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
