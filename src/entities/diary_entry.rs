use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "diary_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub movie_id: i32,
    /// ISO `YYYY-MM-DD`.
    pub watched_at: String,
    pub location: String,
    pub rating: i32,
    pub notes: String,
    pub watched_with: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
    #[sea_orm(has_many = "super::lookup::Entity")]
    Lookups,
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl Related<super::lookup::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lookups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
