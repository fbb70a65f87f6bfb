pub use sea_orm_migration::prelude::*;

mod m0001_create_movies;
mod m0002_create_diary_entries;
mod m0003_create_lookups;
mod m0004_add_movie_title_key;

pub struct Migrator;

impl MigratorTrait for Migrator {
    /// Ordered, forward-only. A migration's version is its position in this list plus one,
    /// matching the `mNNNN_` prefix of its name.
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m0001_create_movies::Migration),
            Box::new(m0002_create_diary_entries::Migration),
            Box::new(m0003_create_lookups::Migration),
            Box::new(m0004_add_movie_title_key::Migration),
        ]
    }
}
