use std::{collections::HashMap, future::Future, path::Path};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use crate::{
    db,
    entities::{diary_entry, lookup, movie},
    error::{StoreError, StoreResult},
    fixtures,
    models::{DiaryEntry, EntryFilter, EntryInput, Lookup, LookupInput, MovieInput},
};

/// Diary persistence contract used by the HTTP handlers.
///
/// Methods return `impl Future + Send` so handler futures stay `Send` under axum.
pub trait DiaryRepository: Send + Sync + 'static {
    fn get_entry(&self, id: i32) -> impl Future<Output = StoreResult<DiaryEntry>> + Send;

    /// Entries ordered by watched date, newest first.
    fn list_entries(
        &self,
        filter: EntryFilter,
    ) -> impl Future<Output = StoreResult<Vec<DiaryEntry>>> + Send;

    fn create_entry(&self, input: EntryInput)
    -> impl Future<Output = StoreResult<DiaryEntry>> + Send;

    /// Replaces every mutable field of entry `id`.
    fn update_entry(
        &self,
        id: i32,
        input: EntryInput,
    ) -> impl Future<Output = StoreResult<DiaryEntry>> + Send;

    /// Removes the entry and its lookups. Deleting an absent id succeeds.
    fn delete_entry(&self, id: i32) -> impl Future<Output = StoreResult<()>> + Send;

    fn add_lookup(
        &self,
        entry_id: i32,
        input: LookupInput,
    ) -> impl Future<Output = StoreResult<Lookup>> + Send;
}

/// SQLite-backed diary. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Storage {
    db: DatabaseConnection,
}

impl Storage {
    pub async fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self { db: db::connect_and_migrate(path).await? })
    }

    #[cfg(test)]
    pub async fn in_memory() -> StoreResult<Self> {
        Ok(Self { db: db::connect_in_memory().await? })
    }

    #[cfg(test)]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn close(self) -> StoreResult<()> {
        self.db.close().await?;
        debug!("storage closed");
        Ok(())
    }

    /// Inserts the sample diary if no entries exist yet. Returns how many entries were added.
    pub async fn seed_samples(&self) -> StoreResult<usize> {
        if diary_entry::Entity::find().count(&self.db).await? > 0 {
            return Ok(0);
        }

        let samples = fixtures::sample_entries(jiff::Zoned::now().date());
        let count = samples.len();
        for sample in samples {
            let entry = self.create_entry(sample.entry).await?;
            for lookup in sample.lookups {
                self.add_lookup(entry.id, lookup).await?;
            }
        }
        Ok(count)
    }
}

impl DiaryRepository for Storage {
    async fn get_entry(&self, id: i32) -> StoreResult<DiaryEntry> {
        load_entry(&self.db, id).await?.ok_or(StoreError::NotFound(id))
    }

    async fn list_entries(&self, filter: EntryFilter) -> StoreResult<Vec<DiaryEntry>> {
        let mut query = diary_entry::Entity::find();
        if let Some(min_rating) = filter.min_rating {
            query = query.filter(diary_entry::Column::Rating.gte(min_rating));
        }

        let rows = query
            .order_by_desc(diary_entry::Column::WatchedAt)
            .order_by_desc(diary_entry::Column::Id)
            .find_also_related(movie::Entity)
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|(entry, _)| entry.id).collect();
        let mut lookups_by_entry: HashMap<i32, Vec<lookup::Model>> = HashMap::new();
        if !ids.is_empty() {
            for row in lookup::Entity::find()
                .filter(lookup::Column::DiaryEntryId.is_in(ids))
                .order_by_asc(lookup::Column::Id)
                .all(&self.db)
                .await?
            {
                lookups_by_entry.entry(row.diary_entry_id).or_default().push(row);
            }
        }

        rows.into_iter()
            .map(|(entry, movie)| {
                let movie = movie.ok_or_else(|| dangling_movie(&entry))?;
                let lookups = lookups_by_entry.remove(&entry.id).unwrap_or_default();
                DiaryEntry::from_rows(entry, movie, lookups)
            })
            .collect()
    }

    async fn create_entry(&self, input: EntryInput) -> StoreResult<DiaryEntry> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let movie_id = resolve_movie(&txn, &input.movie).await?;
        let model = diary_entry::ActiveModel {
            id: Default::default(),
            movie_id: Set(movie_id),
            watched_at: Set(input.watched_at.to_string()),
            location: Set(input.location),
            rating: Set(input.rating),
            notes: Set(input.notes),
            watched_with: Set(input.watched_with),
            created_at: Set(now_sec()),
        };
        let inserted = model.insert(&txn).await?;
        txn.commit().await?;

        debug!(entry_id = inserted.id, movie_id, "created diary entry");
        self.get_entry(inserted.id).await
    }

    async fn update_entry(&self, id: i32, input: EntryInput) -> StoreResult<DiaryEntry> {
        input.validate()?;

        let txn = self.db.begin().await?;
        let existing =
            diary_entry::Entity::find_by_id(id).one(&txn).await?.ok_or(StoreError::NotFound(id))?;

        let movie_id = resolve_movie(&txn, &input.movie).await?;
        let mut model = existing.into_active_model();
        model.movie_id = Set(movie_id);
        model.watched_at = Set(input.watched_at.to_string());
        model.location = Set(input.location);
        model.rating = Set(input.rating);
        model.notes = Set(input.notes);
        model.watched_with = Set(input.watched_with);
        model.update(&txn).await?;
        txn.commit().await?;

        debug!(entry_id = id, movie_id, "updated diary entry");
        self.get_entry(id).await
    }

    async fn delete_entry(&self, id: i32) -> StoreResult<()> {
        let txn = self.db.begin().await?;
        let lookups = lookup::Entity::delete_many()
            .filter(lookup::Column::DiaryEntryId.eq(id))
            .exec(&txn)
            .await?;
        let entries = diary_entry::Entity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        debug!(
            entry_id = id,
            removed = entries.rows_affected > 0,
            lookups_removed = lookups.rows_affected,
            "deleted diary entry"
        );
        Ok(())
    }

    async fn add_lookup(&self, entry_id: i32, input: LookupInput) -> StoreResult<Lookup> {
        input.validate()?;

        if diary_entry::Entity::find_by_id(entry_id).one(&self.db).await?.is_none() {
            return Err(StoreError::NotFound(entry_id));
        }

        let model = lookup::ActiveModel {
            id: Default::default(),
            diary_entry_id: Set(entry_id),
            question: Set(input.question),
            answer: Set(input.answer),
            category: Set(input.category.as_str().to_string()),
            url: Set(input.url),
            created_at: Set(now_sec()),
        };
        let inserted = model.insert(&self.db).await?;

        debug!(entry_id, lookup_id = inserted.id, "added lookup");
        Ok(inserted.into())
    }
}

async fn load_entry<C: ConnectionTrait>(conn: &C, id: i32) -> StoreResult<Option<DiaryEntry>> {
    let Some((entry, movie)) =
        diary_entry::Entity::find_by_id(id).find_also_related(movie::Entity).one(conn).await?
    else {
        return Ok(None);
    };
    let movie = movie.ok_or_else(|| dangling_movie(&entry))?;

    let lookups = lookup::Entity::find()
        .filter(lookup::Column::DiaryEntryId.eq(id))
        .order_by_asc(lookup::Column::Id)
        .all(conn)
        .await?;

    DiaryEntry::from_rows(entry, movie, lookups).map(Some)
}

/// Finds the movie an entry refers to, inserting it on first reference. A TMDB id wins over the
/// title; without one, titles match case-insensitively.
async fn resolve_movie<C: ConnectionTrait>(conn: &C, input: &MovieInput) -> StoreResult<i32> {
    let title = input.title.trim();
    let key = title_key(title);

    let existing = match input.tmdb_id {
        Some(tmdb_id) => {
            movie::Entity::find().filter(movie::Column::TmdbId.eq(tmdb_id)).one(conn).await?
        },
        None => {
            movie::Entity::find()
                .filter(movie::Column::TitleKey.eq(key.as_str()))
                .order_by_asc(movie::Column::Id)
                .one(conn)
                .await?
        },
    };

    if let Some(movie) = existing {
        return Ok(movie.id);
    }

    let model = movie::ActiveModel {
        id: Default::default(),
        tmdb_id: Set(input.tmdb_id),
        title: Set(title.to_string()),
        title_key: Set(key),
        year: Set(input.year),
        poster_url: Set(input.poster_url.clone()),
        director: Set(input.director.clone()),
        genre: Set(input.genre.clone()),
        overview: Set(input.overview.clone()),
    };
    let inserted = model.insert(conn).await?;
    debug!(movie_id = inserted.id, tmdb_id = input.tmdb_id, title, "inserted new movie");
    Ok(inserted.id)
}

/// SQLite's `lower()` only folds ASCII, so the match key is computed here and stored.
fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

fn dangling_movie(entry: &diary_entry::Model) -> StoreError {
    StoreError::InvalidRow(format!(
        "diary entry {} references missing movie {}",
        entry.id, entry.movie_id
    ))
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use jiff::{ToSpan, civil::Date};

    use super::*;
    use crate::models::LookupCategory;

    fn today() -> Date {
        jiff::Zoned::now().date()
    }

    fn input(title: &str, rating: i32, days_ago: i64) -> EntryInput {
        EntryInput {
            movie: MovieInput { title: title.to_string(), ..Default::default() },
            watched_at: today().checked_sub(days_ago.days()).unwrap(),
            location: "Home".to_string(),
            rating,
            notes: format!("notes on {title}"),
            watched_with: "Sam".to_string(),
        }
    }

    fn lookup_input(question: &str) -> LookupInput {
        LookupInput {
            question: question.to_string(),
            answer: "an answer".to_string(),
            category: LookupCategory::Trivia,
            url: Some("https://example.com/source".to_string()),
        }
    }

    async fn lookup_rows(store: &Storage, entry_id: i32) -> usize {
        lookup::Entity::find()
            .filter(lookup::Column::DiaryEntryId.eq(entry_id))
            .count(store.db())
            .await
            .unwrap() as usize
    }

    #[tokio::test]
    async fn every_valid_rating_is_accepted() {
        let store = Storage::in_memory().await.unwrap();
        for rating in 1..=5 {
            let entry = store.create_entry(input("Heat", rating, 1)).await.unwrap();
            assert_eq!(entry.rating, rating);
        }
    }

    #[tokio::test]
    async fn out_of_range_ratings_are_rejected() {
        let store = Storage::in_memory().await.unwrap();
        for rating in [0, 6, -3, 100] {
            let err = store.create_entry(input("Heat", rating, 1)).await.unwrap_err();
            assert!(matches!(err, StoreError::Validation(_)), "rating {rating}: {err}");
        }
        assert!(store.list_entries(EntryFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn future_dates_are_rejected() {
        let store = Storage::in_memory().await.unwrap();
        let mut future = input("Heat", 4, 0);
        future.watched_at = today().checked_add(3.days()).unwrap();
        let err = store.create_entry(future).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn created_entry_round_trips() {
        let store = Storage::in_memory().await.unwrap();
        let mut x = input("Heat", 4, 3);
        x.movie.tmdb_id = Some(949);
        x.movie.year = Some(1995);

        let created = store.create_entry(x.clone()).await.unwrap();
        let fetched = store.get_entry(created.id).await.unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.movie.title, x.movie.title);
        assert_eq!(fetched.movie.tmdb_id, x.movie.tmdb_id);
        assert_eq!(fetched.movie.year, x.movie.year);
        assert_eq!(fetched.watched_at, x.watched_at);
        assert_eq!(fetched.location, x.location);
        assert_eq!(fetched.rating, x.rating);
        assert_eq!(fetched.notes, x.notes);
        assert_eq!(fetched.watched_with, x.watched_with);
        assert!(fetched.lookups.is_empty());
    }

    #[tokio::test]
    async fn movies_are_reused_across_entries() {
        let store = Storage::in_memory().await.unwrap();
        let first = store.create_entry(input("Heat", 4, 3)).await.unwrap();
        let second = store.create_entry(input("heat", 5, 1)).await.unwrap();
        assert_eq!(first.movie.id, second.movie.id);

        let mut by_tmdb = input("Heat (1995)", 3, 2);
        by_tmdb.movie.tmdb_id = Some(949);
        let third = store.create_entry(by_tmdb.clone()).await.unwrap();
        assert_ne!(third.movie.id, first.movie.id);

        by_tmdb.movie.title = "Something else entirely".to_string();
        let fourth = store.create_entry(by_tmdb).await.unwrap();
        assert_eq!(fourth.movie.id, third.movie.id);
        assert_eq!(fourth.movie.title, "Heat (1995)");
    }

    #[tokio::test]
    async fn non_ascii_titles_match_case_insensitively() {
        let store = Storage::in_memory().await.unwrap();
        let upper = store.create_entry(input("AMÉLIE", 5, 3)).await.unwrap();
        let lower = store.create_entry(input("amélie", 4, 1)).await.unwrap();
        assert_eq!(upper.movie.id, lower.movie.id);
        assert_eq!(lower.movie.title, "AMÉLIE");

        let other = store.create_entry(input("Ámelie", 3, 2)).await.unwrap();
        assert_ne!(other.movie.id, upper.movie.id);
        assert_eq!(movie::Entity::find().count(store.db()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_min_rating_newest_first() {
        let store = Storage::in_memory().await.unwrap();
        let a = store.create_entry(input("A", 5, 2)).await.unwrap();
        store.create_entry(input("B", 3, 5)).await.unwrap();
        let c = store.create_entry(input("C", 4, 10)).await.unwrap();

        let all = store.list_entries(EntryFilter::default()).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|e| e.movie.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);

        let filtered = store.list_entries(EntryFilter { min_rating: Some(4) }).await.unwrap();
        let ids: Vec<i32> = filtered.iter().map(|e| e.id).collect();
        assert_eq!(ids, [a.id, c.id]);
        assert!(filtered.iter().all(|e| e.rating >= 4));

        for k in 1..=6 {
            let subset = store.list_entries(EntryFilter { min_rating: Some(k) }).await.unwrap();
            let expected = all.iter().filter(|e| e.rating >= k).count();
            assert_eq!(subset.len(), expected, "min_rating {k}");
            assert!(subset.windows(2).all(|w| w[0].watched_at >= w[1].watched_at));
        }
    }

    #[tokio::test]
    async fn update_replaces_mutable_fields() {
        let store = Storage::in_memory().await.unwrap();
        let created = store.create_entry(input("Heat", 2, 3)).await.unwrap();

        let mut changed = input("Collateral", 5, 1);
        changed.location = "Cinema".to_string();
        changed.watched_with = String::new();
        let updated = store.update_entry(created.id, changed.clone()).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.movie.title, "Collateral");
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.location, "Cinema");
        assert_eq!(updated.watched_with, "");
        assert_eq!(updated.watched_at, changed.watched_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn update_of_missing_entry_is_not_found() {
        let store = Storage::in_memory().await.unwrap();
        let err = store.update_entry(42, input("Heat", 3, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[tokio::test]
    async fn update_validates_rating() {
        let store = Storage::in_memory().await.unwrap();
        let created = store.create_entry(input("Heat", 3, 1)).await.unwrap();
        let err = store.update_entry(created.id, input("Heat", 7, 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.get_entry(created.id).await.unwrap().rating, 3);
    }

    #[tokio::test]
    async fn delete_cascades_to_lookups() {
        let store = Storage::in_memory().await.unwrap();
        let keep = store.create_entry(input("Keep", 4, 1)).await.unwrap();
        let doomed = store.create_entry(input("Doomed", 2, 2)).await.unwrap();
        store.add_lookup(keep.id, lookup_input("Who directed it?")).await.unwrap();
        store.add_lookup(doomed.id, lookup_input("Where was it shot?")).await.unwrap();
        store.add_lookup(doomed.id, lookup_input("Who wrote the score?")).await.unwrap();
        assert_eq!(lookup_rows(&store, doomed.id).await, 2);

        store.delete_entry(doomed.id).await.unwrap();

        assert_eq!(lookup_rows(&store, doomed.id).await, 0);
        assert_eq!(lookup_rows(&store, keep.id).await, 1);
        assert!(matches!(store.get_entry(doomed.id).await, Err(StoreError::NotFound(_))));
        assert_eq!(store.get_entry(keep.id).await.unwrap().lookups.len(), 1);
    }

    #[tokio::test]
    async fn deleting_absent_entry_succeeds() {
        let store = Storage::in_memory().await.unwrap();
        store.delete_entry(999).await.unwrap();
        let created = store.create_entry(input("Heat", 3, 1)).await.unwrap();
        store.delete_entry(created.id).await.unwrap();
        store.delete_entry(created.id).await.unwrap();
    }

    #[tokio::test]
    async fn lookups_belong_to_their_entry() {
        let store = Storage::in_memory().await.unwrap();
        let a = store.create_entry(input("A", 4, 1)).await.unwrap();
        let b = store.create_entry(input("B", 4, 2)).await.unwrap();
        store.add_lookup(a.id, lookup_input("first")).await.unwrap();
        store.add_lookup(b.id, lookup_input("second")).await.unwrap();
        store.add_lookup(a.id, lookup_input("third")).await.unwrap();

        let a = store.get_entry(a.id).await.unwrap();
        assert_eq!(a.lookups.len(), 2);
        assert!(a.lookups.iter().all(|l| l.diary_entry_id == a.id));
        assert_eq!(a.lookups[0].question, "first");
        assert_eq!(a.lookups[0].category, LookupCategory::Trivia);

        for entry in store.list_entries(EntryFilter::default()).await.unwrap() {
            assert!(entry.lookups.iter().all(|l| l.diary_entry_id == entry.id));
        }
    }

    #[tokio::test]
    async fn lookup_on_missing_entry_is_not_found() {
        let store = Storage::in_memory().await.unwrap();
        let err = store.add_lookup(5, lookup_input("anything")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(5)));

        let created = store.create_entry(input("Heat", 3, 1)).await.unwrap();
        let err = store.add_lookup(created.id, lookup_input("  ")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn seeding_only_fills_an_empty_diary() {
        let store = Storage::in_memory().await.unwrap();
        assert_eq!(store.seed_samples().await.unwrap(), 3);
        assert_eq!(store.seed_samples().await.unwrap(), 0);

        let entries = store.list_entries(EntryFilter::default()).await.unwrap();
        let ratings: Vec<i32> = entries.iter().map(|e| e.rating).collect();
        assert_eq!(ratings, [5, 3, 4]);
        assert_eq!(entries[1].lookups.len(), 2);
    }
}
