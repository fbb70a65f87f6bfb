use std::{fmt, str::FromStr};

use jiff::{Timestamp, civil::Date};
use serde::Deserialize;

use crate::{
    entities::{diary_entry, lookup, movie},
    error::{StoreError, ValidationError},
};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

/// Nothing can have been watched before the first motion picture.
pub const EARLIEST_WATCH_DATE: Date = jiff::civil::date(1888, 1, 1);

#[derive(Clone, Debug, PartialEq)]
pub struct Movie {
    pub id: i32,
    pub tmdb_id: Option<i64>,
    pub title: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub overview: Option<String>,
}

impl From<movie::Model> for Movie {
    fn from(m: movie::Model) -> Self {
        Self {
            id: m.id,
            tmdb_id: m.tmdb_id,
            title: m.title,
            year: m.year,
            poster_url: m.poster_url,
            director: m.director,
            genre: m.genre,
            overview: m.overview,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DiaryEntry {
    pub id: i32,
    pub movie: Movie,
    pub watched_at: Date,
    pub location: String,
    pub rating: i32,
    pub notes: String,
    pub watched_with: String,
    pub created_at: Timestamp,
    pub lookups: Vec<Lookup>,
}

impl DiaryEntry {
    pub fn from_rows(
        entry: diary_entry::Model,
        movie: movie::Model,
        lookups: Vec<lookup::Model>,
    ) -> Result<Self, StoreError> {
        let watched_at = entry.watched_at.parse().map_err(|_| {
            StoreError::InvalidRow(format!(
                "diary entry {} has unparsable watched_at {:?}",
                entry.id, entry.watched_at
            ))
        })?;

        let lookups = lookups
            .into_iter()
            .filter(|l| l.diary_entry_id == entry.id)
            .map(Lookup::from)
            .collect();

        Ok(Self {
            id: entry.id,
            movie: movie.into(),
            watched_at,
            location: entry.location,
            rating: entry.rating,
            notes: entry.notes,
            watched_with: entry.watched_with,
            created_at: timestamp(entry.created_at),
            lookups,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LookupCategory {
    Actor,
    Location,
    Trivia,
    #[default]
    Other,
}

impl LookupCategory {
    pub const ALL: [LookupCategory; 4] = [
        LookupCategory::Actor,
        LookupCategory::Location,
        LookupCategory::Trivia,
        LookupCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LookupCategory::Actor => "actor",
            LookupCategory::Location => "location",
            LookupCategory::Trivia => "trivia",
            LookupCategory::Other => "other",
        }
    }
}

impl fmt::Display for LookupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "actor" => Ok(LookupCategory::Actor),
            "location" => Ok(LookupCategory::Location),
            "trivia" => Ok(LookupCategory::Trivia),
            "other" | "" => Ok(LookupCategory::Other),
            other => Err(ValidationError::new(format!("unknown lookup category {other:?}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lookup {
    pub id: i32,
    pub diary_entry_id: i32,
    pub question: String,
    pub answer: String,
    pub category: LookupCategory,
    pub url: Option<String>,
    pub created_at: Timestamp,
}

impl From<lookup::Model> for Lookup {
    fn from(l: lookup::Model) -> Self {
        Self {
            id: l.id,
            diary_entry_id: l.diary_entry_id,
            question: l.question,
            answer: l.answer,
            // The column carries a CHECK constraint, so anything else is unreachable.
            category: l.category.parse().unwrap_or_default(),
            url: l.url,
            created_at: timestamp(l.created_at),
        }
    }
}

/// Movie as referenced from an entry. Resolved to an existing row or inserted on first use.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieInput {
    pub tmdb_id: Option<i64>,
    pub title: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub overview: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntryInput {
    pub movie: MovieInput,
    pub watched_at: Date,
    pub location: String,
    pub rating: i32,
    pub notes: String,
    pub watched_with: String,
}

impl EntryInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_at(jiff::Zoned::now().date())
    }

    pub fn validate_at(&self, today: Date) -> Result<(), ValidationError> {
        if self.movie.title.trim().is_empty() {
            return Err(ValidationError::new("movie title is required"));
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ValidationError::new(format!(
                "rating must be between {MIN_RATING} and {MAX_RATING}, got {}",
                self.rating
            )));
        }
        if self.watched_at < EARLIEST_WATCH_DATE {
            return Err(ValidationError::new(format!(
                "watched date {} is before {EARLIEST_WATCH_DATE}",
                self.watched_at
            )));
        }
        if self.watched_at > today {
            return Err(ValidationError::new(format!(
                "watched date {} is in the future",
                self.watched_at
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupInput {
    pub question: String,
    pub answer: String,
    pub category: LookupCategory,
    pub url: Option<String>,
}

impl LookupInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.question.trim().is_empty() {
            return Err(ValidationError::new("question is required"));
        }
        if let Some(url) = &self.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::new("source URL must start with http:// or https://"));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EntryFilter {
    pub min_rating: Option<i32>,
}

/// Raw create/edit form. Every field is optional text so that malformed input surfaces as a
/// validation error rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EntryForm {
    pub movie_title: String,
    pub tmdb_id: String,
    pub year: String,
    pub watched_date: String,
    pub watched_location: String,
    pub rating: String,
    pub notes: String,
    pub watched_with: String,
}

impl TryFrom<EntryForm> for EntryInput {
    type Error = ValidationError;

    fn try_from(form: EntryForm) -> Result<Self, Self::Error> {
        let title = form.movie_title.trim();
        if title.is_empty() {
            return Err(ValidationError::new("movie title is required"));
        }

        let watched_at: Date = form.watched_date.trim().parse().map_err(|_| {
            ValidationError::new(format!(
                "watched date must be YYYY-MM-DD, got {:?}",
                form.watched_date
            ))
        })?;

        let rating: i32 = form.rating.trim().parse().map_err(|_| {
            ValidationError::new(format!("rating must be a whole number, got {:?}", form.rating))
        })?;

        Ok(Self {
            movie: MovieInput {
                tmdb_id: optional_number(&form.tmdb_id, "TMDB id")?,
                title: title.to_string(),
                year: optional_number(&form.year, "year")?,
                ..Default::default()
            },
            watched_at,
            location: form.watched_location.trim().to_string(),
            rating,
            notes: form.notes.trim().to_string(),
            watched_with: form.watched_with.trim().to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LookupForm {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub url: String,
}

impl TryFrom<LookupForm> for LookupInput {
    type Error = ValidationError;

    fn try_from(form: LookupForm) -> Result<Self, Self::Error> {
        let url = form.url.trim();
        Ok(Self {
            question: form.question.trim().to_string(),
            answer: form.answer.trim().to_string(),
            category: form.category.parse()?,
            url: (!url.is_empty()).then(|| url.to_string()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub min_rating: Option<String>,
}

impl RecentQuery {
    /// An unparsable value means "no filter".
    pub fn filter(&self) -> EntryFilter {
        EntryFilter {
            min_rating: self.min_rating.as_deref().and_then(|s| s.trim().parse().ok()),
        }
    }
}

fn optional_number<T: FromStr>(raw: &str, field: &str) -> Result<Option<T>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| ValidationError::new(format!("{field} must be a number, got {raw:?}")))
}

fn timestamp(seconds: i64) -> Timestamp {
    Timestamp::from_second(seconds).unwrap_or(Timestamp::UNIX_EPOCH)
}
