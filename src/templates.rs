use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::models::{DiaryEntry, Lookup, LookupCategory, MAX_RATING, MIN_RATING};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const HTMX_CDN: &str = "https://unpkg.com/htmx.org@2.0.4";
const POSTER_PLACEHOLDER: &str = "/static/poster-placeholder.svg";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RatingStyle {
    Positive,
    Neutral,
    Negative,
}

impl RatingStyle {
    pub fn for_rating(rating: i32) -> Self {
        match rating {
            r if r >= 4 => RatingStyle::Positive,
            3 => RatingStyle::Neutral,
            _ => RatingStyle::Negative,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RatingStyle::Positive => "positive",
            RatingStyle::Neutral => "neutral",
            RatingStyle::Negative => "negative",
        }
    }

    fn color(self) -> &'static str {
        match self {
            RatingStyle::Positive => "text-green-500",
            RatingStyle::Neutral => "text-yellow-500",
            RatingStyle::Negative => "text-red-500",
        }
    }

    fn class(self) -> String {
        format!("rating rating-{} {}", self.as_str(), self.color())
    }
}

pub fn index_page(entries: &[DiaryEntry]) -> String {
    page(
        "Movie Journal",
        html! {
            (nav())
            main class="max-w-4xl mx-auto px-6 py-10" {
                div class="flex items-center justify-between gap-4" {
                    div {
                        h1 class="text-3xl font-bold text-gray-900" { "Movie Journal" }
                        p class="mt-2 text-gray-600" { "What you watched, and everything you looked up along the way." }
                    }
                    button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700"
                        hx-get="/diary/new" hx-target="#entry-form" hx-swap="innerHTML" {
                        "New entry"
                    }
                }

                div id="entry-form" class="mt-6" {}

                div class="mt-8 flex items-center gap-3" {
                    label class="text-sm font-medium text-gray-700" for="min_rating" { "Minimum rating" }
                    select class="rounded-md border border-gray-300 px-2 py-1 text-sm" id="min_rating" name="min_rating"
                        hx-get="/recent-entries" hx-target="#recent-entries" hx-swap="outerHTML" {
                        option value="" { "Any" }
                        @for r in (MIN_RATING..=MAX_RATING).rev() {
                            option value=(r) { (r) "+" }
                        }
                    }
                }

                (recent_entries_markup(entries, None))
            }
        },
    )
}

pub fn about_page() -> String {
    page(
        "About · Movie Journal",
        html! {
            (nav())
            main class="max-w-2xl mx-auto px-6 py-10" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" { "About" }
                    p class="mt-4 text-gray-700" {
                        "Movie Journal is a personal diary for the films you watch. Rate them, "
                        "note where and with whom you watched, and keep the things you looked up "
                        "during the film: who's that actor, where was this filmed, is it a true story?"
                    }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back to the diary" }
                }
            }
        },
    )
}

/// The card list, replaced wholesale when the rating filter changes.
pub fn recent_entries(entries: &[DiaryEntry], min_rating: Option<i32>) -> String {
    recent_entries_markup(entries, min_rating).into_string()
}

pub fn entry_card(entry: &DiaryEntry) -> String {
    card(entry).into_string()
}

pub fn entry_detail(entry: &DiaryEntry) -> String {
    let movie = &entry.movie;
    html! {
        article id=(entry_dom_id(entry.id)) class="bg-white shadow rounded-lg p-6" {
            div class="flex gap-6" {
                (poster(entry, "w-32 rounded"))
                div class="flex-1" {
                    h2 class="text-2xl font-semibold text-gray-900" {
                        (movie.title)
                        @if let Some(year) = movie.year {
                            span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                        }
                    }
                    (stars(entry.rating))
                    dl class="mt-4 grid grid-cols-2 gap-x-4 gap-y-1 text-sm" {
                        dt class="text-gray-500" { "Watched" }
                        dd class="text-gray-900" { (format_date(entry)) }
                        @if !entry.location.is_empty() {
                            dt class="text-gray-500" { "Where" }
                            dd class="text-gray-900" { (entry.location) }
                        }
                        @if !entry.watched_with.is_empty() {
                            dt class="text-gray-500" { "With" }
                            dd class="text-gray-900" { (entry.watched_with) }
                        }
                        @if let Some(director) = &movie.director {
                            dt class="text-gray-500" { "Director" }
                            dd class="text-gray-900" { (director) }
                        }
                        @if let Some(genre) = &movie.genre {
                            dt class="text-gray-500" { "Genre" }
                            dd class="text-gray-900" { (genre) }
                        }
                    }
                    @if let Some(overview) = &movie.overview {
                        p class="mt-4 text-sm text-gray-600" { (overview) }
                    }
                    @if !entry.notes.is_empty() {
                        p class="mt-4 text-gray-800 whitespace-pre-line" { (entry.notes) }
                    }
                    @if let Some(tmdb_id) = movie.tmdb_id {
                        a class="mt-2 block text-sm text-gray-500 hover:text-gray-700" href=(format!("https://www.themoviedb.org/movie/{tmdb_id}")) target="_blank" rel="noopener noreferrer" {
                            "TMDB"
                        }
                    }
                }
            }

            section class="mt-6" {
                h3 class="text-sm font-semibold text-gray-700" { "Lookups" }
                @if entry.lookups.is_empty() {
                    p class="mt-2 text-sm text-gray-500" { "Nothing looked up yet." }
                } @else {
                    ul class="mt-2 space-y-2" {
                        @for lookup in &entry.lookups {
                            (lookup_item(lookup))
                        }
                    }
                }
                (lookup_form(entry.id))
            }

            div class="mt-6 flex gap-4 text-sm" {
                button class="text-blue-600 hover:text-blue-800"
                    hx-get=(format!("/diary/{}/edit", entry.id)) hx-target="closest article" hx-swap="outerHTML" {
                    "Edit"
                }
                button class="text-gray-600 hover:text-gray-800"
                    hx-get=(format!("/diary-short/{}", entry.id)) hx-target="closest article" hx-swap="outerHTML" {
                    "Collapse"
                }
                button class="text-red-600 hover:text-red-800"
                    hx-delete=(format!("/diary/{}", entry.id)) hx-target="closest article" hx-swap="outerHTML"
                    hx-confirm="Delete this entry and its lookups?" {
                    "Delete"
                }
            }
        }
    }
    .into_string()
}

/// Create form when `entry` is `None`, otherwise the edit form pre-filled from it.
pub fn entry_form(entry: Option<&DiaryEntry>) -> String {
    let title = entry.map(|e| e.movie.title.as_str()).unwrap_or_default();
    let tmdb_id = entry.and_then(|e| e.movie.tmdb_id).map(|id| id.to_string()).unwrap_or_default();
    let year = entry.and_then(|e| e.movie.year).map(|y| y.to_string()).unwrap_or_default();
    let watched = entry.map(format_date).unwrap_or_default();
    let location = entry.map(|e| e.location.as_str()).unwrap_or_default();
    let rating = entry.map(|e| e.rating);
    let notes = entry.map(|e| e.notes.as_str()).unwrap_or_default();
    let watched_with = entry.map(|e| e.watched_with.as_str()).unwrap_or_default();

    let fields = html! {
        div class="grid gap-4 md:grid-cols-2" {
            (text_field("movie_title", "Movie title", title, true))
            (text_field("watched_date", "Watched on", &watched, true))
            (text_field("tmdb_id", "TMDB id", &tmdb_id, false))
            (text_field("year", "Year", &year, false))
            (text_field("watched_location", "Where", location, false))
            (text_field("watched_with", "With", watched_with, false))
        }
        div class="mt-4" {
            label class="block text-sm font-medium text-gray-700" for="rating" { "Rating" }
            select class="mt-1 rounded-md border border-gray-300 px-2 py-1" id="rating" name="rating" required {
                @for r in (MIN_RATING..=MAX_RATING).rev() {
                    option value=(r) selected[rating == Some(r)] { (r) }
                }
            }
        }
        div class="mt-4" {
            label class="block text-sm font-medium text-gray-700" for="notes" { "Notes" }
            textarea class="mt-1 w-full rounded-md border border-gray-300 px-3 py-2" id="notes" name="notes" rows="3" { (notes) }
        }
    };

    match entry {
        None => html! {
            form class="bg-white shadow rounded-lg p-6" method="post" action="/diary/new" {
                h2 class="text-xl font-semibold text-gray-900" { "New entry" }
                div class="mt-4" { (fields) }
                button class="mt-6 rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Save" }
            }
        },
        Some(entry) => html! {
            article id=(entry_dom_id(entry.id)) class="bg-white shadow rounded-lg p-6" {
                form hx-put=(format!("/diary/{}", entry.id)) hx-target="closest article" hx-swap="outerHTML" {
                    h2 class="text-xl font-semibold text-gray-900" { "Edit entry" }
                    div class="mt-4" { (fields) }
                    div class="mt-6 flex gap-4" {
                        button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Save" }
                        button class="text-gray-600 hover:text-gray-800" type="button"
                            hx-get=(format!("/diary/{}", entry.id)) hx-target="closest article" hx-swap="outerHTML" {
                            "Cancel"
                        }
                    }
                }
            }
        },
    }
    .into_string()
}

pub fn error_fragment(status: StatusCode, message: &str) -> String {
    html! {
        div class="rounded-md border border-red-200 bg-red-50 p-4" role="alert" {
            p class="font-semibold text-red-800" { (status.as_u16()) " " (status.canonical_reason().unwrap_or("Error")) }
            p class="mt-1 text-sm text-red-700" { (message) }
        }
    }
    .into_string()
}

fn page(title: &str, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                script src=(TAILWIND_CDN) {}
                script src=(HTMX_CDN) {}
                link rel="stylesheet" href="/static/app.css";
            }
            body class="min-h-screen bg-gray-50" { (body) }
        }
    }
    .into_string()
}

fn nav() -> Markup {
    html! {
        nav class="bg-white shadow" {
            div class="max-w-4xl mx-auto px-6 py-3 flex gap-6 text-sm" {
                a class="font-semibold text-gray-900" href="/" { "Movie Journal" }
                a class="text-gray-600 hover:text-gray-900" href="/about" { "About" }
            }
        }
    }
}

fn recent_entries_markup(entries: &[DiaryEntry], min_rating: Option<i32>) -> Markup {
    html! {
        div id="recent-entries" class="mt-6 space-y-4" {
            @if entries.is_empty() {
                div class="bg-white shadow rounded-lg p-8" {
                    @match min_rating {
                        Some(r) => {
                            p class="text-gray-600" { "No entries rated " (r) " or higher." }
                        },
                        None => {
                            p class="text-gray-600" { "No entries yet. Add the last film you watched." }
                        },
                    }
                }
            } @else {
                @for entry in entries {
                    (card(entry))
                }
            }
        }
    }
}

fn card(entry: &DiaryEntry) -> Markup {
    html! {
        article id=(entry_dom_id(entry.id)) class="bg-white shadow rounded-lg p-4 flex gap-4 cursor-pointer hover:shadow-md"
            hx-get=(format!("/diary/{}", entry.id)) hx-target="this" hx-swap="outerHTML" {
            (poster(entry, "w-16 rounded"))
            div {
                h2 class="text-lg font-semibold text-gray-900" {
                    (entry.movie.title)
                    @if let Some(year) = entry.movie.year {
                        span class="ml-2 font-normal text-gray-500" { "(" (year) ")" }
                    }
                }
                (stars(entry.rating))
                p class="mt-1 text-sm text-gray-500" { (format_date(entry)) }
            }
        }
    }
}

fn poster(entry: &DiaryEntry, class: &str) -> Markup {
    let src = entry.movie.poster_url.as_deref().unwrap_or(POSTER_PLACEHOLDER);
    html! {
        img class=(class) src=(src) alt=(format!("Poster for {}", entry.movie.title)) loading="lazy";
    }
}

fn stars(rating: i32) -> Markup {
    let style = RatingStyle::for_rating(rating);
    let filled = rating.clamp(0, MAX_RATING) as usize;
    html! {
        span class=(style.class()) title=(format!("{rating} out of {MAX_RATING}")) data-rating=(rating) {
            ("★".repeat(filled))
            span class="text-gray-300" { ("☆".repeat(MAX_RATING as usize - filled)) }
        }
    }
}

fn lookup_item(lookup: &Lookup) -> Markup {
    html! {
        li class="text-sm" {
            span class=(format!("lookup-{} mr-2 rounded bg-gray-100 px-2 py-0.5 text-xs uppercase text-gray-600", lookup.category)) {
                (lookup.category.as_str())
            }
            span class="font-medium text-gray-900" { (lookup.question) }
            @if !lookup.answer.is_empty() {
                span class="text-gray-700" { " · " (lookup.answer) }
            }
            @if let Some(url) = &lookup.url {
                a class="ml-2 text-blue-600 hover:text-blue-800" href=(url) target="_blank" rel="noopener noreferrer" { "source" }
            }
        }
    }
}

fn lookup_form(entry_id: i32) -> Markup {
    html! {
        form class="mt-4 grid gap-2 md:grid-cols-4" hx-post=(format!("/diary/{entry_id}/lookups"))
            hx-target="closest article" hx-swap="outerHTML" {
            input class="rounded-md border border-gray-300 px-2 py-1 text-sm md:col-span-2" name="question" placeholder="What did you look up?" required;
            input class="rounded-md border border-gray-300 px-2 py-1 text-sm" name="answer" placeholder="Answer";
            select class="rounded-md border border-gray-300 px-2 py-1 text-sm" name="category" {
                @for category in LookupCategory::ALL {
                    option value=(category.as_str()) selected[category == LookupCategory::default()] { (category.as_str()) }
                }
            }
            input class="rounded-md border border-gray-300 px-2 py-1 text-sm md:col-span-3" name="url" type="url" placeholder="Source URL";
            button class="rounded-md bg-gray-800 px-3 py-1 text-sm font-semibold text-white hover:bg-gray-900" type="submit" { "Add lookup" }
        }
    }
}

fn text_field(name: &str, label: &str, value: &str, required: bool) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class="mt-1 w-full rounded-md border border-gray-300 px-3 py-2" id=(name) name=(name) value=(value) required[required];
        }
    }
}

fn format_date(entry: &DiaryEntry) -> String {
    entry.watched_at.strftime("%Y-%m-%d").to_string()
}

fn entry_dom_id(id: i32) -> String {
    format!("entry-{id}")
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::Movie;

    fn entry(rating: i32) -> DiaryEntry {
        DiaryEntry {
            id: 7,
            movie: Movie {
                id: 1,
                tmdb_id: Some(550),
                title: "Fight Club".to_string(),
                year: Some(1999),
                poster_url: None,
                director: Some("David Fincher".to_string()),
                genre: Some("Drama".to_string()),
                overview: None,
            },
            watched_at: jiff::civil::date(2024, 5, 1),
            location: "Home".to_string(),
            rating,
            notes: "<b>loud</b>".to_string(),
            watched_with: String::new(),
            created_at: Timestamp::UNIX_EPOCH,
            lookups: vec![Lookup {
                id: 3,
                diary_entry_id: 7,
                question: "Where was the Paper Street house?".to_string(),
                answer: "Wilmington, Delaware".to_string(),
                category: LookupCategory::Location,
                url: None,
                created_at: Timestamp::UNIX_EPOCH,
            }],
        }
    }

    #[test]
    fn rating_style_mapping() {
        assert_eq!(RatingStyle::for_rating(5), RatingStyle::Positive);
        assert_eq!(RatingStyle::for_rating(4), RatingStyle::Positive);
        assert_eq!(RatingStyle::for_rating(3), RatingStyle::Neutral);
        assert_eq!(RatingStyle::for_rating(2), RatingStyle::Negative);
        assert_eq!(RatingStyle::for_rating(1), RatingStyle::Negative);
    }

    #[test]
    fn card_shows_summary_only() {
        let html = entry_card(&entry(5));
        assert!(html.contains("Fight Club"));
        assert!(html.contains("2024-05-01"));
        assert!(html.contains("rating-positive"));
        assert!(html.contains(r#"id="entry-7""#));
        assert!(html.contains(POSTER_PLACEHOLDER));
        assert!(!html.contains("Paper Street"));
    }

    #[test]
    fn detail_includes_lookups_and_actions() {
        let html = entry_detail(&entry(2));
        assert!(html.contains("Where was the Paper Street house?"));
        assert!(html.contains("lookup-location"));
        assert!(html.contains("rating-negative"));
        assert!(html.contains(r#"hx-delete="/diary/7""#));
        assert!(html.contains(r#"hx-get="/diary/7/edit""#));
        assert!(html.contains(r#"hx-post="/diary/7/lookups""#));
        assert!(html.contains("David Fincher"));
    }

    #[test]
    fn rendering_is_deterministic_and_escaped() {
        let e = entry(3);
        assert_eq!(entry_detail(&e), entry_detail(&e));
        assert_eq!(entry_card(&e), entry_card(&e));
        let html = entry_detail(&e);
        assert!(html.contains("&lt;b&gt;loud&lt;/b&gt;"));
        assert!(html.contains("rating-neutral"));
    }

    #[test]
    fn edit_form_is_prefilled() {
        let html = entry_form(Some(&entry(4)));
        assert!(html.contains(r#"hx-put="/diary/7""#));
        assert!(html.contains(r#"value="Fight Club""#));
        assert!(html.contains(r#"value="2024-05-01""#));
        assert!(html.contains(r#"<option value="4" selected>"#));

        let blank = entry_form(None);
        assert!(blank.contains(r#"action="/diary/new""#));
        assert!(!blank.contains("selected"));
    }

    #[test]
    fn empty_filtered_list_says_so() {
        let html = recent_entries(&[], Some(4));
        assert!(html.contains("No entries rated 4 or higher."));
    }
}
