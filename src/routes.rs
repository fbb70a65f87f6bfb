use std::sync::Arc;

use axum::{
    Json,
    extract::{Form, Path, Query, State, rejection::FormRejection},
    response::{Html, Redirect},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{EntryFilter, EntryForm, EntryInput, LookupForm, LookupInput, RecentQuery},
    store::DiaryRepository,
    templates,
};

type Shared<R> = State<Arc<AppState<R>>>;

pub async fn index<R: DiaryRepository>(State(state): Shared<R>) -> AppResult<Html<String>> {
    let entries = state
        .repo
        .list_entries(EntryFilter::default())
        .await
        .map_err(|e| AppError::from_store("index", None, e))?;
    Ok(Html(templates::index_page(&entries)))
}

pub async fn about() -> Html<String> {
    Html(templates::about_page())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn recent_entries<R: DiaryRepository>(
    State(state): Shared<R>,
    Query(q): Query<RecentQuery>,
) -> AppResult<Html<String>> {
    let filter = q.filter();
    let entries = state
        .repo
        .list_entries(filter)
        .await
        .map_err(|e| AppError::from_store("recent_entries", None, e))?;
    Ok(Html(templates::recent_entries(&entries, filter.min_rating)))
}

pub async fn entry_detail<R: DiaryRepository>(
    State(state): Shared<R>,
    Path(raw_id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&raw_id)?;
    let entry = state
        .repo
        .get_entry(id)
        .await
        .map_err(|e| AppError::from_store("entry_detail", Some(id), e))?;
    Ok(Html(templates::entry_detail(&entry)))
}

pub async fn entry_short<R: DiaryRepository>(
    State(state): Shared<R>,
    Path(raw_id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&raw_id)?;
    let entry = state
        .repo
        .get_entry(id)
        .await
        .map_err(|e| AppError::from_store("entry_short", Some(id), e))?;
    Ok(Html(templates::entry_card(&entry)))
}

pub async fn new_entry_form() -> Html<String> {
    Html(templates::entry_form(None))
}

pub async fn create_entry<R: DiaryRepository>(
    State(state): Shared<R>,
    form: Result<Form<EntryForm>, FormRejection>,
) -> AppResult<Redirect> {
    let input = parse_form::<EntryForm, EntryInput>(form)?;
    let entry = state
        .repo
        .create_entry(input)
        .await
        .map_err(|e| AppError::from_store("create_entry", None, e))?;
    tracing::info!(entry_id = entry.id, title = %entry.movie.title, "diary entry created");
    Ok(Redirect::to("/"))
}

pub async fn edit_entry_form<R: DiaryRepository>(
    State(state): Shared<R>,
    Path(raw_id): Path<String>,
) -> AppResult<Html<String>> {
    let id = parse_id(&raw_id)?;
    let entry = state
        .repo
        .get_entry(id)
        .await
        .map_err(|e| AppError::from_store("edit_entry_form", Some(id), e))?;
    Ok(Html(templates::entry_form(Some(&entry))))
}

pub async fn update_entry<R: DiaryRepository>(
    State(state): Shared<R>,
    Path(raw_id): Path<String>,
    form: Result<Form<EntryForm>, FormRejection>,
) -> AppResult<Html<String>> {
    let id = parse_id(&raw_id)?;
    let input = parse_form::<EntryForm, EntryInput>(form)?;
    let entry = state
        .repo
        .update_entry(id, input)
        .await
        .map_err(|e| AppError::from_store("update_entry", Some(id), e))?;
    tracing::info!(entry_id = id, "diary entry updated");
    Ok(Html(templates::entry_detail(&entry)))
}

/// Empty 200 so the client swaps the entry out of the page.
pub async fn delete_entry<R: DiaryRepository>(
    State(state): Shared<R>,
    Path(raw_id): Path<String>,
) -> AppResult<Html<&'static str>> {
    let id = match parse_id(&raw_id) {
        // Ids beyond the storable range cannot exist, so there is nothing to delete.
        Err(AppError::NotFound(_)) => return Ok(Html("")),
        other => other?,
    };
    state
        .repo
        .delete_entry(id)
        .await
        .map_err(|e| AppError::from_store("delete_entry", Some(id), e))?;
    tracing::info!(entry_id = id, "diary entry deleted");
    Ok(Html(""))
}

pub async fn add_lookup<R: DiaryRepository>(
    State(state): Shared<R>,
    Path(raw_id): Path<String>,
    form: Result<Form<LookupForm>, FormRejection>,
) -> AppResult<Html<String>> {
    let id = parse_id(&raw_id)?;
    let input = parse_form::<LookupForm, LookupInput>(form)?;
    state
        .repo
        .add_lookup(id, input)
        .await
        .map_err(|e| AppError::from_store("add_lookup", Some(id), e))?;
    let entry = state
        .repo
        .get_entry(id)
        .await
        .map_err(|e| AppError::from_store("add_lookup", Some(id), e))?;
    Ok(Html(templates::entry_detail(&entry)))
}

/// Non-integers are malformed (400). Integers outside the storable id range name no entry (404).
fn parse_id(raw: &str) -> AppResult<i32> {
    let wide: i64 = raw.parse().map_err(|_| {
        tracing::debug!(raw_id = raw, "rejected malformed entry id");
        AppError::bad_request("Invalid ID")
    })?;
    i32::try_from(wide).map_err(|_| AppError::NotFound("Entry not found".to_string()))
}

fn parse_form<F, T>(form: Result<Form<F>, FormRejection>) -> AppResult<T>
where
    T: TryFrom<F, Error = crate::error::ValidationError>,
{
    let Form(form) = form.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected malformed form");
        AppError::bad_request("Failed to parse form")
    })?;
    Ok(T::try_from(form)?)
}
