use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        dto::Ack,
        extractors::AuthIdentity,
        policy::{self, Operation},
    },
    error::ApiError,
    ledger::{
        dto::{
            CreateEntryRequest, DayQuery, EntryResponse, LedgerOverview, MonthQuery, SearchQuery,
            SearchResponse, UpdateEntryRequest,
        },
        service, validate,
    },
    state::AppState,
    store::{LedgerStore as _, NewEntry, Role, UserStore as _},
};

pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_own).post(create_entry))
        .route("/transactions/balance", get(month_balance))
        .route("/transactions/fix-day", get(day_entries))
        .route("/transactions/admin/search-by-name", get(search_by_owner_name))
        .route("/transactions/unique/:id", get(find_entry))
        .route(
            "/transactions/:id",
            axum::routing::patch(update_entry).delete(delete_entry),
        )
}

/// A malformed id renders the same way as a missing row so callers cannot
/// probe which ids exist.
fn parse_entry_id(raw: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found("transaction not found"))
}

#[instrument(skip(state, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(payload): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    policy::authorize(Operation::CreateEntry, identity.role)?;
    let valid = validate::validate_new(&payload)?;

    let entry = state
        .ledger
        .insert_entry(NewEntry {
            owner: identity.subject,
            amount: valid.amount,
            description: valid.description,
            kind: valid.kind,
            recurrence_day: valid.recurrence_day,
            source_entry: None,
            created_at: OffsetDateTime::now_utc(),
        })
        .await?;

    info!(entry_id = %entry.id, owner = %entry.owner, kind = %entry.kind, "transaction created");
    Ok((StatusCode::CREATED, Json(entry.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_entry(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    policy::authorize(Operation::UpdateEntry, identity.role)?;
    let id = parse_entry_id(&id)?;

    let current = state
        .ledger
        .entry_by_id(id)
        .await?
        .filter(|e| e.owner == identity.subject)
        .ok_or_else(|| ApiError::not_found("transaction not found"))?;

    let changes = validate::validate_update(&current, &payload)?;
    let updated = state
        .ledger
        .replace_entry(id, identity.subject, changes)
        .await?
        .ok_or_else(|| ApiError::not_found("transaction not found"))?;

    info!(entry_id = %updated.id, owner = %updated.owner, "transaction updated");
    Ok(Json(updated.into()))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    policy::authorize(Operation::DeleteEntry, identity.role)?;
    let id = parse_entry_id(&id)?;

    let removed = state.ledger.deactivate_entry(id, identity.subject).await?;
    if !removed {
        return Err(ApiError::not_found("transaction not found"));
    }

    info!(entry_id = %id, owner = %identity.subject, "transaction deleted");
    Ok(Json(Ack {
        message: "transaction deleted".into(),
    }))
}

#[instrument(skip(state))]
pub async fn find_entry(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Path(id): Path<String>,
) -> Result<Json<EntryResponse>, ApiError> {
    policy::authorize(Operation::FindEntry, identity.role)?;
    let id = parse_entry_id(&id)?;

    let entry = state
        .ledger
        .entry_by_id(id)
        .await?
        .filter(|e| e.owner == identity.subject || identity.role == Role::Admin)
        .ok_or_else(|| ApiError::not_found("transaction not found"))?;

    Ok(Json(entry.into()))
}

#[instrument(skip(state))]
pub async fn list_own(
    State(state): State<AppState>,
    identity: AuthIdentity,
) -> Result<Json<LedgerOverview>, ApiError> {
    policy::authorize(Operation::ListOwn, identity.role)?;

    let entries = state.ledger.entries_for_owner(identity.subject).await?;
    let summary = service::summarize(&entries);
    Ok(Json(LedgerOverview {
        summary,
        transactions: entries.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn month_balance(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Query(q): Query<MonthQuery>,
) -> Result<Json<LedgerOverview>, ApiError> {
    policy::authorize(Operation::MonthBalance, identity.role)?;

    let (start, end) = service::month_window(q.year, q.month)?;
    let entries = state
        .ledger
        .entries_for_owner_between(identity.subject, start, end)
        .await?;
    let summary = service::summarize(&entries);
    Ok(Json(LedgerOverview {
        summary,
        transactions: entries.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn day_entries(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Query(q): Query<DayQuery>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    policy::authorize(Operation::DayEntries, identity.role)?;

    let date = service::calendar_date(q.year, q.month, q.day)?;
    let (start, end) = service::day_bounds(date);
    let entries = state
        .ledger
        .entries_for_owner_between(identity.subject, start, end)
        .await?;
    let entries = service::day_view(entries, date.day());
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn search_by_owner_name(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Query(q): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    policy::authorize(Operation::SearchByOwnerName, identity.role)?;

    let pattern = q.name.trim();
    if pattern.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }

    let user = state
        .users
        .first_user_by_name(pattern)
        .await?
        .ok_or_else(|| ApiError::not_found("no user matches that name"))?;
    let entries = state.ledger.entries_for_owner(user.id).await?;

    Ok(Json(SearchResponse {
        user: user.into(),
        transactions: entries.into_iter().map(Into::into).collect(),
    }))
}
