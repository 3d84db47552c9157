use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::ledger::service::BalanceSummary;
use crate::store::{Entry, EntryKind};

/// Raw request body for creating a transaction. Field checks live in
/// `validate`, not here.
#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub recurrence_day: Option<i32>,
}

/// Raw request body for a partial update; `None` keeps the current value.
#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub recurrence_day: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub recurrence_day: Option<u8>,
    pub created_at: OffsetDateTime,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            amount: entry.amount,
            description: entry.description,
            kind: entry.kind,
            recurrence_day: entry.recurrence_day,
            created_at: entry.created_at,
        }
    }
}

/// Entries plus their signed-sum aggregation, the shape shared by the
/// all-time listing and the month query.
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerOverview {
    pub summary: BalanceSummary,
    pub transactions: Vec<EntryResponse>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: i32,
}

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub day: i32,
    pub month: i32,
    pub year: i32,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub user: PublicUser,
    pub transactions: Vec<EntryResponse>,
}
