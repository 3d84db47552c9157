use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Role attached to a user account. `User` is the signup default; `Admin`
/// unlocks the administrative routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("unknown role: {other}"),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a ledger entry. The sign of an amount is derived from the
/// kind at aggregation time; amounts themselves are never stored negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    Income,
    Expense,
    FixedExpense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
            EntryKind::FixedExpense => "fixed-expense",
        }
    }

    /// Whether this kind contributes to the expense side of the balance.
    pub fn is_expense(&self) -> bool {
        matches!(self, EntryKind::Expense | EntryKind::FixedExpense)
    }
}

impl std::str::FromStr for EntryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            "fixed-expense" => Ok(EntryKind::FixedExpense),
            other => anyhow::bail!("unknown entry kind: {other}"),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Partial user update; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// Ledger entry record.
///
/// `source_entry` links a materialized recurrence instance back to its
/// fixed-expense template; it doubles as the per-day dedupe key for the
/// recurrence sweep.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: Uuid,
    pub owner: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub kind: EntryKind,
    pub recurrence_day: Option<u8>,
    pub source_entry: Option<Uuid>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub owner: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub kind: EntryKind,
    pub recurrence_day: Option<u8>,
    pub source_entry: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Fully merged and validated replacement for an entry's mutable fields.
/// Built by the update path after re-running the create-time validation.
#[derive(Debug, Clone)]
pub struct EntryChanges {
    pub amount: f64,
    pub description: Option<String>,
    pub kind: EntryKind,
    pub recurrence_day: Option<u8>,
}
