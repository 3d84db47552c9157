use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

mod memory;
mod postgres;
mod types;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use types::{Entry, EntryChanges, EntryKind, NewEntry, NewUser, Role, User, UserChanges};

/// Persistence seam for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, new: NewUser) -> anyhow::Result<User>;

    async fn user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;

    /// Exact match on the (already normalized) email, active or not.
    async fn user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;

    /// First active user whose display name contains `pattern`,
    /// case-insensitively.
    async fn first_user_by_name(&self, pattern: &str) -> anyhow::Result<Option<User>>;

    /// Applies the supplied fields to an active user. Returns `None` when no
    /// active user has that id.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> anyhow::Result<Option<User>>;

    /// Soft delete. Returns whether an active user was deactivated.
    async fn deactivate_user(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Persistence seam for ledger entries.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert_entry(&self, new: NewEntry) -> anyhow::Result<Entry>;

    async fn entry_by_id(&self, id: Uuid) -> anyhow::Result<Option<Entry>>;

    /// Replaces the mutable fields of an entry matched by `id` AND `owner`.
    /// The compound filter is what enforces cross-tenant isolation; a
    /// mismatched owner is indistinguishable from a missing row.
    async fn replace_entry(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: EntryChanges,
    ) -> anyhow::Result<Option<Entry>>;

    /// Soft delete with the same compound `id` AND `owner` filter.
    async fn deactivate_entry(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool>;

    /// All active entries for one owner, newest first.
    async fn entries_for_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Entry>>;

    /// Active entries for one owner with `created_at` inside `[start, end]`
    /// (both bounds inclusive).
    async fn entries_for_owner_between(
        &self,
        owner: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<Vec<Entry>>;

    /// Global sweep: active entries across all owners whose recurrence day
    /// equals `day`.
    async fn recurring_on_day(&self, day: u8) -> anyhow::Result<Vec<Entry>>;

    /// Whether a materialized clone of `source` already exists inside the
    /// `[start, end]` window.
    async fn was_materialized(
        &self,
        source: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<bool>;
}
