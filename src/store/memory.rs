use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    Entry, EntryChanges, LedgerStore, NewEntry, NewUser, User, UserChanges, UserStore,
};

/// In-memory implementation of both store seams. Backs `AppState::fake()`
/// and the tests; not wired up in production.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    entries: RwLock<Vec<Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&new.email)) {
            anyhow::bail!("duplicate email: {}", new.email);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            is_active: true,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn first_user_by_name(&self, pattern: &str) -> anyhow::Result<Option<User>> {
        let needle = pattern.to_lowercase();
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.is_active && u.name.to_lowercase().contains(&needle))
            .cloned())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id && u.is_active) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        Ok(Some(user.clone()))
    }

    async fn deactivate_user(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id && u.is_active) else {
            return Ok(false);
        };
        user.is_active = false;
        Ok(true)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_entry(&self, new: NewEntry) -> anyhow::Result<Entry> {
        let entry = Entry {
            id: Uuid::new_v4(),
            owner: new.owner,
            amount: new.amount,
            description: new.description,
            kind: new.kind,
            recurrence_day: new.recurrence_day,
            source_entry: new.source_entry,
            is_active: true,
            created_at: new.created_at,
        };
        self.entries.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn entry_by_id(&self, id: Uuid) -> anyhow::Result<Option<Entry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().find(|e| e.id == id && e.is_active).cloned())
    }

    async fn replace_entry(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: EntryChanges,
    ) -> anyhow::Result<Option<Entry>> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries
            .iter_mut()
            .find(|e| e.id == id && e.owner == owner && e.is_active)
        else {
            return Ok(None);
        };
        entry.amount = changes.amount;
        entry.description = changes.description;
        entry.kind = changes.kind;
        entry.recurrence_day = changes.recurrence_day;
        Ok(Some(entry.clone()))
    }

    async fn deactivate_entry(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let mut entries = self.entries.write().await;
        let Some(entry) = entries
            .iter_mut()
            .find(|e| e.id == id && e.owner == owner && e.is_active)
        else {
            return Ok(false);
        };
        entry.is_active = false;
        Ok(true)
    }

    async fn entries_for_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Entry>> {
        let entries = self.entries.read().await;
        let mut matched: Vec<Entry> = entries
            .iter()
            .filter(|e| e.owner == owner && e.is_active)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn entries_for_owner_between(
        &self,
        owner: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<Vec<Entry>> {
        let entries = self.entries.read().await;
        let mut matched: Vec<Entry> = entries
            .iter()
            .filter(|e| {
                e.owner == owner && e.is_active && e.created_at >= start && e.created_at <= end
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn recurring_on_day(&self, day: u8) -> anyhow::Result<Vec<Entry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|e| e.is_active && e.recurrence_day == Some(day))
            .cloned()
            .collect())
    }

    async fn was_materialized(
        &self,
        source: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let entries = self.entries.read().await;
        Ok(entries.iter().any(|e| {
            e.source_entry == Some(source) && e.created_at >= start && e.created_at <= end
        }))
    }
}
