use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    Entry, EntryChanges, LedgerStore, NewEntry, NewUser, User, UserChanges, UserStore,
};

/// Postgres-backed implementation of both store seams.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_active: bool,
    created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> anyhow::Result<Self> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse()?,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct EntryRow {
    id: Uuid,
    owner_id: Uuid,
    amount: f64,
    description: Option<String>,
    kind: String,
    recurrence_day: Option<i32>,
    source_entry: Option<Uuid>,
    is_active: bool,
    created_at: OffsetDateTime,
}

impl TryFrom<EntryRow> for Entry {
    type Error = anyhow::Error;

    fn try_from(row: EntryRow) -> anyhow::Result<Self> {
        let recurrence_day = row
            .recurrence_day
            .map(u8::try_from)
            .transpose()
            .context("recurrence_day out of range")?;
        Ok(Entry {
            id: row.id,
            owner: row.owner_id,
            amount: row.amount,
            description: row.description,
            kind: row.kind.parse()?,
            recurrence_day,
            source_entry: row.source_entry,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, new: NewUser) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, is_active, created_at
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await
        .context("insert user")?;
        row.try_into()
    }

    async fn user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetch user by id")?;
        row.map(User::try_from).transpose()
    }

    async fn user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("fetch user by email")?;
        row.map(User::try_from).transpose()
    }

    async fn first_user_by_name(&self, pattern: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, is_active, created_at
            FROM users
            WHERE name ILIKE '%' || $1 || '%' AND is_active = TRUE
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await
        .context("search user by name")?;
        row.map(User::try_from).transpose()
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                role = COALESCE($4, role)
            WHERE id = $1 AND is_active = TRUE
            RETURNING id, name, email, password_hash, role, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.password_hash)
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await
        .context("update user")?;
        row.map(User::try_from).transpose()
    }

    async fn deactivate_user(&self, id: Uuid) -> anyhow::Result<bool> {
        let result =
            sqlx::query(r#"UPDATE users SET is_active = FALSE WHERE id = $1 AND is_active = TRUE"#)
                .bind(id)
                .execute(&self.pool)
                .await
                .context("deactivate user")?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn insert_entry(&self, new: NewEntry) -> anyhow::Result<Entry> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            INSERT INTO transactions
                (owner_id, amount, description, kind, recurrence_day, source_entry, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, owner_id, amount, description, kind, recurrence_day,
                      source_entry, is_active, created_at
            "#,
        )
        .bind(new.owner)
        .bind(new.amount)
        .bind(new.description)
        .bind(new.kind.as_str())
        .bind(new.recurrence_day.map(i32::from))
        .bind(new.source_entry)
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await
        .context("insert transaction")?;
        row.try_into()
    }

    async fn entry_by_id(&self, id: Uuid) -> anyhow::Result<Option<Entry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, owner_id, amount, description, kind, recurrence_day,
                   source_entry, is_active, created_at
            FROM transactions
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("fetch transaction by id")?;
        row.map(Entry::try_from).transpose()
    }

    async fn replace_entry(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: EntryChanges,
    ) -> anyhow::Result<Option<Entry>> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            UPDATE transactions
            SET amount = $3, description = $4, kind = $5, recurrence_day = $6
            WHERE id = $1 AND owner_id = $2 AND is_active = TRUE
            RETURNING id, owner_id, amount, description, kind, recurrence_day,
                      source_entry, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(changes.amount)
        .bind(changes.description)
        .bind(changes.kind.as_str())
        .bind(changes.recurrence_day.map(i32::from))
        .fetch_optional(&self.pool)
        .await
        .context("update transaction")?;
        row.map(Entry::try_from).transpose()
    }

    async fn deactivate_entry(&self, id: Uuid, owner: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET is_active = FALSE
            WHERE id = $1 AND owner_id = $2 AND is_active = TRUE
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.pool)
        .await
        .context("deactivate transaction")?;
        Ok(result.rows_affected() > 0)
    }

    async fn entries_for_owner(&self, owner: Uuid) -> anyhow::Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, owner_id, amount, description, kind, recurrence_day,
                   source_entry, is_active, created_at
            FROM transactions
            WHERE owner_id = $1 AND is_active = TRUE
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .context("list transactions by owner")?;
        rows.into_iter().map(Entry::try_from).collect()
    }

    async fn entries_for_owner_between(
        &self,
        owner: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, owner_id, amount, description, kind, recurrence_day,
                   source_entry, is_active, created_at
            FROM transactions
            WHERE owner_id = $1 AND is_active = TRUE
              AND created_at >= $2 AND created_at <= $3
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .context("list transactions in window")?;
        rows.into_iter().map(Entry::try_from).collect()
    }

    async fn recurring_on_day(&self, day: u8) -> anyhow::Result<Vec<Entry>> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT id, owner_id, amount, description, kind, recurrence_day,
                   source_entry, is_active, created_at
            FROM transactions
            WHERE recurrence_day = $1 AND is_active = TRUE
            "#,
        )
        .bind(i32::from(day))
        .fetch_all(&self.pool)
        .await
        .context("list recurring transactions")?;
        rows.into_iter().map(Entry::try_from).collect()
    }

    async fn was_materialized(
        &self,
        source: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM transactions
                WHERE source_entry = $1 AND created_at >= $2 AND created_at <= $3
            )
            "#,
        )
        .bind(source)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await
        .context("check materialized clone")?;
        Ok(exists)
    }
}
