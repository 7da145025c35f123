//! Counter store: the one component with a real atomicity
//! obligation.
//!
//! Every increment is a single SQL UPSERT, so concurrent callers
//! targeting the same key are linearized by SQLite itself; lost
//! updates cannot happen regardless of how many threads share the
//! store. Reads are point lookups or a single ordered LIMIT query.

use crate::db::Database;
use crate::model::{EntityKey, EntityKind, Scope, WindowKind};
use crate::window::BucketKey;
use rusqlite::{ErrorCode, OptionalExtension, params};

/// Failure surfaced by the counter store or profile cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transient or permanent storage failure. Writes may be retried
    /// with bounded backoff when [`StoreError::is_transient`] holds.
    #[error("counter store unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    /// A stored or requested value cannot be represented as a count.
    #[error("counter value out of range: {detail}")]
    ValueOutOfRange { detail: String },
}

impl StoreError {
    /// Whether retrying the same operation can reasonably succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable(rusqlite::Error::SqliteFailure(error, _)) => matches!(
                error.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

/// Full identity of one counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey {
    pub scope: Scope,
    pub window: WindowKind,
    pub bucket: BucketKey,
    pub entity: EntityKey,
}

/// Durable (scope, window, bucket, entity) -> count mapping.
///
/// Clones share the same database; the atomicity contract is
/// internal, callers never lock.
#[derive(Debug, Clone)]
pub struct CounterStore {
    db: Database,
}

impl CounterStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Atomically add `by` to the counter, creating it at 0 first if
    /// absent. Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure and
    /// [`StoreError::ValueOutOfRange`] if the delta or the resulting
    /// value cannot be represented.
    pub fn increment(&self, key: &CounterKey, by: u64) -> Result<u64, StoreError> {
        let delta = i64::try_from(by).map_err(|_| StoreError::ValueOutOfRange {
            detail: format!("increment delta {by} exceeds i64"),
        })?;

        let conn = self.db.conn();
        let value: i64 = conn.query_row(
            "INSERT INTO counters (scope, window_kind, bucket_key, entity_kind, entity_id, value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (scope, window_kind, bucket_key, entity_kind, entity_id)
             DO UPDATE SET value = value + excluded.value
             RETURNING value",
            params![
                key.scope.storage_key(),
                key.window.as_str(),
                key.bucket.as_str(),
                key.entity.kind().as_str(),
                key.entity.id(),
                delta,
            ],
            |row| row.get(0),
        )?;

        to_count(value)
    }

    /// Current value of the counter; 0 if it was never incremented.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure.
    pub fn get(&self, key: &CounterKey) -> Result<u64, StoreError> {
        let conn = self.db.conn();
        let value: Option<i64> = conn
            .query_row(
                "SELECT value FROM counters
                 WHERE scope = ?1 AND window_kind = ?2 AND bucket_key = ?3
                   AND entity_kind = ?4 AND entity_id = ?5",
                params![
                    key.scope.storage_key(),
                    key.window.as_str(),
                    key.bucket.as_str(),
                    key.entity.kind().as_str(),
                    key.entity.id(),
                ],
                |row| row.get(0),
            )
            .optional()?;

        value.map_or(Ok(0), to_count)
    }

    /// Top `k` entities of `kind` in one bucket, value descending,
    /// ties broken by entity id ascending so repeated queries over an
    /// unchanged counter set are deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure.
    pub fn top_k(
        &self,
        scope: Scope,
        window: WindowKind,
        bucket: &BucketKey,
        kind: EntityKind,
        k: usize,
    ) -> Result<Vec<(EntityKey, u64)>, StoreError> {
        let limit = i64::try_from(k).unwrap_or(i64::MAX);

        let conn = self.db.conn();
        let mut stmt = conn.prepare_cached(
            "SELECT entity_id, value FROM counters
             WHERE scope = ?1 AND window_kind = ?2 AND bucket_key = ?3
               AND entity_kind = ?4 AND value > 0
             ORDER BY value DESC, entity_id ASC
             LIMIT ?5",
        )?;

        let rows = stmt.query_map(
            params![
                scope.storage_key(),
                window.as_str(),
                bucket.as_str(),
                kind.as_str(),
                limit,
            ],
            |row| {
                let id: i64 = row.get(0)?;
                let value: i64 = row.get(1)?;
                Ok((id, value))
            },
        )?;

        let mut out = Vec::new();
        for row in rows {
            let (id, value) = row?;
            let entity = match kind {
                EntityKind::User => EntityKey::User(id),
                EntityKind::Group => EntityKey::Group(id),
                EntityKind::Total => EntityKey::ScopeTotal,
            };
            out.push((entity, to_count(value)?));
        }
        Ok(out)
    }
}

fn to_count(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::ValueOutOfRange {
        detail: format!("stored value {value} is negative"),
    })
}
