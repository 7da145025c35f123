//! Best-effort display-name cache.
//!
//! Names are stored raw; HTML escaping belongs to the render
//! boundary so the same value is never escaped twice. Writes are
//! fire-and-forget from the counting path's point of view: the
//! engine logs a failed upsert and moves on.

use crate::db::Database;
use crate::model::{UserId, UserProfile};
use crate::store::StoreError;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{OptionalExtension, params};

/// Name shown when no profile has been recorded for a user.
pub const PLACEHOLDER_NAME: &str = "User";

/// user id -> display name mapping, upserted opportunistically on
/// every event that carries a fresher name. Staleness is tolerated.
#[derive(Debug, Clone)]
pub struct ProfileCache {
    db: Database,
}

impl ProfileCache {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record the latest display name seen for a user. Blank names
    /// are ignored rather than overwriting a useful one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure.
    pub fn upsert(
        &self,
        user_id: UserId,
        display_name: &str,
        seen_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let name = display_name.trim();
        if name.is_empty() {
            return Ok(());
        }

        let conn = self.db.conn();
        conn.execute(
            "INSERT INTO profiles (user_id, display_name, updated_at_us)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id) DO UPDATE SET
                 display_name = excluded.display_name,
                 updated_at_us = excluded.updated_at_us",
            params![user_id, name, seen_at.timestamp_micros()],
        )?;
        Ok(())
    }

    /// The raw stored profile, or `None` if the user was never seen.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure.
    pub fn lookup(&self, user_id: UserId) -> Result<Option<UserProfile>, StoreError> {
        let conn = self.db.conn();
        let row = conn
            .query_row(
                "SELECT display_name, updated_at_us FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let display_name: String = row.get(0)?;
                    let updated_at_us: i64 = row.get(1)?;
                    Ok((display_name, updated_at_us))
                },
            )
            .optional()?;

        Ok(row.map(|(display_name, updated_at_us)| UserProfile {
            user_id,
            display_name,
            updated_at: Utc
                .timestamp_micros(updated_at_us)
                .single()
                .unwrap_or_default(),
        }))
    }
}
