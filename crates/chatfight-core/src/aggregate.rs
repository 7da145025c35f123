//! O(1) total reads over the counter store.
//!
//! The aggregator never sums rows: per-scope totals are their own
//! counters, incremented alongside every user counter, so both reads
//! here are single point lookups against the bucket the window
//! manager resolves for the given instant.
//!
//! Filtering is upstream. Events from bot senders, non-group chats,
//! or sender-chat-attributed messages never reach these counters;
//! the engine facade enforces that before any increment happens.

use crate::model::{Scope, UserId, WindowKind};
use crate::store::{CounterKey, CounterStore, StoreError};
use crate::window::WindowManager;
use chrono::{DateTime, Utc};

/// Total messages by `user` in `scope` over `window`, as of `now`.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] on storage failure.
pub fn user_total(
    store: &CounterStore,
    windows: &WindowManager,
    scope: Scope,
    window: WindowKind,
    user: UserId,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    store.get(&CounterKey {
        scope,
        window,
        bucket: windows.bucket_key(window, now),
        entity: crate::model::EntityKey::User(user),
    })
}

/// Total messages in `scope` over `window`, as of `now`. For a group
/// scope this is the group total; for the global scope, the platform
/// total.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] on storage failure.
pub fn scope_total(
    store: &CounterStore,
    windows: &WindowManager,
    scope: Scope,
    window: WindowKind,
    now: DateTime<Utc>,
) -> Result<u64, StoreError> {
    store.get(&CounterKey {
        scope,
        window,
        bucket: windows.bucket_key(window, now),
        entity: crate::model::EntityKey::ScopeTotal,
    })
}

#[cfg(test)]
mod tests {
    use super::{scope_total, user_total};
    use crate::db::Database;
    use crate::model::{EntityKey, Scope, WindowKind};
    use crate::store::{CounterKey, CounterStore};
    use crate::window::WindowManager;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().expect("parse test instant")
    }

    #[test]
    fn totals_resolve_the_current_bucket() {
        let store = CounterStore::new(Database::open_in_memory().expect("db"));
        let windows = WindowManager::utc();
        let scope = Scope::Group(-5);
        let d1 = at("2026-08-28T09:00:00Z");
        let d2 = at("2026-08-29T09:00:00Z");

        for _ in 0..4 {
            store
                .increment(
                    &CounterKey {
                        scope,
                        window: WindowKind::Day,
                        bucket: windows.bucket_key(WindowKind::Day, d1),
                        entity: EntityKey::User(1),
                    },
                    1,
                )
                .expect("increment");
            store
                .increment(
                    &CounterKey {
                        scope,
                        window: WindowKind::Day,
                        bucket: windows.bucket_key(WindowKind::Day, d1),
                        entity: EntityKey::ScopeTotal,
                    },
                    1,
                )
                .expect("increment");
        }

        assert_eq!(
            user_total(&store, &windows, scope, WindowKind::Day, 1, d1).expect("total"),
            4
        );
        assert_eq!(
            scope_total(&store, &windows, scope, WindowKind::Day, d1).expect("total"),
            4
        );
        // The next day resolves a fresh bucket: totals read 0 without
        // any reset having happened.
        assert_eq!(
            user_total(&store, &windows, scope, WindowKind::Day, 1, d2).expect("total"),
            0
        );
        assert_eq!(
            scope_total(&store, &windows, scope, WindowKind::Day, d2).expect("total"),
            0
        );
    }
}
