//! Top-K ranking: a pure, deterministic read.

use crate::model::{EntityKey, EntityKind, Scope, WindowKind};
use crate::store::{CounterStore, StoreError};
use crate::window::WindowManager;
use chrono::{DateTime, Utc};

/// Default cap on leaderboard size.
pub const DEFAULT_MAX_LEADERBOARD: usize = 10;

/// Top `k` entities of `kind` in `scope` over `window`, as of `now`.
/// The engine clamps `k` to its configured cap before calling so
/// result sets stay bounded. Ordering is value descending, entity id
/// ascending on ties; repeated calls over an unchanged counter set
/// return the same sequence.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] on storage failure.
pub fn rank(
    store: &CounterStore,
    windows: &WindowManager,
    scope: Scope,
    window: WindowKind,
    kind: EntityKind,
    k: usize,
    now: DateTime<Utc>,
) -> Result<Vec<(EntityKey, u64)>, StoreError> {
    let bucket = windows.bucket_key(window, now);
    store.top_k(scope, window, &bucket, kind, k)
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MAX_LEADERBOARD, rank};
    use crate::db::Database;
    use crate::model::{EntityKey, EntityKind, Scope, WindowKind};
    use crate::store::{CounterKey, CounterStore};
    use crate::window::WindowManager;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().expect("parse test instant")
    }

    #[test]
    fn rank_never_exceeds_k() {
        let store = CounterStore::new(Database::open_in_memory().expect("db"));
        let windows = WindowManager::utc();
        let now = at("2026-08-28T12:00:00Z");

        for user in 0..30 {
            store
                .increment(
                    &CounterKey {
                        scope: Scope::Global,
                        window: WindowKind::Overall,
                        bucket: windows.bucket_key(WindowKind::Overall, now),
                        entity: EntityKey::User(user),
                    },
                    1,
                )
                .expect("increment");
        }

        let top = rank(
            &store,
            &windows,
            Scope::Global,
            WindowKind::Overall,
            EntityKind::User,
            DEFAULT_MAX_LEADERBOARD,
            now,
        )
        .expect("rank");
        assert_eq!(top.len(), DEFAULT_MAX_LEADERBOARD);
    }

    #[test]
    fn rank_is_deterministic_over_unchanged_counters() {
        let store = CounterStore::new(Database::open_in_memory().expect("db"));
        let windows = WindowManager::utc();
        let now = at("2026-08-28T12:00:00Z");

        for user in [9, 2, 5, 7] {
            store
                .increment(
                    &CounterKey {
                        scope: Scope::Global,
                        window: WindowKind::Overall,
                        bucket: windows.bucket_key(WindowKind::Overall, now),
                        entity: EntityKey::User(user),
                    },
                    3,
                )
                .expect("increment");
        }

        let first = rank(
            &store,
            &windows,
            Scope::Global,
            WindowKind::Overall,
            EntityKind::User,
            10,
            now,
        )
        .expect("rank");
        let second = rank(
            &store,
            &windows,
            Scope::Global,
            WindowKind::Overall,
            EntityKind::User,
            10,
            now,
        )
        .expect("rank");

        assert_eq!(first, second);
        let ids: Vec<i64> = first.iter().map(|(e, _)| e.id()).collect();
        assert_eq!(ids, vec![2, 5, 7, 9]);
    }
}
