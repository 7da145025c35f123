//! Engine facade: the narrow interface the presentation layer sees.
//!
//! One engine is instantiated per process and passed by reference;
//! there is no ambient global state. Inbound activity is filtered
//! here, fanned out into counters, and dropped. Every outbound query
//! is a bounded read that degrades to "no data" rather than hanging.

use crate::aggregate;
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::db::Database;
use crate::model::{
    ActivityEvent, ChatType, EntityKey, EntityKind, GroupId, LeaderboardRow, Scope, UserId,
    WindowKind,
};
use crate::profile::ProfileCache;
use crate::rank;
use crate::retry::{RetryPolicy, with_retry};
use crate::store::{CounterKey, CounterStore, StoreError};
use crate::window::WindowManager;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Inbound activity notification, exactly the fields the transport
/// can assert about a message without inspecting its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundActivity {
    pub actor_id: UserId,
    pub actor_is_bot: bool,
    pub chat_id: GroupId,
    pub chat_type: ChatType,
    /// True when the message is attributed to a chat (anonymous
    /// admins, linked channels) rather than a user.
    pub sender_is_chat: bool,
}

impl InboundActivity {
    /// The inbound filter: only real users posting in group-type
    /// chats are counted. Bot senders, non-group chats, and
    /// sender-chat-attributed messages increment nothing.
    #[must_use]
    pub const fn qualifies(&self) -> bool {
        self.chat_type.qualifies() && !self.sender_is_chat && !self.actor_is_bot
    }
}

/// The counting and ranking engine.
pub struct Engine {
    store: CounterStore,
    profiles: ProfileCache,
    windows: WindowManager,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
    max_leaderboard: usize,
}

impl Engine {
    /// Open the engine against the configured database with the
    /// system clock.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the
    /// window configuration is invalid.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let db = Database::open(&config.database.path).context("open engine database")?;
        Self::with_parts(db, config, Arc::new(SystemClock))
    }

    /// Build an engine from an existing database handle and clock.
    /// Tests and replay tooling inject a manual clock here.
    ///
    /// # Errors
    ///
    /// Returns an error if the window configuration is invalid.
    pub fn with_parts(
        db: Database,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let windows = WindowManager::new(
            config.windows.utc_offset_minutes,
            config.windows.week_start()?,
        )
        .context("build window manager")?;

        Ok(Self {
            store: CounterStore::new(db.clone()),
            profiles: ProfileCache::new(db),
            windows,
            clock,
            retry: config.retry.policy(),
            max_leaderboard: config.ranking.max_leaderboard_size,
        })
    }

    /// Process one inbound activity notification at the current
    /// instant. Returns whether the event was counted.
    pub fn on_activity(&self, inbound: &InboundActivity) -> bool {
        self.on_activity_at(inbound, self.clock.now())
    }

    /// Process one inbound activity notification at an explicit
    /// instant (event replay, tests).
    ///
    /// Failures never propagate: each increment is retried with
    /// bounded backoff and an exhaustively failed one is logged and
    /// dropped. Counts are best-effort, not exactly-once.
    pub fn on_activity_at(&self, inbound: &InboundActivity, at: DateTime<Utc>) -> bool {
        if !inbound.qualifies() {
            debug!(
                actor_id = inbound.actor_id,
                chat_id = inbound.chat_id,
                "ignoring non-qualifying activity"
            );
            return false;
        }

        let event = ActivityEvent {
            actor_id: inbound.actor_id,
            group_id: inbound.chat_id,
            occurred_at: at,
        };
        self.record(&event);
        true
    }

    /// Opportunistic profile update. Failures are swallowed: a
    /// display-name write must never block or fail the counting
    /// path.
    pub fn on_display_name_seen(&self, user_id: UserId, display_name: &str) {
        if let Err(e) = self
            .profiles
            .upsert(user_id, display_name, self.clock.now())
        {
            warn!(user_id, error = %e, "profile upsert failed, ignoring");
        }
    }

    /// Total messages by `user_id` in `scope` over `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure;
    /// callers degrade to a "no data yet" rendering.
    pub fn get_user_total(
        &self,
        user_id: UserId,
        scope: Scope,
        window: WindowKind,
    ) -> Result<u64, StoreError> {
        aggregate::user_total(
            &self.store,
            &self.windows,
            scope,
            window,
            user_id,
            self.clock.now(),
        )
    }

    /// Total messages in one group over `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure.
    pub fn get_group_total(&self, group_id: GroupId, window: WindowKind) -> Result<u64, StoreError> {
        aggregate::scope_total(
            &self.store,
            &self.windows,
            Scope::Group(group_id),
            window,
            self.clock.now(),
        )
    }

    /// Total messages across the whole platform over `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure.
    pub fn get_global_total(&self, window: WindowKind) -> Result<u64, StoreError> {
        aggregate::scope_total(
            &self.store,
            &self.windows,
            Scope::Global,
            window,
            self.clock.now(),
        )
    }

    /// Top users in `scope` over `window`, display names attached
    /// from the profile cache (placeholder handling is the render
    /// boundary's job). `k` is clamped to the configured cap.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure.
    pub fn get_leaderboard(
        &self,
        scope: Scope,
        window: WindowKind,
        k: usize,
    ) -> Result<Vec<LeaderboardRow>, StoreError> {
        let ranked = rank::rank(
            &self.store,
            &self.windows,
            scope,
            window,
            EntityKind::User,
            k.min(self.max_leaderboard),
            self.clock.now(),
        )?;

        Ok(ranked
            .into_iter()
            .map(|(entity, count)| {
                let display_name = match entity {
                    EntityKey::User(user_id) => self.display_name_of(user_id),
                    _ => None,
                };
                LeaderboardRow {
                    entity,
                    display_name,
                    count,
                }
            })
            .collect())
    }

    /// Top groups across the platform over `window`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] on storage failure.
    pub fn get_group_leaderboard(
        &self,
        window: WindowKind,
        k: usize,
    ) -> Result<Vec<LeaderboardRow>, StoreError> {
        let ranked = rank::rank(
            &self.store,
            &self.windows,
            Scope::Global,
            window,
            EntityKind::Group,
            k.min(self.max_leaderboard),
            self.clock.now(),
        )?;

        Ok(ranked
            .into_iter()
            .map(|(entity, count)| LeaderboardRow {
                entity,
                display_name: None,
                count,
            })
            .collect())
    }

    /// Name lookup for rendering. A failed lookup degrades to the
    /// placeholder, it never fails the ranking read.
    fn display_name_of(&self, user_id: UserId) -> Option<String> {
        match self.profiles.lookup(user_id) {
            Ok(profile) => profile.map(|p| p.display_name),
            Err(e) => {
                warn!(user_id, error = %e, "profile lookup failed, using placeholder");
                None
            }
        }
    }

    /// Fan one event out into its counters. Each (scope, window,
    /// entity) increment is a single atomic store operation retried
    /// independently; partial application under a crash is accepted.
    fn record(&self, event: &ActivityEvent) {
        let group = Scope::Group(event.group_id);
        let targets = [
            (group, EntityKey::User(event.actor_id)),
            (group, EntityKey::ScopeTotal),
            (Scope::Global, EntityKey::User(event.actor_id)),
            (Scope::Global, EntityKey::Group(event.group_id)),
            (Scope::Global, EntityKey::ScopeTotal),
        ];

        for window in WindowKind::ALL {
            let bucket = self.windows.bucket_key(window, event.occurred_at);
            for (scope, entity) in targets {
                let key = CounterKey {
                    scope,
                    window,
                    bucket: bucket.clone(),
                    entity,
                };
                if let Err(e) =
                    with_retry(self.retry, "counter_increment", || self.store.increment(&key, 1))
                {
                    error!(
                        scope = %scope,
                        window = %window,
                        error = %e,
                        "dropping increment after exhausted retries"
                    );
                }
            }
        }
    }
}
