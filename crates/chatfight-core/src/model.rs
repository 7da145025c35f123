//! Typed records for the counting and ranking engine.
//!
//! Everything the store persists or the engine exposes goes through
//! these types; raw rows and stringly-typed keys stop at the store
//! boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User identifier as assigned by the chat platform.
pub type UserId = i64;

/// Chat identifier as assigned by the chat platform (negative for
/// supergroups).
pub type GroupId = i64;

/// Aggregation boundary for a counter: one group, or the whole
/// platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Group(GroupId),
    Global,
}

impl Scope {
    /// Stable storage key for this scope (`global` or `group:<id>`).
    #[must_use]
    pub fn storage_key(self) -> String {
        match self {
            Self::Group(id) => format!("group:{id}"),
            Self::Global => "global".to_string(),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

/// Error for a scope string that is neither `global` nor `group:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid scope {input:?}: expected `global` or `group:<id>`")]
pub struct ParseScopeError {
    pub input: String,
}

impl FromStr for Scope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(Self::Global);
        }
        if let Some(id) = s.strip_prefix("group:")
            && let Ok(id) = id.parse::<GroupId>()
        {
            return Ok(Self::Group(id));
        }
        Err(ParseScopeError {
            input: s.to_string(),
        })
    }
}

/// Time horizon a counter is summed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    /// Single eternal bucket; never rolls over.
    Overall,
    /// Calendar date in the reference timezone; rolls at local midnight.
    Day,
    /// ISO week at the configured week start.
    Week,
}

impl WindowKind {
    /// All windows an increment fans out to.
    pub const ALL: [Self; 3] = [Self::Overall, Self::Day, Self::Week];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overall => "overall",
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a window string outside `overall` / `day` / `week`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid window {input:?}: expected `overall`, `day`, or `week`")]
pub struct ParseWindowError {
    pub input: String,
}

impl FromStr for WindowKind {
    type Err = ParseWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overall" => Ok(Self::Overall),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(ParseWindowError {
                input: other.to_string(),
            }),
        }
    }
}

/// What kind of identity a counter row tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Group,
    /// The running total for an entire scope.
    Total,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Total => "total",
        }
    }
}

/// The identity being counted.
///
/// `ScopeTotal` is the explicit running total for a scope, kept in
/// step with the per-user increments so "total messages" reads stay
/// O(1) instead of summing every user counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKey {
    User(UserId),
    Group(GroupId),
    ScopeTotal,
}

impl EntityKey {
    #[must_use]
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::Group(_) => EntityKind::Group,
            Self::ScopeTotal => EntityKind::Total,
        }
    }

    /// Numeric id column value; the scope total row uses 0.
    #[must_use]
    pub const fn id(self) -> i64 {
        match self {
            Self::User(id) | Self::Group(id) => id,
            Self::ScopeTotal => 0,
        }
    }
}

/// Chat type as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatType {
    /// Whether activity in this chat type is counted at all.
    #[must_use]
    pub const fn qualifies(self) -> bool {
        matches!(self, Self::Group | Self::Supergroup)
    }
}

/// One user posted once in one group. Ephemeral: folded into
/// counters and dropped, never stored as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityEvent {
    pub actor_id: UserId,
    pub group_id: GroupId,
    pub occurred_at: DateTime<Utc>,
}

/// Best-effort display-name record. Stale values are acceptable;
/// absence renders as a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub updated_at: DateTime<Utc>,
}

/// One row of a rendered leaderboard. `display_name` is raw
/// (unescaped); escaping happens at the render boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub entity: EntityKey,
    pub display_name: Option<String>,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::{ChatType, EntityKey, EntityKind, Scope, WindowKind};

    #[test]
    fn scope_storage_key_round_trips() {
        for scope in [Scope::Global, Scope::Group(-1_001_234), Scope::Group(42)] {
            let parsed: Scope = scope.storage_key().parse().expect("parse scope");
            assert_eq!(parsed, scope);
        }
    }

    #[test]
    fn scope_rejects_garbage() {
        assert!("".parse::<Scope>().is_err());
        assert!("group:".parse::<Scope>().is_err());
        assert!("group:abc".parse::<Scope>().is_err());
        assert!("Global".parse::<Scope>().is_err());
    }

    #[test]
    fn window_kind_round_trips() {
        for kind in WindowKind::ALL {
            let parsed: WindowKind = kind.as_str().parse().expect("parse window");
            assert_eq!(parsed, kind);
        }
        assert!("month".parse::<WindowKind>().is_err());
    }

    #[test]
    fn entity_key_kind_and_id() {
        assert_eq!(EntityKey::User(7).kind(), EntityKind::User);
        assert_eq!(EntityKey::Group(-9).id(), -9);
        assert_eq!(EntityKey::ScopeTotal.id(), 0);
        assert_eq!(EntityKey::ScopeTotal.kind(), EntityKind::Total);
    }

    #[test]
    fn only_group_chats_qualify() {
        assert!(ChatType::Group.qualifies());
        assert!(ChatType::Supergroup.qualifies());
        assert!(!ChatType::Private.qualifies());
        assert!(!ChatType::Channel.qualifies());
    }
}
