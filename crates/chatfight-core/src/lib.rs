//! chatfight-core: counting and ranking engine for group-chat
//! activity leaderboards.
//!
//! The engine tallies per-user activity across three time windows
//! (day, week, overall) and two scopes (one group, the whole
//! platform), and answers deterministic top-K ranking queries.
//! Presentation concerns (commands, buttons, transports) live
//! outside this crate and talk to [`engine::Engine`] only.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums at component boundaries,
//!   `anyhow::Result` with context at application seams.
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`,
//!   `debug!`, `trace!`).

pub mod aggregate;
pub mod clock;
pub mod config;
pub mod db;
pub mod engine;
pub mod model;
pub mod profile;
pub mod rank;
pub mod render;
pub mod retry;
pub mod store;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use db::Database;
pub use engine::{Engine, InboundActivity};
pub use model::{
    ActivityEvent, ChatType, EntityKey, EntityKind, GroupId, LeaderboardRow, Scope, UserId,
    UserProfile, WindowKind,
};
pub use profile::{PLACEHOLDER_NAME, ProfileCache};
pub use render::RenderOutcome;
pub use retry::RetryPolicy;
pub use store::{CounterKey, CounterStore, StoreError};
pub use window::{BucketKey, WindowManager};
