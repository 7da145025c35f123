//! Window manager: resolves an instant to the bucket key an
//! increment must target.
//!
//! Buckets are never reset in place. Day and week counters are keyed
//! by the calendar bucket they fell into, so "today" always resolves
//! to the bucket matching the current instant and stale buckets are
//! simply never read again. The reference timezone is a fixed UTC
//! offset: keys are derived by truncating an absolute instant, so a
//! repeated wall-clock hour (DST fall-back) can never make a key go
//! backward.

use crate::model::WindowKind;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, Days, FixedOffset, Utc, Weekday};
use std::fmt;

/// Concrete bucket identifier a window resolves to at some instant:
/// `all`, `YYYY-MM-DD`, or `YYYY-Www`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey(String);

impl BucketKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves (window kind, instant) to bucket keys.
#[derive(Debug, Clone, Copy)]
pub struct WindowManager {
    offset: FixedOffset,
    week_start: Weekday,
}

impl WindowManager {
    /// Build a manager for a fixed reference offset (minutes east of
    /// UTC) and week-start weekday.
    ///
    /// # Errors
    ///
    /// Returns an error if the offset is outside +/-24 hours.
    pub fn new(utc_offset_minutes: i32, week_start: Weekday) -> Result<Self> {
        let seconds = utc_offset_minutes
            .checked_mul(60)
            .context("utc offset out of range")?;
        let Some(offset) = FixedOffset::east_opt(seconds) else {
            bail!("utc offset {utc_offset_minutes} minutes is out of range");
        };
        Ok(Self { offset, week_start })
    }

    /// UTC manager with ISO (Monday-start) weeks.
    #[must_use]
    pub fn utc() -> Self {
        Self {
            offset: FixedOffset::east_opt(0).expect("zero offset is always valid"),
            week_start: Weekday::Mon,
        }
    }

    /// The bucket an increment at `t` belongs to for `kind`.
    #[must_use]
    pub fn bucket_key(&self, kind: WindowKind, t: DateTime<Utc>) -> BucketKey {
        let local = t.with_timezone(&self.offset).date_naive();
        let key = match kind {
            WindowKind::Overall => "all".to_string(),
            WindowKind::Day => local.format("%Y-%m-%d").to_string(),
            WindowKind::Week => {
                // Truncate to the configured week start, then label the
                // bucket with the ISO week of that start day. For the
                // default Monday start this is exactly the ISO week id.
                let back = (local.weekday().num_days_from_monday() + 7
                    - self.week_start.num_days_from_monday())
                    % 7;
                let start = local
                    .checked_sub_days(Days::new(u64::from(back)))
                    .unwrap_or(local);
                let iso = start.iso_week();
                format!("{:04}-W{:02}", iso.year(), iso.week())
            }
        };
        BucketKey(key)
    }
}
