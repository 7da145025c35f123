//! Render boundary helpers.
//!
//! The engine hands the presentation layer raw leaderboard rows;
//! this module is where names get escaped and rank badges attached.
//! Re-rendering an unchanged leaderboard is a first-class outcome,
//! not a swallowed error.

use crate::model::{EntityKey, LeaderboardRow};
use crate::profile::PLACEHOLDER_NAME;
use std::fmt::Write as _;

/// Result of pushing a rendering to a display surface that supports
/// editing in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The new rendering is identical to what is already shown.
    Unchanged,
    /// The surface was updated to the new rendering.
    Updated,
    /// The surface rejected the update.
    Failed,
}

/// Compare a proposed rendering against what is currently shown.
/// `Failed` is the caller's mapping for surface errors; this helper
/// only distinguishes no-ops from real updates.
#[must_use]
pub fn reconcile(current: Option<&str>, proposed: &str) -> RenderOutcome {
    if current == Some(proposed) {
        RenderOutcome::Unchanged
    } else {
        RenderOutcome::Updated
    }
}

/// Escape a raw display name for embedding in HTML-style markup.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Rank badge: medals for the podium, ordinals after.
#[must_use]
pub fn rank_badge(position: usize) -> String {
    match position {
        1 => "\u{1f947}".to_string(),
        2 => "\u{1f948}".to_string(),
        3 => "\u{1f949}".to_string(),
        n => format!("{n}."),
    }
}

/// Label for a row with no cached display name. Group rows keep
/// their id so a group board stays distinguishable; only user rows
/// fall back to the anonymous placeholder.
fn fallback_label(entity: EntityKey) -> String {
    match entity {
        EntityKey::Group(id) => format!("Group {id}"),
        EntityKey::User(_) | EntityKey::ScopeTotal => PLACEHOLDER_NAME.to_string(),
    }
}

/// Assemble leaderboard text: one badge/name/count line per row plus
/// a total line. Rows with no cached profile render the fallback
/// label for their entity; all names pass through [`escape_html`]
/// here and nowhere else.
#[must_use]
pub fn format_leaderboard(title: &str, rows: &[LeaderboardRow], total: u64) -> String {
    let mut text = format!("{title}\n\n");

    if rows.is_empty() {
        text.push_str("No data yet.\n");
    } else {
        for (position, row) in rows.iter().enumerate() {
            let name = row
                .display_name
                .clone()
                .unwrap_or_else(|| fallback_label(row.entity));
            let _ = writeln!(
                text,
                "{} {} \u{2022} {}",
                rank_badge(position + 1),
                escape_html(&name),
                row.count
            );
        }
    }

    let _ = write!(text, "\nTotal messages: {total}");
    text
}
