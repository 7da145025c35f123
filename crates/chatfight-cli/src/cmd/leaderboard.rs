use crate::output::{OutputMode, print_json};
use anyhow::{Context, Result};
use chatfight_core::{Engine, Scope, WindowKind, render};
use clap::Args;

#[derive(Args, Debug)]
pub struct LeaderboardArgs {
    /// Rank inside one group; omit for the platform-wide board.
    #[arg(long, allow_negative_numbers = true)]
    pub group: Option<i64>,

    /// Time window: overall, day, or week.
    #[arg(long, default_value = "overall")]
    pub window: String,

    /// How many rows to show (capped by engine config).
    #[arg(short = 'k', long, default_value_t = 10)]
    pub top: usize,

    /// Rank groups instead of users (platform scope only).
    #[arg(long, conflicts_with = "group")]
    pub groups: bool,
}

/// Execute `cf leaderboard`.
///
/// # Errors
///
/// Returns an error on an invalid window name or a store failure.
pub fn run_leaderboard(args: &LeaderboardArgs, engine: &Engine, mode: OutputMode) -> Result<()> {
    let window: WindowKind = args.window.parse()?;

    let (title, scope) = match (args.groups, args.group) {
        (true, _) => ("TOP GROUPS", Scope::Global),
        (false, Some(group)) => ("LEADERBOARD", Scope::Group(group)),
        (false, None) => ("GLOBAL LEADERBOARD", Scope::Global),
    };

    let rows = if args.groups {
        engine
            .get_group_leaderboard(window, args.top)
            .context("rank groups")?
    } else {
        engine
            .get_leaderboard(scope, window, args.top)
            .context("rank users")?
    };

    let total = match scope {
        Scope::Group(group) => engine.get_group_total(group, window),
        Scope::Global => engine.get_global_total(window),
    }
    .context("read scope total")?;

    if mode.is_json() {
        print_json(&serde_json::json!({
            "window": window,
            "scope": scope.to_string(),
            "total": total,
            "rows": rows,
        }))?;
    } else {
        println!("{}", render::format_leaderboard(title, &rows, total));
    }
    Ok(())
}
