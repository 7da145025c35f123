use crate::output::{OutputMode, print_json};
use anyhow::{Context, Result};
use chatfight_core::{Engine, Scope, WindowKind};
use clap::Args;

#[derive(Args, Debug)]
pub struct TotalArgs {
    /// Per-user total. Combine with --group for one group's count.
    #[arg(long)]
    pub user: Option<i64>,

    /// Group scope (per-group total, or the group for --user).
    #[arg(long, allow_negative_numbers = true)]
    pub group: Option<i64>,

    /// Time window: overall, day, or week.
    #[arg(long, default_value = "overall")]
    pub window: String,
}

/// Execute `cf total`: user total, group total, or platform total
/// depending on which identifiers are present.
///
/// # Errors
///
/// Returns an error on an invalid window name or a store failure.
pub fn run_total(args: &TotalArgs, engine: &Engine, mode: OutputMode) -> Result<()> {
    let window: WindowKind = args.window.parse()?;

    let (label, total) = match (args.user, args.group) {
        (Some(user), Some(group)) => (
            format!("user {user} in group {group}"),
            engine.get_user_total(user, Scope::Group(group), window),
        ),
        (Some(user), None) => (
            format!("user {user}"),
            engine.get_user_total(user, Scope::Global, window),
        ),
        (None, Some(group)) => (
            format!("group {group}"),
            engine.get_group_total(group, window),
        ),
        (None, None) => ("platform".to_string(), engine.get_global_total(window)),
    };
    let total = total.context("read total")?;

    if mode.is_json() {
        print_json(&serde_json::json!({
            "window": window,
            "subject": label,
            "total": total,
        }))?;
    } else {
        println!("{window} messages for {label}: {total}");
    }
    Ok(())
}
