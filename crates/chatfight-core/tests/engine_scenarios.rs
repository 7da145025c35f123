//! End-to-end scenarios through the engine facade.

use chatfight_core::{
    ChatType, Database, Engine, EngineConfig, EntityKey, InboundActivity, ManualClock,
    RenderOutcome, Scope, WindowKind, render,
};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

fn at(s: &str) -> DateTime<Utc> {
    s.parse().expect("parse test instant")
}

fn engine_at(start: &str) -> (Engine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(at(start)));
    let engine = Engine::with_parts(
        Database::open_in_memory().expect("db"),
        &EngineConfig::default(),
        clock.clone(),
    )
    .expect("engine");
    (engine, clock)
}

fn post(engine: &Engine, user: i64, group: i64, times: u64) {
    for _ in 0..times {
        engine.on_activity(&InboundActivity {
            actor_id: user,
            actor_is_bot: false,
            chat_id: group,
            chat_type: ChatType::Group,
            sender_is_chat: false,
        });
    }
}

#[test]
fn five_messages_day_one_three_day_two() {
    let (engine, clock) = engine_at("2026-08-27T10:00:00Z");
    let group = Scope::Group(-100);

    post(&engine, 1, -100, 5);
    assert_eq!(engine.get_user_total(1, group, WindowKind::Day).expect("d1"), 5);
    assert_eq!(engine.get_user_total(1, group, WindowKind::Overall).expect("overall"), 5);

    clock.set(at("2026-08-28T10:00:00Z"));
    post(&engine, 1, -100, 3);
    assert_eq!(engine.get_user_total(1, group, WindowKind::Day).expect("d2"), 3);
    assert_eq!(engine.get_user_total(1, group, WindowKind::Overall).expect("overall"), 8);

    // Both days are in ISO week 35, so the week window saw all 8.
    assert_eq!(engine.get_user_total(1, group, WindowKind::Week).expect("week"), 8);
}

#[test]
fn ties_break_by_ascending_user_id() {
    let (engine, _clock) = engine_at("2026-08-28T10:00:00Z");
    let (a, b, c) = (11, 22, 33);

    post(&engine, c, -100, 7);
    post(&engine, a, -100, 10);
    post(&engine, b, -100, 7);

    let board = engine
        .get_leaderboard(Scope::Group(-100), WindowKind::Overall, 3)
        .expect("leaderboard");
    let ranked: Vec<(i64, u64)> = board.iter().map(|r| (r.entity.id(), r.count)).collect();
    assert_eq!(ranked, vec![(a, 10), (b, 7), (c, 7)]);
}

#[test]
fn week_window_rolls_at_monday() {
    let (engine, clock) = engine_at("2026-08-30T12:00:00Z"); // Sunday, week 35

    post(&engine, 1, -100, 4);
    assert_eq!(
        engine.get_user_total(1, Scope::Group(-100), WindowKind::Week).expect("week"),
        4
    );

    clock.advance(Duration::hours(13)); // Monday 01:00, week 36
    assert_eq!(
        engine.get_user_total(1, Scope::Group(-100), WindowKind::Week).expect("week"),
        0
    );
    assert_eq!(
        engine
            .get_user_total(1, Scope::Group(-100), WindowKind::Overall)
            .expect("overall"),
        4
    );
}

#[test]
fn global_scope_mirrors_activity_across_groups() {
    let (engine, _clock) = engine_at("2026-08-28T10:00:00Z");

    post(&engine, 1, -100, 2);
    post(&engine, 1, -200, 3);
    post(&engine, 2, -200, 1);

    assert_eq!(
        engine.get_user_total(1, Scope::Global, WindowKind::Overall).expect("user global"),
        5
    );
    assert_eq!(engine.get_group_total(-100, WindowKind::Overall).expect("g1"), 2);
    assert_eq!(engine.get_group_total(-200, WindowKind::Overall).expect("g2"), 4);
    assert_eq!(engine.get_global_total(WindowKind::Overall).expect("platform"), 6);

    let groups = engine
        .get_group_leaderboard(WindowKind::Overall, 10)
        .expect("group board");
    assert_eq!(groups[0].entity, EntityKey::Group(-200));
    assert_eq!(groups[0].count, 4);
}

#[test]
fn renders_leaderboard_and_detects_unchanged_rerender() {
    let (engine, _clock) = engine_at("2026-08-28T10:00:00Z");

    post(&engine, 1, -100, 3);
    post(&engine, 2, -100, 1);
    engine.on_display_name_seen(1, "Ann <3");

    let board = engine
        .get_leaderboard(Scope::Group(-100), WindowKind::Overall, 10)
        .expect("leaderboard");
    let total = engine.get_group_total(-100, WindowKind::Overall).expect("total");

    let text = render::format_leaderboard("LEADERBOARD", &board, total);
    assert!(text.contains("Ann &lt;3"));
    assert!(text.contains("User"));
    assert!(text.ends_with("Total messages: 4"));

    let again = render::format_leaderboard("LEADERBOARD", &board, total);
    assert_eq!(render::reconcile(Some(&text), &again), RenderOutcome::Unchanged);
}
