mod common;

use std::time::Duration;

use common::World;
use lootwarden_core::domain::{CommandKind, FilterKind, ItemInfo, ListedItem, LootAction, LootEvent, LootItem};
use lootwarden_core::impls::ConfirmMode;
use lootwarden_core::ports::RuleStore;
use lootwarden_core::session::SessionPhase;
use lootwarden_core::{ClearReason, EngineConfig, EngineLoop};
use rstest::rstest;

#[tokio::test(start_paused = true)]
async fn items_are_acted_on_once_per_session() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Rusty Sword", ItemInfo::valued(50)).await;
    w.item("Jade Ring", ItemInfo::valued(2000)).await;
    w.item("Cloth Cap", ItemInfo::valued(12)).await;
    w.rules.save_rule("Cloth Cap", "IGNORE").await.unwrap();
    w.open("a_gnoll", &["Rusty Sword", "Jade Ring", "Cloth Cap"], &[]).await;

    w.ticks(10).await;

    assert_eq!(w.issued_items().await, vec!["Rusty Sword", "Jade Ring", "Cloth Cap"]);
    assert_eq!(
        w.recorder.names().await,
        vec!["SESSION_OPENED", "ITEM_DESTROYED", "ITEM_LOOTED", "ITEM_LEFT"]
    );
    // Cloth Cap は窓に残るが再処理されない
    assert_eq!(w.window.len().await, 1);
    let status = w.engine.status().await;
    assert_eq!(status.phase, SessionPhase::Active);
    assert_eq!(status.processed, 3);
    assert!(!status.busy);
}

#[tokio::test(start_paused = true)]
async fn heuristic_writes_rules_for_next_encounter() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Rusty Sword", ItemInfo::valued(50)).await;
    w.item("Fine Steel Ore", ItemInfo::valued(150).tradeskill()).await;
    w.open("a_gnoll", &["Rusty Sword", "Fine Steel Ore"], &[]).await;

    w.ticks(1).await;

    assert_eq!(w.rules.get_rule("Rusty Sword").await.unwrap().as_deref(), Some("DESTROY"));
    assert_eq!(w.rules.get_rule("Fine Steel Ore").await.unwrap().as_deref(), Some("KEEP"));
    let kinds: Vec<_> = w.client.issued().await.into_iter().map(|i| i.command.kind).collect();
    assert_eq!(kinds.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn commands_are_spaced_by_the_cooldown() {
    let config = EngineConfig::default();
    let spacing = config.min_command_spacing();
    let w = World::new(config, ConfirmMode::Positional);
    let names = ["A", "B", "C", "D", "E"];
    for name in names {
        w.item(name, ItemInfo::valued(5)).await;
    }
    w.open("a_gnoll", &names, &[]).await;

    w.ticks(2).await;

    let issued = w.client.issued().await;
    assert_eq!(issued.len(), names.len());
    for pair in issued.windows(2) {
        assert!(pair[1].at - pair[0].at >= spacing, "{:?}", pair[1].at - pair[0].at);
    }
}

#[tokio::test(start_paused = true)]
async fn each_corpse_gets_its_own_session_with_the_target_recorded() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Cloth Cap", ItemInfo::valued(12)).await;
    w.rules.save_rule("Cloth Cap", "IGNORE").await.unwrap();

    w.open("a_gnoll", &["Cloth Cap"], &[]).await;
    w.ticks(1).await;
    let first = w.engine.status().await;
    w.window.close().await;
    w.ticks(1).await;

    // 同じ名前の別の死体
    w.open("a_gnoll", &["Cloth Cap"], &[]).await;
    w.ticks(1).await;
    let second = w.engine.status().await;

    assert_eq!(first.target.as_deref(), Some("a_gnoll"));
    assert_eq!(second.target.as_deref(), Some("a_gnoll"));
    assert!(first.session.is_some());
    assert_ne!(first.session, second.session);
    let opened: Vec<_> = w
        .recorder
        .events()
        .await
        .into_iter()
        .filter_map(|e| match e {
            LootEvent::SessionOpened { session, target } => Some((Some(session), target)),
            _ => None,
        })
        .collect();
    assert_eq!(
        opened,
        vec![
            (first.session, "a_gnoll".to_string()),
            (second.session, "a_gnoll".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn ancient_relic_is_passed_then_waits_on_the_next_corpse() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Ancient Relic", ItemInfo::valued(0).no_drop()).await;
    w.rules.save_rule("Ancient Relic", "PassTo|Bob[1]|").await.unwrap();
    w.probe.set(0, true, FilterKind::Never).await;

    w.open("a_sand_giant", &[], &["Ancient Relic"]).await;
    w.ticks(2).await;
    assert_eq!(w.engine.status().await.phase, SessionPhase::NoSession);

    w.open("another_sand_giant", &[], &["Ancient Relic"]).await;
    w.ticks(1).await;

    assert!(w.engine.is_waiting("Ancient Relic").await);
    assert_eq!(w.rules.get_rule("Ancient Relic").await.unwrap().as_deref(), Some("PassTo|"));
    assert_eq!(w.issued_items().await, vec!["Ancient Relic"]);
    assert_eq!(
        w.recorder.names().await,
        vec![
            "SESSION_OPENED",
            "ITEM_PASSED",
            "SESSION_CLOSED",
            "SESSION_OPENED",
            "NO_DROP_WAIT_START",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn no_drop_item_is_left_after_the_grace_period() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Relic", ItemInfo::valued(0).no_drop()).await;
    w.probe.set(0, false, FilterKind::No).await;
    w.open("a_gnoll", &["Relic"], &[]).await;

    w.ticks(1).await;
    w.clock.advance(Duration::from_secs(150));
    w.ticks(1).await;
    w.clock.advance(Duration::from_secs(149));
    w.ticks(1).await;
    assert!(w.engine.is_waiting("Relic").await);
    assert!(!w.engine.is_processed("Relic").await);

    w.clock.advance(Duration::from_secs(1));
    w.ticks(3).await;

    assert!(!w.engine.is_waiting("Relic").await);
    assert!(w.engine.is_processed("Relic").await);
    assert!(w.client.issued().await.is_empty());
    let events = w.recorder.events().await;
    let starts = events.iter().filter(|e| e.name() == "NO_DROP_WAIT_START").count();
    let expiries = events.iter().filter(|e| e.name() == "NO_DROP_WAIT_EXPIRED").count();
    assert_eq!((starts, expiries), (1, 1));
}

#[rstest]
#[case::cache_on(true)]
#[case::cache_off(false)]
#[tokio::test(start_paused = true)]
async fn rule_saved_during_wait_takes_over(#[case] cache_enabled: bool) {
    let config = EngineConfig {
        decision_cache_enabled: cache_enabled,
        ..EngineConfig::default()
    };
    let w = World::new(config, ConfirmMode::WithId);
    w.item("Relic", ItemInfo::valued(0).no_drop()).await;
    w.probe.set(0, false, FilterKind::Never).await;
    w.open("a_gnoll", &["Relic"], &[]).await;

    w.ticks(1).await;
    assert!(w.engine.is_waiting("Relic").await);
    assert_eq!(w.engine.status().await.cache_entries, 0);

    w.rules.save_rule("Relic", "PASS|Sue").await.unwrap();
    // filter cache の TTL だけ進める。decision cache の TTL は残っている
    w.clock.advance(Duration::from_secs(6));
    w.ticks(1).await;

    assert!(!w.engine.is_waiting("Relic").await);
    assert!(matches!(
        w.recorder.events().await.last(),
        Some(LootEvent::ItemPassed { player, .. }) if player == "Sue"
    ));
}

#[tokio::test(start_paused = true)]
async fn decision_cache_bounds_resolver_calls() {
    // 確認が来ないので同じアイテムが毎 tick 判断対象に戻る
    let w = World::new(EngineConfig::default(), ConfirmMode::Never);
    w.item("Jade Ring", ItemInfo::valued(2000)).await;
    w.rules.save_rule("Jade Ring", "KEEP").await.unwrap();
    w.open("a_gnoll", &["Jade Ring"], &[]).await;

    w.ticks(1).await;
    let first = w.rules.reads();
    assert!(first > 0);

    w.ticks(3).await;
    w.clock.advance(Duration::from_secs(29));
    w.ticks(1).await;
    assert_eq!(w.rules.reads(), first);
    assert_eq!(w.issued_items().await.len(), 5);

    w.clock.advance(Duration::from_secs(1));
    w.ticks(1).await;
    assert!(w.rules.reads() > first);
    let status = w.engine.status().await;
    assert_eq!(status.cache_entries, 1);
    assert!(status.filter_cache_entries > 0);
}

#[tokio::test(start_paused = true)]
async fn disabled_cache_resolves_every_tick_with_the_same_outcome() {
    let config = EngineConfig {
        decision_cache_enabled: false,
        ..EngineConfig::default()
    };
    let w = World::new(config, ConfirmMode::WithId);
    w.item("Relic", ItemInfo::valued(0).no_drop()).await;
    w.probe.set(0, false, FilterKind::Never).await;
    w.open("a_gnoll", &["Relic"], &[]).await;

    w.ticks(1).await;
    let first = w.rules.reads();
    w.ticks(1).await;

    assert!(w.rules.reads() > first);
    assert!(w.engine.is_waiting("Relic").await);
    assert_eq!(w.engine.status().await.cache_entries, 0);
}

#[tokio::test(start_paused = true)]
async fn timed_out_command_is_retried_on_a_later_tick() {
    let w = World::new(EngineConfig::default(), ConfirmMode::Never);
    w.item("Jade Ring", ItemInfo::valued(2000)).await;
    w.open("a_gnoll", &["Jade Ring"], &[]).await;

    let report = w.engine.tick().await.unwrap();
    assert_eq!(report.failed, 1);
    assert!(!w.engine.is_processed("Jade Ring").await);
    assert!(!w.engine.status().await.busy);

    w.ticks(1).await;

    assert_eq!(w.issued_items().await, vec!["Jade Ring", "Jade Ring"]);
    let names = w.recorder.names().await;
    assert_eq!(names.iter().filter(|n| **n == "COMMAND_TIMED_OUT").count(), 2);
    assert_eq!(w.engine.status().await.executor.timed_out, 2);
}

#[tokio::test(start_paused = true)]
async fn shared_loot_needs_primary_decider() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Jade Ring", ItemInfo::valued(2000)).await;
    w.item("Crown", ItemInfo::valued(5000)).await;
    w.authority.set(false);
    w.open("a_gnoll", &["Jade Ring"], &["Crown"]).await;

    let report = w.engine.tick().await.unwrap();
    assert_eq!(report.unauthorized, 1);
    assert_eq!(w.issued_items().await, vec!["Jade Ring"]);

    w.authority.set(true);
    w.ticks(1).await;
    assert_eq!(w.issued_items().await, vec!["Jade Ring", "Crown"]);
    assert!(w.client.issued().await[1].command.shared);
}

#[tokio::test(start_paused = true)]
async fn lore_item_already_held_is_left() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Crown", ItemInfo::valued(5000).lore()).await;
    w.inventory.set("Crown", 1).await;
    w.probe.set(0, false, FilterKind::Need).await;
    w.open("a_gnoll", &["Crown"], &[]).await;

    w.ticks(1).await;

    let issued = w.client.issued().await;
    assert_eq!(issued.len(), 1);
    assert_eq!(issued[0].command.kind, CommandKind::Leave);
}

#[tokio::test(start_paused = true)]
async fn unknown_items_are_deferred_once() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.open("a_gnoll", &["Shimmering Shard"], &[]).await;

    w.ticks(3).await;

    assert!(w.client.issued().await.is_empty());
    assert_eq!(
        w.recorder.names().await,
        vec!["SESSION_OPENED", "DECISION_DEFERRED"]
    );
    assert_eq!(w.rules.get_rule("Shimmering Shard").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn clearing_the_session_forgets_processed_items() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Cloth Cap", ItemInfo::valued(12)).await;
    w.rules.save_rule("Cloth Cap", "IGNORE").await.unwrap();
    w.open("a_gnoll", &["Cloth Cap"], &[]).await;

    w.ticks(2).await;
    w.engine.clear_session(ClearReason::ZoneChange).await;

    let status = w.engine.status().await;
    assert_eq!(status.phase, SessionPhase::NoSession);
    assert_eq!(status.retained_records, 0);

    w.ticks(2).await;
    assert_eq!(w.issued_items().await, vec!["Cloth Cap", "Cloth Cap"]);
    assert!(matches!(
        w.recorder.events().await.as_slice(),
        [
            LootEvent::SessionOpened { .. },
            LootEvent::ItemLeft { .. },
            LootEvent::SessionClosed { reason, .. },
            LootEvent::SessionOpened { .. },
            LootEvent::ItemLeft { .. },
        ] if reason == "zone_change"
    ));
}

#[tokio::test(start_paused = true)]
async fn dry_run_marks_items_without_sending() {
    let config = EngineConfig {
        dry_run: true,
        ..EngineConfig::default()
    };
    let w = World::new(config, ConfirmMode::WithId);
    w.item("Rusty Sword", ItemInfo::valued(50)).await;
    w.open("a_gnoll", &["Rusty Sword"], &[]).await;

    w.ticks(3).await;

    assert!(w.client.issued().await.is_empty());
    assert!(w.engine.is_processed("Rusty Sword").await);
    assert_eq!(w.recorder.names().await, vec!["SESSION_OPENED", "ITEM_DESTROYED"]);
}

#[tokio::test(start_paused = true)]
async fn preview_decision_is_reused_by_the_next_tick() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Cloth Cap", ItemInfo::valued(12)).await;
    w.rules.save_rule("Cloth Cap", "IGNORE").await.unwrap();
    w.rules.save_rule("Gem", "PassTo|Bob[1]|Sue[1]|").await.unwrap();
    w.open("a_gnoll", &["Cloth Cap"], &[]).await;
    w.ticks(1).await;

    let gem = LootItem::new(ListedItem::new("Gem", 1), false, ItemInfo::valued(10));
    let preview = w.engine.preview(&gem).await.unwrap();
    assert_eq!(preview.action, LootAction::Pass("Bob".into()));
    assert_eq!(w.rules.get_rule("Gem").await.unwrap().as_deref(), Some("PassTo|Sue[1]|"));

    w.item("Gem", ItemInfo::valued(10)).await;
    w.window.push(false, ListedItem::new("Gem", 1)).await;
    w.ticks(1).await;

    // 同じ判断が使われ、waterfall は二重に消費されない
    assert!(matches!(
        w.recorder.events().await.last(),
        Some(LootEvent::ItemPassed { player, .. }) if player == "Bob"
    ));
    assert_eq!(w.rules.get_rule("Gem").await.unwrap().as_deref(), Some("PassTo|Sue[1]|"));
}

#[tokio::test(start_paused = true)]
async fn engine_loop_runs_until_shutdown() {
    let w = World::new(EngineConfig::default(), ConfirmMode::WithId);
    w.item("Rusty Sword", ItemInfo::valued(50)).await;
    w.item("Jade Ring", ItemInfo::valued(2000)).await;
    w.open("a_gnoll", &["Rusty Sword", "Jade Ring"], &[]).await;

    let engine_loop = EngineLoop::spawn(w.engine.clone(), w.engine.config().tick_interval());
    tokio::time::sleep(Duration::from_secs(6)).await;
    let ticks = engine_loop.shutdown_and_join().await;

    assert!(ticks >= 2);
    assert!(w.window.is_empty().await);
    assert_eq!(w.engine.status().await.phase, SessionPhase::NoSession);
    assert_eq!(w.issued_items().await, vec!["Rusty Sword", "Jade Ring"]);
}
