use tabletop_engine::combat::{
    Combatant, CombatantKind, Encounter, EncounterAction, EncounterEvent, Phase,
};
use tabletop_engine::conditions::Condition;
use tabletop_engine::{Dice, RulesConfig, TempHpPolicy};

fn pc(id: &str, init: i32, bonus: i32) -> Combatant {
    Combatant::new(id, id, CombatantKind::PC, 15, 20).with_initiative(init, bonus)
}

fn monster(id: &str, init: i32, bonus: i32) -> Combatant {
    Combatant::new(id, id, CombatantKind::Monster, 13, 11).with_initiative(init, bonus)
}

fn three_way() -> Encounter {
    Encounter::with_combatants(
        RulesConfig::default(),
        vec![monster("orc", 12, 1), pc("aria", 17, 3), pc("brom", 8, 0)],
    )
}

fn active_id(e: &Encounter) -> &str {
    e.active_combatant().map(|c| c.id.as_str()).unwrap_or("")
}

#[test]
fn start_sorts_by_initiative_then_bonus() {
    let mut e = Encounter::with_combatants(
        RulesConfig::default(),
        vec![monster("a", 15, 1), pc("b", 15, 4), pc("c", 20, 0)],
    );
    assert_eq!(e.phase(), Phase::Staged);
    e.start_combat();
    let order: Vec<&str> = e.combatants().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, ["c", "b", "a"]);
    assert_eq!(e.round(), 1);
    assert_eq!(e.active_index(), 0);
    assert!(e.combatants()[0].is_active_turn);
    assert!(e.combatants()[1..].iter().all(|c| !c.is_active_turn));
}

#[test]
fn start_on_empty_encounter_is_noop() {
    let mut e = Encounter::default();
    e.start_combat();
    assert_eq!(e.phase(), Phase::Idle);
    assert!(e.drain_events().is_empty());
}

#[test]
fn round_increments_on_wrap() {
    let mut e = three_way();
    e.start_combat();
    e.next_turn();
    e.next_turn();
    assert_eq!((e.active_index(), e.round()), (2, 1));
    e.next_turn();
    assert_eq!((e.active_index(), e.round()), (0, 2));
    e.next_turn();
    assert_eq!((e.active_index(), e.round()), (1, 2));
}

#[test]
fn previous_turn_wraps_back_and_floors_round() {
    let mut e = three_way();
    e.start_combat();
    e.previous_turn();
    assert_eq!((e.active_index(), e.round()), (2, 1));

    e.next_turn(); // index 0, round 2
    assert_eq!(e.round(), 2);
    e.previous_turn();
    assert_eq!((e.active_index(), e.round()), (2, 1));
    assert_eq!(active_id(&e), "brom");
}

#[test]
fn turns_do_nothing_outside_combat() {
    let mut e = three_way();
    e.next_turn();
    e.previous_turn();
    assert_eq!((e.active_index(), e.round()), (0, 1));
    assert!(e.combatants().iter().all(|c| !c.is_active_turn));

    let mut empty = Encounter::default();
    empty.next_turn();
    empty.previous_turn();
    assert_eq!(empty.round(), 1);
}

#[test]
fn end_keeps_roster_clear_discards_it() {
    let mut e = three_way();
    e.start_combat();
    e.next_turn();
    e.end_combat();
    assert_eq!(e.phase(), Phase::Idle);
    assert!(!e.in_combat());
    assert_eq!(e.combatants().len(), 3);
    assert!(e.combatants().iter().all(|c| !c.is_active_turn));
    assert!(e.active_combatant().is_none());

    // A paused encounter can be restarted.
    e.start_combat();
    assert_eq!(active_id(&e), "aria");

    e.clear_combat();
    assert_eq!(e.phase(), Phase::Idle);
    assert!(e.combatants().is_empty());
    assert_eq!(e.round(), 1);
}

#[test]
fn damage_drains_temp_first() {
    let mut e = Encounter::default();
    let mut c = pc("aria", 10, 0);
    c.hit_points.current = 10;
    c.hit_points.temp = 5;
    e.add_combatant(c.clone());
    e.adjust_hp("aria", -8);
    let hp = e.combatant("aria").unwrap().hit_points;
    assert_eq!((hp.current, hp.temp), (7, 0));

    let mut e = Encounter::default();
    e.add_combatant(c);
    e.adjust_hp("aria", -3);
    let hp = e.combatant("aria").unwrap().hit_points;
    assert_eq!((hp.current, hp.temp), (10, 2));
}

#[test]
fn hp_clamps_both_ways() {
    let mut e = three_way();
    e.adjust_hp("aria", -5);
    e.adjust_hp("aria", 100);
    assert_eq!(e.combatant("aria").unwrap().hit_points.current, 20);
    e.adjust_hp("aria", -100);
    assert_eq!(e.combatant("aria").unwrap().hit_points.current, 0);
    e.adjust_hp("aria", i32::MIN);
    assert_eq!(e.combatant("aria").unwrap().hit_points.current, 0);
}

#[test]
fn healing_never_restores_temp() {
    let mut e = three_way();
    e.set_temp_hp("aria", 4);
    e.adjust_hp("aria", -6);
    e.adjust_hp("aria", 10);
    let hp = e.combatant("aria").unwrap().hit_points;
    assert_eq!((hp.current, hp.temp), (20, 0));
}

#[test]
fn temp_hp_replaces_by_default() {
    let mut e = three_way();
    e.set_temp_hp("aria", 8);
    e.set_temp_hp("aria", 3);
    assert_eq!(e.combatant("aria").unwrap().hit_points.temp, 3);
    e.set_temp_hp("aria", -4);
    assert_eq!(e.combatant("aria").unwrap().hit_points.temp, 0);
}

#[test]
fn temp_hp_keep_higher_policy() {
    let rules = RulesConfig {
        temp_hp_policy: TempHpPolicy::KeepHigher,
        ..RulesConfig::default()
    };
    let mut e = Encounter::with_combatants(rules, vec![pc("aria", 10, 0)]);
    e.set_temp_hp("aria", 8);
    e.set_temp_hp("aria", 3);
    assert_eq!(e.combatant("aria").unwrap().hit_points.temp, 8);
}

#[test]
fn conditions_are_an_idempotent_set() {
    let mut e = three_way();
    e.add_condition("orc", Condition::Poisoned);
    e.add_condition("orc", "Poisoned");
    e.add_condition("orc", "hexed");
    let orc = e.combatant("orc").unwrap();
    assert_eq!(orc.conditions.len(), 2);
    assert!(orc.conditions.contains(&Condition::Other("hexed".into())));

    e.drain_events();
    e.remove_condition("orc", "POISONED");
    e.remove_condition("orc", "poisoned");
    assert_eq!(e.combatant("orc").unwrap().conditions.len(), 1);
    assert_eq!(e.drain_events().len(), 1);
}

#[test]
fn death_saves_cap_at_three() {
    let mut e = three_way();
    for _ in 0..4 {
        e.add_death_save("aria", true);
    }
    let saves = e.combatant("aria").unwrap().death_saves.unwrap();
    assert_eq!(saves.successes, 3);
    assert_eq!(saves.failures, 0);
}

#[test]
fn death_saves_survive_healing_until_reset() {
    let mut e = three_way();
    e.adjust_hp("aria", -20);
    e.add_death_save("aria", false);
    e.add_death_save("aria", true);
    e.adjust_hp("aria", 5);

    let aria = e.combatant("aria").unwrap();
    assert_eq!(aria.hit_points.current, 5);
    let saves = aria.death_saves.unwrap();
    assert_eq!((saves.successes, saves.failures), (1, 1));

    e.reset_death_saves("aria");
    let saves = e.combatant("aria").unwrap().death_saves.unwrap();
    assert_eq!((saves.successes, saves.failures), (0, 0));
}

#[test]
fn monsters_do_not_track_death_saves() {
    let mut e = three_way();
    e.add_death_save("orc", false);
    assert!(e.combatant("orc").unwrap().death_saves.is_none());
}

#[test]
fn unknown_ids_leave_state_untouched() {
    let mut e = three_way();
    e.start_combat();
    e.drain_events();
    let before = e.clone();
    e.adjust_hp("ghost", -5);
    e.set_temp_hp("ghost", 5);
    e.add_condition("ghost", "prone");
    e.remove_condition("ghost", "prone");
    e.add_death_save("ghost", true);
    e.reset_death_saves("ghost");
    e.remove_combatant("ghost");
    e.set_initiative("ghost", 20);
    assert_eq!(e, before);
    assert!(e.drain_events().is_empty());
}

#[test]
fn roll_initiative_for_monsters_only() {
    let mut e = three_way();
    let mut dice = Dice::from_scripted(vec![19]);
    e.roll_initiative(&mut dice, &[CombatantKind::Monster]);
    assert_eq!(e.combatant("orc").unwrap().initiative, 20);
    assert_eq!(e.combatant("aria").unwrap().initiative, 17);
    e.start_combat();
    assert_eq!(active_id(&e), "orc");
}

#[test]
fn events_describe_the_turn_flow() {
    let mut e = Encounter::with_combatants(
        RulesConfig::default(),
        vec![pc("aria", 15, 0), monster("orc", 10, 0)],
    );
    e.start_combat();
    e.next_turn();
    e.next_turn();
    let events = e.drain_events();
    assert_eq!(
        events,
        vec![
            EncounterEvent::CombatStarted { round: 1 },
            EncounterEvent::TurnStarted { round: 1, index: 0, id: "aria".into() },
            EncounterEvent::TurnStarted { round: 1, index: 1, id: "orc".into() },
            EncounterEvent::RoundStarted { round: 2 },
            EncounterEvent::TurnStarted { round: 2, index: 0, id: "aria".into() },
        ]
    );
    assert!(e.drain_events().is_empty());
}

#[test]
fn dropping_to_zero_is_reported_once() {
    let mut e = three_way();
    e.drain_events();
    e.adjust_hp("orc", -20);
    e.adjust_hp("orc", -5);
    let drops = e
        .drain_events()
        .into_iter()
        .filter(|ev| matches!(ev, EncounterEvent::DroppedToZero { .. }))
        .count();
    assert_eq!(drops, 1);
}

#[test]
fn replaying_actions_rebuilds_state() {
    let script: Vec<EncounterAction> = serde_json::from_str(
        r#"[
            {"action": "start_combat"},
            {"action": "adjust_hp", "id": "orc", "delta": -4},
            {"action": "add_condition", "id": "orc", "condition": "prone"},
            {"action": "next_turn"},
            {"action": "set_temp_hp", "id": "brom", "value": 6},
            {"action": "next_turn"},
            {"action": "next_turn"},
            {"action": "set_notes", "id": "orc", "notes": "fleeing"}
        ]"#,
    )
    .unwrap();

    let mut a = three_way();
    a.apply_all(script.clone());
    let mut b = three_way();
    b.apply_all(script);
    assert_eq!(a, b);

    assert_eq!(a.round(), 2);
    assert_eq!(active_id(&a), "aria");
    let orc = a.combatant("orc").unwrap();
    assert_eq!(orc.hit_points.current, 7);
    assert!(orc.conditions.contains(&Condition::Prone));
    assert_eq!(orc.notes, "fleeing");
    assert_eq!(a.combatant("brom").unwrap().hit_points.temp, 6);
}

#[test]
fn removing_before_active_keeps_turn_holder() {
    let mut e = three_way();
    e.start_combat();
    e.next_turn();
    e.next_turn();
    assert_eq!(active_id(&e), "brom");
    e.remove_combatant("aria");
    assert_eq!(active_id(&e), "brom");
    assert_eq!(e.active_index(), 1);
}

#[test]
fn externally_supplied_records_are_normalized() {
    let mut e = Encounter::default();
    let mut c = monster("orc", 10, 0);
    c.hit_points.current = 50;
    c.hit_points.temp = -3;
    c.death_saves = Some(Default::default());
    e.add_combatant(c);
    let orc = e.combatant("orc").unwrap();
    assert_eq!((orc.hit_points.current, orc.hit_points.temp), (11, 0));
    assert!(orc.death_saves.is_none());
}

#[test]
fn hand_built_condition_names_are_rekeyed() {
    let mut e = three_way();
    e.drain_events();
    e.add_condition("orc", Condition::Other("Poisoned".into()));
    e.add_condition("orc", Condition::Poisoned);
    assert_eq!(
        e.drain_events(),
        vec![EncounterEvent::ConditionAdded { id: "orc".into(), condition: Condition::Poisoned }]
    );
    e.remove_condition("orc", Condition::Other("POISONED".into()));
    assert!(e.combatant("orc").unwrap().conditions.is_empty());
}
