use tabletop_engine::combat::{Combatant, CombatantKind, Encounter};
use tabletop_engine::life::*;
use tabletop_engine::{Dice, RulesConfig, TempHpPolicy};

fn downed_hero() -> Encounter {
    let mut hero = Combatant::new("hero", "Hero", CombatantKind::PC, 14, 10);
    hero.hit_points.current = 0;
    Encounter::with_combatants(RulesConfig::default(), vec![hero])
}

#[test]
fn temp_absorbs_before_current() {
    let mut hp = HitPoints { current: 10, max: 20, temp: 5 };
    let change = hp.adjust(-8);
    assert_eq!(hp, HitPoints { current: 7, max: 20, temp: 0 });
    assert_eq!((change.temp_before, change.temp_after), (5, 0));
    assert!(!change.dropped_to_zero());
}

#[test]
fn partial_damage_stays_in_temp() {
    let mut hp = HitPoints { current: 10, max: 20, temp: 5 };
    hp.adjust(-3);
    assert_eq!(hp, HitPoints { current: 10, max: 20, temp: 2 });
}

#[test]
fn overkill_reports_drop() {
    let mut hp = HitPoints::full(7);
    let change = hp.adjust(-30);
    assert_eq!(hp.current, 0);
    assert!(change.dropped_to_zero());
    assert!(hp.is_down());
}

#[test]
fn heal_caps_at_max() {
    let mut hp = HitPoints { current: 3, max: 12, temp: 0 };
    hp.adjust(i32::MAX);
    assert_eq!(hp.current, 12);
}

#[test]
fn temp_policies() {
    let mut hp = HitPoints::full(10);
    hp.set_temp(6, TempHpPolicy::KeepHigher);
    hp.set_temp(2, TempHpPolicy::KeepHigher);
    assert_eq!(hp.temp, 6);
    hp.set_temp(2, TempHpPolicy::Replace);
    assert_eq!(hp.temp, 2);
}

#[test]
fn death_save_counters_cap() {
    let mut saves = DeathSaves::default();
    for _ in 0..5 {
        saves.record(false);
    }
    assert_eq!(saves.failures, DEATH_SAVE_CAP);
    assert!(saves.is_dead());
    assert!(!saves.is_stable());
    saves.reset();
    assert_eq!(saves, DeathSaves::default());
}

#[test]
fn nat20_wakes_to_one_hp() {
    let mut e = downed_hero();
    e.add_death_save("hero", false);
    let mut dice = Dice::from_scripted(vec![20]);
    assert_eq!(e.roll_death_save("hero", &mut dice), Some(DeathSaveRoll::Revived));
    let hero = e.combatant("hero").unwrap();
    assert_eq!(hero.hit_points.current, 1);
    assert_eq!(hero.death_saves, Some(DeathSaves::default()));
}

#[test]
fn nat1_counts_two_failures_and_can_kill() {
    let mut e = downed_hero();
    e.add_death_save("hero", false);
    let mut dice = Dice::from_scripted(vec![1]);
    assert_eq!(
        e.roll_death_save("hero", &mut dice),
        Some(DeathSaveRoll::CriticalFailure)
    );
    let saves = e.combatant("hero").unwrap().death_saves.unwrap();
    assert!(saves.is_dead());

    // Settled: no further rolls.
    assert_eq!(e.roll_death_save("hero", &mut dice), None);
}

#[test]
fn three_successes_stabilize() {
    let mut e = downed_hero();
    let mut dice = Dice::from_scripted(vec![10, 15, 19]);
    for _ in 0..3 {
        assert_eq!(e.roll_death_save("hero", &mut dice), Some(DeathSaveRoll::Success));
    }
    assert!(e.combatant("hero").unwrap().death_saves.unwrap().is_stable());
    assert_eq!(e.roll_death_save("hero", &mut dice), None);
}

#[test]
fn conscious_or_monster_does_not_roll() {
    let mut e = Encounter::with_combatants(
        RulesConfig::default(),
        vec![
            Combatant::new("hero", "Hero", CombatantKind::PC, 14, 10),
            Combatant::new("wolf", "Wolf", CombatantKind::Monster, 13, 11),
        ],
    );
    e.adjust_hp("wolf", -11);
    let mut dice = Dice::from_seed(7);
    assert_eq!(e.roll_death_save("hero", &mut dice), None);
    assert_eq!(e.roll_death_save("wolf", &mut dice), None);
    assert_eq!(e.roll_death_save("ghost", &mut dice), None);
}
