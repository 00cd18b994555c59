use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Combatant, CombatantKind};
use crate::conditions::Condition;
use crate::config::RulesConfig;
use crate::life::DeathSaveRoll;
use crate::{AdMode, Dice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No encounter running. Combatants may linger after `end_combat`.
    #[default]
    Idle,
    /// Combatants added, initiative not yet resolved.
    Staged,
    /// Turns advancing.
    Active,
}

/// Something that changed, handed to observers through [`Encounter::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EncounterEvent {
    CombatantAdded { id: String },
    CombatantRemoved { id: String },
    InitiativeSet { id: String, initiative: i32 },
    CombatStarted { round: u32 },
    RoundStarted { round: u32 },
    TurnStarted { round: u32, index: usize, id: String },
    CombatEnded { round: u32 },
    Cleared,
    HpChanged { id: String, before: i32, after: i32, temp_before: i32, temp_after: i32 },
    DroppedToZero { id: String },
    TempHpSet { id: String, temp: i32 },
    ConditionAdded { id: String, condition: Condition },
    ConditionRemoved { id: String, condition: Condition },
    DeathSaveRecorded { id: String, successes: u8, failures: u8 },
    DeathSavesReset { id: String },
}

/// Mutable state of one encounter. Owned by a single caller; every method is a total
/// transition: unknown ids and out-of-phase requests leave the state unchanged.
///
/// Deserialized state is normalized: duplicate ids dropped, hit points and death saves
/// clamped, round and active index brought into range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EncounterRecord")]
pub struct Encounter {
    combatants: Vec<Combatant>,
    round: u32,
    active_index: usize,
    phase: Phase,
    #[serde(default)]
    rules: RulesConfig,
    #[serde(skip)]
    events: Vec<EncounterEvent>,
}

/// Wire shape of [`Encounter`] before normalization.
#[derive(Deserialize)]
struct EncounterRecord {
    #[serde(default)]
    combatants: Vec<Combatant>,
    #[serde(default = "first_round")]
    round: u32,
    #[serde(default)]
    active_index: usize,
    #[serde(default)]
    phase: Phase,
    #[serde(default)]
    rules: RulesConfig,
}

fn first_round() -> u32 {
    1
}

impl From<EncounterRecord> for Encounter {
    fn from(record: EncounterRecord) -> Self {
        let mut e = Self::new(record.rules);
        for c in record.combatants {
            if e.index_of(&c.id).is_none() {
                e.combatants.push(c.normalized());
            }
        }
        e.round = record.round.max(1);
        if e.combatants.is_empty() {
            return e;
        }
        e.active_index = record.active_index.min(e.combatants.len() - 1);
        e.phase = record.phase;
        e.sync_active_flags();
        e
    }
}

impl Default for Encounter {
    fn default() -> Self {
        Self::new(RulesConfig::default())
    }
}

/// Initiative descending, then initiative bonus descending.
fn turn_order(a: &Combatant, b: &Combatant) -> Ordering {
    b.initiative
        .cmp(&a.initiative)
        .then(b.initiative_bonus.cmp(&a.initiative_bonus))
}

impl Encounter {
    pub fn new(rules: RulesConfig) -> Self {
        Self {
            combatants: Vec::new(),
            round: 1,
            active_index: 0,
            phase: Phase::Idle,
            rules,
            events: Vec::new(),
        }
    }

    pub fn with_combatants(rules: RulesConfig, combatants: Vec<Combatant>) -> Self {
        let mut e = Self::new(rules);
        for c in combatants {
            e.add_combatant(c);
        }
        e.events.clear();
        e
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatant(&self, id: &str) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn in_combat(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn active_combatant(&self) -> Option<&Combatant> {
        if self.in_combat() {
            self.combatants.get(self.active_index)
        } else {
            None
        }
    }

    /// Take every event recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<EncounterEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: EncounterEvent) {
        debug!(?event, round = self.round, "encounter event");
        self.events.push(event);
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.combatants.iter().position(|c| c.id == id)
    }

    fn sync_active_flags(&mut self) {
        let active = self.in_combat().then_some(self.active_index);
        for (i, c) in self.combatants.iter_mut().enumerate() {
            c.is_active_turn = Some(i) == active;
        }
    }

    fn emit_turn_started(&mut self) {
        if let Some(c) = self.combatants.get(self.active_index) {
            let event = EncounterEvent::TurnStarted {
                round: self.round,
                index: self.active_index,
                id: c.id.clone(),
            };
            self.emit(event);
        }
    }

    /// Add a combatant. Ids are unique: a duplicate is ignored and `false` returned.
    /// During combat the newcomer is slotted into turn order without moving the active turn.
    pub fn add_combatant(&mut self, combatant: Combatant) -> bool {
        if self.index_of(&combatant.id).is_some() {
            debug!(id = %combatant.id, "duplicate combatant id ignored");
            return false;
        }
        let mut combatant = combatant.normalized();
        combatant.is_active_turn = false;
        let id = combatant.id.clone();

        match self.phase {
            Phase::Active => {
                let pos = self
                    .combatants
                    .iter()
                    .position(|c| turn_order(&combatant, c) == Ordering::Less)
                    .unwrap_or(self.combatants.len());
                self.combatants.insert(pos, combatant);
                if pos <= self.active_index {
                    self.active_index += 1;
                }
            }
            Phase::Idle | Phase::Staged => {
                self.combatants.push(combatant);
                self.phase = Phase::Staged;
            }
        }
        self.emit(EncounterEvent::CombatantAdded { id });
        true
    }

    pub fn remove_combatant(&mut self, id: &str) {
        let Some(idx) = self.index_of(id) else {
            return;
        };
        let removed = self.combatants.remove(idx);
        self.emit(EncounterEvent::CombatantRemoved { id: removed.id });

        if self.combatants.is_empty() {
            self.active_index = 0;
            if self.phase == Phase::Active {
                let round = self.round;
                self.phase = Phase::Idle;
                self.emit(EncounterEvent::CombatEnded { round });
            } else {
                self.phase = Phase::Idle;
            }
            return;
        }

        if idx < self.active_index {
            self.active_index -= 1;
        } else if idx == self.active_index && self.phase == Phase::Active {
            // The next combatant in order inherits the turn.
            if self.active_index >= self.combatants.len() {
                self.active_index = 0;
            }
            self.sync_active_flags();
            self.emit_turn_started();
            return;
        }
        self.active_index = self.active_index.min(self.combatants.len() - 1);
        self.sync_active_flags();
    }

    /// Record an initiative roll. Turn order is only re-sorted by `start_combat`.
    pub fn set_initiative(&mut self, id: &str, initiative: i32) {
        let Some(c) = self.combatants.iter_mut().find(|c| c.id == id) else {
            return;
        };
        c.initiative = initiative;
        let id = c.id.clone();
        self.emit(EncounterEvent::InitiativeSet { id, initiative });
    }

    /// Roll d20 + initiative bonus for every combatant of one of `kinds`
    /// (typically NPCs and monsters while players report their own).
    pub fn roll_initiative(&mut self, dice: &mut Dice, kinds: &[CombatantKind]) {
        let rolls: Vec<(String, i32)> = self
            .combatants
            .iter()
            .filter(|c| kinds.contains(&c.kind))
            .map(|c| (c.id.clone(), dice.d20(AdMode::Normal) as i32 + c.initiative_bonus))
            .collect();
        for (id, initiative) in rolls {
            self.set_initiative(&id, initiative);
        }
    }

    pub fn start_combat(&mut self) {
        if self.combatants.is_empty() || self.phase == Phase::Active {
            return;
        }
        self.combatants.sort_by(turn_order);
        self.round = 1;
        self.active_index = 0;
        self.phase = Phase::Active;
        self.sync_active_flags();
        info!(combatants = self.combatants.len(), "combat started");
        self.emit(EncounterEvent::CombatStarted { round: 1 });
        self.emit_turn_started();
    }

    pub fn next_turn(&mut self) {
        if !self.in_combat() || self.combatants.is_empty() {
            return;
        }
        self.active_index = (self.active_index + 1) % self.combatants.len();
        if self.active_index == 0 {
            self.round += 1;
            let round = self.round;
            self.emit(EncounterEvent::RoundStarted { round });
        }
        self.sync_active_flags();
        self.emit_turn_started();
    }

    pub fn previous_turn(&mut self) {
        if !self.in_combat() || self.combatants.is_empty() {
            return;
        }
        if self.active_index == 0 {
            self.active_index = self.combatants.len() - 1;
            self.round = self.round.saturating_sub(1).max(1);
        } else {
            self.active_index -= 1;
        }
        self.sync_active_flags();
        self.emit_turn_started();
    }

    /// Stop turn tracking but keep the roster (a paused encounter).
    pub fn end_combat(&mut self) {
        if !self.in_combat() {
            return;
        }
        self.phase = Phase::Idle;
        self.sync_active_flags();
        let round = self.round;
        info!(round, "combat ended");
        self.emit(EncounterEvent::CombatEnded { round });
    }

    /// Discard the encounter entirely.
    pub fn clear_combat(&mut self) {
        self.combatants.clear();
        self.round = 1;
        self.active_index = 0;
        self.phase = Phase::Idle;
        self.emit(EncounterEvent::Cleared);
    }

    /// Damage (negative) or heal (positive). Damage drains temporary HP first.
    pub fn adjust_hp(&mut self, id: &str, delta: i32) {
        let Some(c) = self.combatants.iter_mut().find(|c| c.id == id) else {
            return;
        };
        let change = c.hit_points.adjust(delta);
        let id = c.id.clone();
        self.emit(EncounterEvent::HpChanged {
            id: id.clone(),
            before: change.before,
            after: change.after,
            temp_before: change.temp_before,
            temp_after: change.temp_after,
        });
        if change.dropped_to_zero() {
            self.emit(EncounterEvent::DroppedToZero { id });
        }
    }

    /// Set temporary HP. By default the new value replaces the old pool; see
    /// [`crate::config::TempHpPolicy`].
    pub fn set_temp_hp(&mut self, id: &str, value: i32) {
        let policy = self.rules.temp_hp_policy;
        let Some(c) = self.combatants.iter_mut().find(|c| c.id == id) else {
            return;
        };
        c.hit_points.set_temp(value, policy);
        let (id, temp) = (c.id.clone(), c.hit_points.temp);
        self.emit(EncounterEvent::TempHpSet { id, temp });
    }

    pub fn add_condition(&mut self, id: &str, condition: impl Into<Condition>) {
        let condition = Condition::canonical(condition.into());
        let Some(c) = self.combatants.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if c.conditions.insert(condition.clone()) {
            let id = c.id.clone();
            self.emit(EncounterEvent::ConditionAdded { id, condition });
        }
    }

    pub fn remove_condition(&mut self, id: &str, condition: impl Into<Condition>) {
        let condition = Condition::canonical(condition.into());
        let Some(c) = self.combatants.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if c.conditions.remove(&condition) {
            let id = c.id.clone();
            self.emit(EncounterEvent::ConditionRemoved { id, condition });
        }
    }

    pub fn set_notes(&mut self, id: &str, notes: impl Into<String>) {
        if let Some(c) = self.combatants.iter_mut().find(|c| c.id == id) {
            c.notes = notes.into();
        }
    }

    /// Count a death save for a player character. Counters stop at 3. Healing does not
    /// reset them; the caller does that with [`Encounter::reset_death_saves`].
    pub fn add_death_save(&mut self, id: &str, success: bool) {
        let Some(c) = self.combatants.iter_mut().find(|c| c.id == id) else {
            return;
        };
        let Some(saves) = c.death_saves.as_mut() else {
            return;
        };
        let before = *saves;
        saves.record(success);
        if *saves == before {
            return;
        }
        let (successes, failures) = (saves.successes, saves.failures);
        let id = c.id.clone();
        self.emit(EncounterEvent::DeathSaveRecorded { id, successes, failures });
    }

    pub fn reset_death_saves(&mut self, id: &str) {
        let Some(c) = self.combatants.iter_mut().find(|c| c.id == id) else {
            return;
        };
        let Some(saves) = c.death_saves.as_mut() else {
            return;
        };
        saves.reset();
        let id = c.id.clone();
        self.emit(EncounterEvent::DeathSavesReset { id });
    }

    /// Roll a death save for a downed player character whose fate is not yet settled.
    /// A natural 20 brings them back to 1 HP with fresh counters; a natural 1 counts twice.
    pub fn roll_death_save(&mut self, id: &str, dice: &mut Dice) -> Option<DeathSaveRoll> {
        let c = self.combatant(id)?;
        let saves = c.death_saves?;
        if !c.hit_points.is_down() || saves.is_settled() {
            return None;
        }

        let roll = dice.d20(AdMode::Normal);
        let outcome = DeathSaveRoll::from_d20(roll);
        debug!(id, roll, ?outcome, "death save rolled");
        match outcome {
            DeathSaveRoll::Revived => {
                self.reset_death_saves(id);
                self.adjust_hp(id, 1);
            }
            DeathSaveRoll::Success => self.add_death_save(id, true),
            DeathSaveRoll::Failure => self.add_death_save(id, false),
            DeathSaveRoll::CriticalFailure => {
                self.add_death_save(id, false);
                self.add_death_save(id, false);
            }
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin(id: &str, init: i32) -> Combatant {
        Combatant::new(id, id, CombatantKind::Monster, 15, 7).with_initiative(init, 2)
    }

    #[test]
    fn adding_first_combatant_stages() {
        let mut e = Encounter::default();
        assert_eq!(e.phase(), Phase::Idle);
        e.add_combatant(goblin("g1", 10));
        assert_eq!(e.phase(), Phase::Staged);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut e = Encounter::default();
        assert!(e.add_combatant(goblin("g1", 10)));
        assert!(!e.add_combatant(goblin("g1", 12)));
        assert_eq!(e.combatants().len(), 1);
    }

    #[test]
    fn late_joiner_keeps_active_turn() {
        let mut e = Encounter::with_combatants(
            RulesConfig::default(),
            vec![goblin("a", 18), goblin("b", 10)],
        );
        e.start_combat();
        e.next_turn();
        assert_eq!(e.active_combatant().unwrap().id, "b");
        e.add_combatant(goblin("c", 15));
        assert_eq!(e.active_combatant().unwrap().id, "b");
        let order: Vec<&str> = e.combatants().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, ["a", "c", "b"]);
    }

    #[test]
    fn deserialized_state_is_normalized() {
        let json = r#"{
            "combatants": [
                {"id": "g", "name": "Goblin", "kind": "monster", "armor_class": 15,
                 "hit_points": {"current": 0, "max": -1}, "is_active_turn": true},
                {"id": "g", "name": "Copy", "kind": "monster", "armor_class": 15,
                 "hit_points": {"current": 3, "max": 3}}
            ],
            "round": 0,
            "active_index": 9,
            "phase": "active"
        }"#;
        let mut e: Encounter = serde_json::from_str(json).unwrap();
        assert_eq!(e.combatants().len(), 1);
        assert_eq!(e.round(), 1);
        assert_eq!(e.active_index(), 0);
        assert_eq!(e.combatant("g").unwrap().hit_points.max, 0);
        e.adjust_hp("g", -1);
        assert_eq!(e.combatant("g").unwrap().hit_points.current, 0);
    }

    #[test]
    fn removing_active_passes_turn_on() {
        let mut e = Encounter::with_combatants(
            RulesConfig::default(),
            vec![goblin("a", 18), goblin("b", 10), goblin("c", 5)],
        );
        e.start_combat();
        e.next_turn();
        e.remove_combatant("b");
        assert_eq!(e.active_combatant().unwrap().id, "c");
        e.remove_combatant("c");
        assert_eq!(e.active_combatant().unwrap().id, "a");
        e.remove_combatant("a");
        assert_eq!(e.phase(), Phase::Idle);
    }
}
