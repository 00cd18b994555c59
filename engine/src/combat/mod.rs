//! Encounter state: turn order, hit points, conditions and death saves.

pub mod actions;
pub mod encounter;

use serde::{Deserialize, Serialize};

use crate::conditions::ConditionSet;
use crate::derive::CharacterSheet;
use crate::life::{DeathSaves, HitPoints, DEATH_SAVE_CAP};

pub use actions::EncounterAction;
pub use encounter::{Encounter, EncounterEvent, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantKind {
    #[serde(rename = "pc")]
    PC,
    #[serde(rename = "npc")]
    NPC,
    #[serde(rename = "monster")]
    Monster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: String,
    pub name: String,
    pub kind: CombatantKind,
    #[serde(default)]
    pub initiative: i32,
    #[serde(default)]
    pub initiative_bonus: i32,
    pub armor_class: i32,
    pub hit_points: HitPoints,
    #[serde(default)]
    pub conditions: ConditionSet,
    /// Only player characters track death saves.
    #[serde(default)]
    pub death_saves: Option<DeathSaves>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub is_active_turn: bool,
    #[serde(default)]
    pub linked_character_id: Option<String>,
}

impl Combatant {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: CombatantKind,
        armor_class: i32,
        max_hp: i32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            initiative: 0,
            initiative_bonus: 0,
            armor_class,
            hit_points: HitPoints::full(max_hp),
            conditions: ConditionSet::default(),
            death_saves: (kind == CombatantKind::PC).then(DeathSaves::default),
            notes: String::new(),
            is_active_turn: false,
            linked_character_id: None,
        }
    }

    /// Copy a character's derived numbers in. The combatant never reads the sheet again.
    pub fn from_sheet(sheet: &CharacterSheet) -> Self {
        let stats = sheet.combat_stats();
        let mut c = Self::new(
            sheet.id.clone(),
            sheet.name.clone(),
            CombatantKind::PC,
            stats.armor_class,
            stats.max_hit_points,
        );
        c.initiative_bonus = stats.initiative_bonus;
        c.linked_character_id = Some(sheet.id.clone());
        c
    }

    pub fn with_initiative(mut self, initiative: i32, bonus: i32) -> Self {
        self.initiative = initiative;
        self.initiative_bonus = bonus;
        self
    }

    /// Restore the record invariants on data handed in from outside.
    pub fn normalized(mut self) -> Self {
        self.hit_points = self.hit_points.normalized();
        self.death_saves = match self.kind {
            CombatantKind::PC => {
                let mut saves = self.death_saves.unwrap_or_default();
                saves.successes = saves.successes.min(DEATH_SAVE_CAP);
                saves.failures = saves.failures.min(DEATH_SAVE_CAP);
                Some(saves)
            }
            _ => None,
        };
        self
    }
}
