pub mod combat;
pub mod conditions;
pub mod config;
pub mod content;
pub mod derive;
pub mod error;
pub mod life;
pub mod modifiers;
pub mod progression;
pub mod snapshot;
pub mod validation;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub use combat::{Combatant, CombatantKind, Encounter, EncounterAction, EncounterEvent, Phase};
pub use config::{RulesConfig, TempHpPolicy};
pub use derive::{ability_modifier, proficiency_bonus, CharacterSheet, CombatStats};
pub use error::EngineError;
pub use modifiers::{
    apply_modifiers, combine_modifiers, has_advantage, has_disadvantage, Modifier, ModifierKind,
    Vantage,
};
pub use progression::{level_from_xp, levels_gained, xp_to_next_level, ExperienceTracker};
pub use validation::{validate_character_creation, ValidationError, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    pub fn abbreviation(self) -> &'static str {
        match self {
            Ability::Str => "STR",
            Ability::Dex => "DEX",
            Ability::Con => "CON",
            Ability::Int => "INT",
            Ability::Wis => "WIS",
            Ability::Cha => "CHA",
        }
    }

    /// Field name used in validation errors and serialized sheets.
    pub fn field(self) -> &'static str {
        match self {
            Ability::Str => "str",
            Ability::Dex => "dex",
            Ability::Con => "con",
            Ability::Int => "int",
            Ability::Wis => "wis",
            Ability::Cha => "cha",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    #[serde(rename = "str")]
    pub str_: i32,
    pub dex: i32,
    pub con: i32,
    #[serde(rename = "int")]
    pub int_: i32,
    pub wis: i32,
    pub cha: i32,
}

impl AbilityScores {
    pub fn new(str_: i32, dex: i32, con: i32, int_: i32, wis: i32, cha: i32) -> Self {
        Self { str_, dex, con, int_, wis, cha }
    }

    /// Every ability at the same score.
    pub fn uniform(score: i32) -> Self {
        Self::new(score, score, score, score, score, score)
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.str_,
            Ability::Dex => self.dex,
            Ability::Con => self.con,
            Ability::Int => self.int_,
            Ability::Wis => self.wis,
            Ability::Cha => self.cha,
        }
    }

    pub fn set(&mut self, ability: Ability, score: i32) {
        match ability {
            Ability::Str => self.str_ = score,
            Ability::Dex => self.dex = score,
            Ability::Con => self.con = score,
            Ability::Int => self.int_ = score,
            Ability::Wis => self.wis = score,
            Ability::Cha => self.cha = score,
        }
    }

    pub fn mod_of(&self, ability: Ability) -> i32 {
        ability_modifier(self.get(ability))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ability, i32)> + '_ {
        Ability::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::uniform(10)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdMode {
    Normal,
    Advantage,
    Disadvantage,
}

impl From<Vantage> for AdMode {
    fn from(v: Vantage) -> Self {
        match v {
            Vantage::Normal => AdMode::Normal,
            Vantage::Advantage => AdMode::Advantage,
            Vantage::Disadvantage => AdMode::Disadvantage,
        }
    }
}

enum DiceSource {
    Seeded(ChaCha8Rng),
    Scripted { rolls: Vec<u8>, next: usize },
}

/// d20 roller. Seeded for reproducible initiative, scripted for tests.
pub struct Dice {
    source: DiceSource,
}

impl Dice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: DiceSource::Seeded(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Replays `rolls` in order, cycling when exhausted.
    pub fn from_scripted(rolls: Vec<u8>) -> Self {
        Self {
            source: DiceSource::Scripted { rolls, next: 0 },
        }
    }

    fn roll(&mut self) -> u8 {
        match &mut self.source {
            DiceSource::Seeded(rng) => rng.gen_range(1..=20),
            DiceSource::Scripted { rolls, next } => {
                if rolls.is_empty() {
                    return 10;
                }
                let r = rolls[*next % rolls.len()];
                *next += 1;
                r.clamp(1, 20)
            }
        }
    }

    pub fn d20(&mut self, mode: AdMode) -> u8 {
        match mode {
            AdMode::Normal => self.roll(),
            AdMode::Advantage => {
                let a = self.roll();
                let b = self.roll();
                a.max(b)
            }
            AdMode::Disadvantage => {
                let a = self.roll();
                let b = self.roll();
                a.min(b)
            }
        }
    }
}
