//! Derived numbers: ability math composed with the modifier resolver.

use serde::{Deserialize, Serialize};

use crate::modifiers::{apply_modifiers, modifiers_for, Modifier};
use crate::progression::ExperienceTracker;
use crate::{Ability, AbilityScores};

pub const TARGET_AC: &str = "AC";
pub const TARGET_INITIATIVE: &str = "initiative";
pub const TARGET_MAX_HP: &str = "max_hp";

const BASE_AC: i32 = 10;

/// D&D ability modifier = floor((score - 10) / 2) for integer scores.
pub fn ability_modifier(score: i32) -> i32 {
    // `div_euclid` with positive divisor matches mathematical floor division.
    score.saturating_sub(10).div_euclid(2)
}

/// `ceil(level / 4) + 1`, level clamped to 1..=20.
pub fn proficiency_bonus(level: i32) -> i32 {
    let level = level.clamp(1, 20);
    (level + 3) / 4 + 1
}

/// Dexterity contribution to AC under an armor category cap (`Some(0)` for heavy armor).
pub fn capped_dex(dex_mod: i32, cap: Option<i32>) -> i32 {
    cap.map_or(dex_mod, |c| dex_mod.min(c))
}

/// Base 10 plus the (already capped) dexterity modifier, then every `"AC"` modifier.
pub fn armor_class(dex_mod: i32, modifiers: &[Modifier]) -> i32 {
    let mut mods = modifiers_for(TARGET_AC, modifiers);
    mods.push(Modifier::add("dex", TARGET_AC, f64::from(dex_mod)));
    apply_modifiers(BASE_AC, &mods)
}

pub fn initiative_bonus(dex_mod: i32, modifiers: &[Modifier]) -> i32 {
    apply_modifiers(dex_mod, &modifiers_for(TARGET_INITIATIVE, modifiers))
}

/// Full hit die at level 1, rounded-up average afterwards, constitution per level
/// (never less than 1 HP per level), then `"max_hp"` modifiers.
pub fn max_hit_points(hit_die: u8, level: u8, con_mod: i32, modifiers: &[Modifier]) -> i32 {
    let die = i32::from(hit_die.max(1));
    let level = i32::from(level.clamp(1, 20));
    let first = die.saturating_add(con_mod).max(1);
    let later = (die / 2 + 1)
        .saturating_add(con_mod)
        .max(1)
        .saturating_mul(level - 1);
    apply_modifiers(
        first.saturating_add(later),
        &modifiers_for(TARGET_MAX_HP, modifiers),
    )
}

pub fn save_target(ability: Ability) -> String {
    format!("save:{}", ability.field())
}

pub fn skill_target(skill: &str) -> String {
    format!("skill:{}", skill.to_lowercase())
}

pub fn saving_throw_bonus(
    scores: &AbilityScores,
    ability: Ability,
    level: u8,
    proficient: bool,
    modifiers: &[Modifier],
) -> i32 {
    let prof = if proficient {
        proficiency_bonus(i32::from(level))
    } else {
        0
    };
    let base = scores.mod_of(ability).saturating_add(prof);
    apply_modifiers(base, &modifiers_for(&save_target(ability), modifiers))
}

pub fn skill_bonus(
    scores: &AbilityScores,
    skill: &str,
    ability: Ability,
    level: u8,
    proficient: bool,
    modifiers: &[Modifier],
) -> i32 {
    let prof = if proficient {
        proficiency_bonus(i32::from(level))
    } else {
        0
    };
    let base = scores.mod_of(ability).saturating_add(prof);
    apply_modifiers(base, &modifiers_for(&skill_target(skill), modifiers))
}

/// Numbers a combatant is seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub armor_class: i32,
    pub initiative_bonus: i32,
    pub max_hit_points: i32,
    pub proficiency_bonus: i32,
}

/// The stored choices of one character; everything else is derived on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSheet {
    pub id: String,
    pub name: String,
    pub abilities: AbilityScores,
    #[serde(default)]
    pub experience: ExperienceTracker,
    pub hit_die: u8,
    /// Dexterity cap of the worn armor; `None` when unarmored or in light armor.
    #[serde(default)]
    pub armor_dex_cap: Option<i32>,
    #[serde(default)]
    pub save_proficiencies: Vec<Ability>,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl CharacterSheet {
    pub fn level(&self) -> u8 {
        self.experience.level()
    }

    pub fn ability_mod(&self, ability: Ability) -> i32 {
        self.abilities.mod_of(ability)
    }

    pub fn save_mod(&self, ability: Ability) -> i32 {
        saving_throw_bonus(
            &self.abilities,
            ability,
            self.level(),
            self.save_proficiencies.contains(&ability),
            &self.modifiers,
        )
    }

    pub fn combat_stats(&self) -> CombatStats {
        let dex = self.ability_mod(Ability::Dex);
        CombatStats {
            armor_class: armor_class(capped_dex(dex, self.armor_dex_cap), &self.modifiers),
            initiative_bonus: initiative_bonus(dex, &self.modifiers),
            max_hit_points: max_hit_points(
                self.hit_die,
                self.level(),
                self.ability_mod(Ability::Con),
                &self.modifiers,
            ),
            proficiency_bonus: proficiency_bonus(i32::from(self.level())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_steps_every_four_levels() {
        let table: Vec<i32> = (1..=20).map(proficiency_bonus).collect();
        assert_eq!(&table[..5], &[2, 2, 2, 2, 3]);
        assert_eq!(table[16], 6);
        assert_eq!(proficiency_bonus(0), 2);
        assert_eq!(proficiency_bonus(99), 6);
    }

    #[test]
    fn hit_points_floor_at_one_per_level() {
        assert_eq!(max_hit_points(6, 3, -5, &[]), 3);
    }

    #[test]
    fn extreme_scores_do_not_overflow() {
        assert_eq!(ability_modifier(i32::MIN), i32::MIN / 2);
        assert_eq!(ability_modifier(i32::MAX), (i32::MAX - 10) / 2);
        assert_eq!(max_hit_points(12, 20, i32::MAX, &[]), i32::MAX);
        assert_eq!(max_hit_points(12, 20, i32::MIN, &[]), 20);
    }

    #[test]
    fn fighter_hit_points() {
        // d10, level 3, +2 CON: 12 + 2 * 8
        assert_eq!(max_hit_points(10, 3, 2, &[]), 28);
    }
}
