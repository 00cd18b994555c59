use std::collections::HashMap;

use crate::combat::{Combatant, Encounter};
use crate::config::RulesConfig;
use crate::error::EngineError;
use crate::modifiers::Modifier;

pub fn builtin_encounters() -> HashMap<&'static str, &'static str> {
    HashMap::from([(
        "goblin_ambush",
        include_str!("../content/encounters/goblin_ambush.json"),
    )])
}

pub fn builtin_modifier_packs() -> HashMap<&'static str, &'static str> {
    HashMap::from([(
        "plate_and_shield",
        include_str!("../content/modifiers/plate_and_shield.json"),
    )])
}

/// A staged encounter built from a builtin roster.
pub fn load_encounter(id: &str, rules: RulesConfig) -> Result<Encounter, EngineError> {
    let text = builtin_encounters()
        .get(id)
        .copied()
        .ok_or_else(|| EngineError::UnknownContent(id.to_string()))?;
    let roster: Vec<Combatant> = serde_json::from_str(text)?;
    Ok(Encounter::with_combatants(rules, roster))
}

pub fn load_modifier_pack(id: &str) -> Result<Vec<Modifier>, EngineError> {
    let text = builtin_modifier_packs()
        .get(id)
        .copied()
        .ok_or_else(|| EngineError::UnknownContent(id.to_string()))?;
    Ok(serde_json::from_str(text)?)
}
