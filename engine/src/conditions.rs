use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::modifiers::{vantage, Modifier, Vantage};

/// Attack rolls the creature makes.
pub const TARGET_ATTACK: &str = "attack";
pub const TARGET_ABILITY_CHECK: &str = "ability_check";
/// Melee / ranged attack rolls made against the creature.
pub const TARGET_ATTACKED_MELEE: &str = "attacked:melee";
pub const TARGET_ATTACKED_RANGED: &str = "attacked:ranged";

/// A condition, keyed by its lowercase name. Names outside the standard list are kept
/// as `Other` so table-specific conditions still round-trip.
///
/// Build conditions with [`Condition::named`] (or `From<&str>`/`From<String>`) rather than
/// `Other(..)` directly; [`ConditionSet`] re-keys anything it stores the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Condition {
    Blinded,
    Charmed,
    Deafened,
    Frightened,
    Grappled,
    Incapacitated,
    Invisible,
    Paralyzed,
    Petrified,
    Poisoned,
    Prone,
    Restrained,
    Stunned,
    Unconscious,
    Other(String),
}

impl Condition {
    /// Trimmed, lowercased and matched against the standard names.
    pub fn named(name: &str) -> Self {
        Condition::from(name)
    }

    /// Re-key a condition built by hand, e.g. `Other("Poisoned")` becomes `Poisoned`.
    pub fn canonical(self) -> Self {
        match self {
            Condition::Other(name) => Condition::from(name),
            standard => standard,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Condition::Blinded => "blinded",
            Condition::Charmed => "charmed",
            Condition::Deafened => "deafened",
            Condition::Frightened => "frightened",
            Condition::Grappled => "grappled",
            Condition::Incapacitated => "incapacitated",
            Condition::Invisible => "invisible",
            Condition::Paralyzed => "paralyzed",
            Condition::Petrified => "petrified",
            Condition::Poisoned => "poisoned",
            Condition::Prone => "prone",
            Condition::Restrained => "restrained",
            Condition::Stunned => "stunned",
            Condition::Unconscious => "unconscious",
            Condition::Other(name) => name.as_str(),
        }
    }

    /// Advantage/disadvantage the condition imposes, expressed as resolver modifiers.
    pub fn modifiers(&self) -> Vec<Modifier> {
        use Condition::*;
        let source = format!("condition:{}", self.name());
        let adv = |target: &str| Modifier::advantage(source.clone(), target);
        let dis = |target: &str| Modifier::disadvantage(source.clone(), target);
        let attacked_adv = || {
            vec![
                adv(TARGET_ATTACKED_MELEE),
                adv(TARGET_ATTACKED_RANGED),
            ]
        };

        match self {
            Blinded => {
                let mut m = attacked_adv();
                m.push(dis(TARGET_ATTACK));
                m
            }
            Frightened | Poisoned => vec![dis(TARGET_ATTACK), dis(TARGET_ABILITY_CHECK)],
            Invisible => vec![
                adv(TARGET_ATTACK),
                dis(TARGET_ATTACKED_MELEE),
                dis(TARGET_ATTACKED_RANGED),
            ],
            Paralyzed | Petrified | Stunned | Unconscious => attacked_adv(),
            Prone => vec![
                dis(TARGET_ATTACK),
                adv(TARGET_ATTACKED_MELEE),
                dis(TARGET_ATTACKED_RANGED),
            ],
            Restrained => {
                let mut m = attacked_adv();
                m.push(dis(TARGET_ATTACK));
                m
            }
            Charmed | Deafened | Grappled | Incapacitated | Other(_) => Vec::new(),
        }
    }
}

impl From<String> for Condition {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "blinded" => Condition::Blinded,
            "charmed" => Condition::Charmed,
            "deafened" => Condition::Deafened,
            "frightened" => Condition::Frightened,
            "grappled" => Condition::Grappled,
            "incapacitated" => Condition::Incapacitated,
            "invisible" => Condition::Invisible,
            "paralyzed" => Condition::Paralyzed,
            "petrified" => Condition::Petrified,
            "poisoned" => Condition::Poisoned,
            "prone" => Condition::Prone,
            "restrained" => Condition::Restrained,
            "stunned" => Condition::Stunned,
            "unconscious" => Condition::Unconscious,
            other => Condition::Other(other.to_string()),
        }
    }
}

impl From<&str> for Condition {
    fn from(raw: &str) -> Self {
        Condition::from(raw.to_string())
    }
}

impl From<Condition> for String {
    fn from(c: Condition) -> Self {
        c.name().to_string()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Conditions on one combatant, in the order they were applied.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet(IndexSet<Condition>);

impl ConditionSet {
    /// Returns false when the condition was already present.
    pub fn insert(&mut self, condition: Condition) -> bool {
        self.0.insert(condition.canonical())
    }

    /// Returns false when the condition was not present.
    pub fn remove(&mut self, condition: &Condition) -> bool {
        self.0.shift_remove(&condition.clone().canonical())
    }

    pub fn contains(&self, condition: &Condition) -> bool {
        self.0.contains(&condition.clone().canonical())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn modifiers(&self) -> Vec<Modifier> {
        self.0.iter().flat_map(Condition::modifiers).collect()
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self(iter.into_iter().map(Condition::canonical).collect())
    }
}

/// Whether the attack is melee or ranged (used for prone interactions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackStyle {
    Melee,
    Ranged,
}

/// Net vantage for an attack, from the attacker's and target's conditions.
pub fn vantage_from_conditions(
    attacker: &ConditionSet,
    target: &ConditionSet,
    style: AttackStyle,
) -> Vantage {
    let against = match style {
        AttackStyle::Melee => TARGET_ATTACKED_MELEE,
        AttackStyle::Ranged => TARGET_ATTACKED_RANGED,
    };
    let mods: Vec<Modifier> = attacker
        .modifiers()
        .into_iter()
        .filter(|m| m.target == TARGET_ATTACK)
        .chain(target.modifiers().into_iter().filter(|m| m.target == against))
        .collect();
    vantage(&mods)
}
