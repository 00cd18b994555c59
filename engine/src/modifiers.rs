//! Modifier resolution: stacking precedence and same-source non-stacking.

use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKind {
    Set,
    Add,
    Multiply,
    Min,
    Max,
    Advantage,
    Disadvantage,
}

impl ModifierKind {
    /// Fold order. Advantage and Disadvantage share the last slot and never touch the number.
    pub fn precedence(self) -> u8 {
        match self {
            ModifierKind::Set => 0,
            ModifierKind::Add => 1,
            ModifierKind::Multiply => 2,
            ModifierKind::Min => 3,
            ModifierKind::Max => 4,
            ModifierKind::Advantage | ModifierKind::Disadvantage => 5,
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, ModifierKind::Advantage | ModifierKind::Disadvantage)
    }
}

/// One named effect acting on one named target attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: ModifierKind,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Modifier {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        kind: ModifierKind,
        value: f64,
    ) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{source}:{target}:{kind:?}").to_lowercase(),
            source,
            target,
            kind,
            value,
            priority: 0,
            active: true,
        }
    }

    pub fn set(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self::new(source, target, ModifierKind::Set, value)
    }

    pub fn add(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self::new(source, target, ModifierKind::Add, value)
    }

    pub fn multiply(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self::new(source, target, ModifierKind::Multiply, value)
    }

    pub fn min(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self::new(source, target, ModifierKind::Min, value)
    }

    pub fn max(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self::new(source, target, ModifierKind::Max, value)
    }

    pub fn advantage(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, ModifierKind::Advantage, 0.0)
    }

    pub fn disadvantage(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(source, target, ModifierKind::Disadvantage, 0.0)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Net vantage result for a d20 roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vantage {
    Normal,
    Advantage,
    Disadvantage,
}

impl Vantage {
    pub fn combine(self, other: Vantage) -> Vantage {
        use Vantage::*;
        match (self, other) {
            (Disadvantage, Advantage) | (Advantage, Disadvantage) => Normal,
            (Normal, x) => x,
            (x, Normal) => x,
            (Advantage, Advantage) => Advantage,
            (Disadvantage, Disadvantage) => Disadvantage,
        }
    }
}

/// Collapse same-source `Add` modifiers: for each `(source, target)` pair only the
/// greatest `Add` survives. Inactive modifiers and every other kind pass through.
fn collapse_same_source(modifiers: impl IntoIterator<Item = Modifier>) -> Vec<Modifier> {
    let mut best_add: IndexMap<(String, String), Modifier> = IndexMap::new();
    let mut rest = Vec::new();

    for m in modifiers {
        if m.kind != ModifierKind::Add || !m.active {
            rest.push(m);
            continue;
        }
        let key = (m.source.clone(), m.target.clone());
        match best_add.get(&key) {
            Some(kept) if outranks(kept, &m) => {
                trace!(source = %m.source, target = %m.target, dropped = m.value, kept = kept.value, "same-source add collapsed");
            }
            _ => {
                best_add.insert(key, m);
            }
        }
    }

    rest.extend(best_add.into_values());
    rest
}

/// Whether `kept` beats `candidate` for the single same-source slot. Equal values keep the
/// record that sorts first, so the survivor never depends on input order.
fn outranks(kept: &Modifier, candidate: &Modifier) -> bool {
    match kept.value.total_cmp(&candidate.value) {
        Ordering::Greater => true,
        Ordering::Equal => fold_order(kept, candidate) != Ordering::Greater,
        Ordering::Less => false,
    }
}

fn fold_order(a: &Modifier, b: &Modifier) -> Ordering {
    a.kind
        .precedence()
        .cmp(&b.kind.precedence())
        .then(a.priority.cmp(&b.priority))
        .then(a.value.total_cmp(&b.value))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.id.cmp(&b.id))
}

/// Resolve `base` through `modifiers`.
///
/// Targets are not filtered here: every active modifier in the slice applies. Use
/// [`modifiers_for`] first when a list carries modifiers for several attributes.
///
/// A second `Set` never blindly overwrites the first; the larger of the running value and
/// the forced value wins, so conflicting forced values resolve the same way in any order.
pub fn apply_modifiers(base: i32, modifiers: &[Modifier]) -> i32 {
    let mut ordered = collapse_same_source(modifiers.iter().filter(|m| m.active).cloned());
    ordered.sort_by(fold_order);

    let mut value = f64::from(base);
    let mut set_applied = false;
    for m in &ordered {
        value = match m.kind {
            ModifierKind::Set if !set_applied => {
                set_applied = true;
                m.value
            }
            ModifierKind::Set => value.max(m.value),
            ModifierKind::Add => value + m.value,
            ModifierKind::Multiply => value * m.value,
            ModifierKind::Min => value.max(m.value),
            ModifierKind::Max => value.min(m.value),
            ModifierKind::Advantage | ModifierKind::Disadvantage => value,
        };
    }

    let resolved = value.floor() as i32;
    trace!(base, resolved, applied = ordered.len(), "modifiers resolved");
    resolved
}

fn any_active(modifiers: &[Modifier], kind: ModifierKind) -> bool {
    modifiers.iter().any(|m| m.active && m.kind == kind)
}

/// True when some active modifier grants advantage and none imposes disadvantage.
pub fn has_advantage(modifiers: &[Modifier]) -> bool {
    any_active(modifiers, ModifierKind::Advantage)
        && !any_active(modifiers, ModifierKind::Disadvantage)
}

/// True when some active modifier imposes disadvantage and none grants advantage.
pub fn has_disadvantage(modifiers: &[Modifier]) -> bool {
    any_active(modifiers, ModifierKind::Disadvantage)
        && !any_active(modifiers, ModifierKind::Advantage)
}

pub fn vantage(modifiers: &[Modifier]) -> Vantage {
    if has_advantage(modifiers) {
        Vantage::Advantage
    } else if has_disadvantage(modifiers) {
        Vantage::Disadvantage
    } else {
        Vantage::Normal
    }
}

/// Merge modifier lists from independent feature sources (race, class, items,
/// conditions), collapsing same-source `Add`s once before resolution.
pub fn combine_modifiers(lists: &[&[Modifier]]) -> Vec<Modifier> {
    collapse_same_source(lists.iter().flat_map(|l| l.iter().cloned()))
}

/// Modifiers addressed to `target`.
pub fn modifiers_for(target: &str, modifiers: &[Modifier]) -> Vec<Modifier> {
    modifiers
        .iter()
        .filter(|m| m.target == target)
        .cloned()
        .collect()
}
