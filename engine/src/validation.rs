//! Ability-score allocation and identity checks run before a character is finalized.
//!
//! Validators never fail fast: each returns every problem it finds so a caller can
//! show the whole list at once.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RulesConfig;
use crate::AbilityScores;

pub const STANDARD_ARRAY: [i32; 6] = [15, 14, 13, 12, 10, 8];
pub const POINT_BUY_BUDGET: u32 = 27;
pub const POINT_BUY_MIN: i32 = 8;
pub const POINT_BUY_MAX: i32 = 15;
pub const SCORE_MIN: i32 = 1;
pub const SCORE_MAX: i32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityMethod {
    #[default]
    StandardArray,
    PointBuy,
    /// Rolled or hand-entered; only the absolute range applies.
    Rolled,
}

/// A character as proposed by the creation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub race: String,
    pub class: String,
    #[serde(default)]
    pub method: AbilityMethod,
    pub abilities: AbilityScores,
}

/// Point-buy cost for each score value.
pub fn point_buy_cost(score: i32) -> Option<u32> {
    match score {
        8 => Some(0),
        9 => Some(1),
        10 => Some(2),
        11 => Some(3),
        12 => Some(4),
        13 => Some(5),
        14 => Some(7),
        15 => Some(9),
        _ => None,
    }
}

/// Points spent on in-range scores; out-of-range scores contribute nothing.
pub fn point_buy_spent(scores: &AbilityScores) -> u32 {
    scores.iter().filter_map(|(_, s)| point_buy_cost(s)).sum()
}

pub fn validate_point_buy(scores: &AbilityScores) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut total = 0u32;

    for (ability, score) in scores.iter() {
        match point_buy_cost(score) {
            Some(cost) => total += cost,
            None => errors.push(ValidationError::new(
                ability.field(),
                format!(
                    "{} score {} is out of range ({}-{})",
                    ability.abbreviation(),
                    score,
                    POINT_BUY_MIN,
                    POINT_BUY_MAX
                ),
            )),
        }
    }

    if total > POINT_BUY_BUDGET {
        errors.push(ValidationError::new(
            "abilities",
            format!("total point cost {total} exceeds budget {POINT_BUY_BUDGET}"),
        ));
    }
    errors
}

pub fn validate_standard_array(scores: &AbilityScores) -> Vec<ValidationError> {
    let mut remaining: HashMap<i32, usize> = HashMap::new();
    for v in STANDARD_ARRAY {
        *remaining.entry(v).or_default() += 1;
    }

    let mut errors = Vec::new();
    for (ability, score) in scores.iter() {
        match remaining.get_mut(&score) {
            None => errors.push(ValidationError::new(
                ability.field(),
                format!(
                    "{} score {} is not in the standard array",
                    ability.abbreviation(),
                    score
                ),
            )),
            Some(0) => errors.push(ValidationError::new(
                ability.field(),
                format!(
                    "{} score {} is already used by another ability",
                    ability.abbreviation(),
                    score
                ),
            )),
            Some(left) => *left -= 1,
        }
    }
    errors
}

pub fn validate_ability_range(scores: &AbilityScores) -> Vec<ValidationError> {
    scores
        .iter()
        .filter(|(_, s)| !(SCORE_MIN..=SCORE_MAX).contains(s))
        .map(|(ability, score)| {
            ValidationError::new(
                ability.field(),
                format!(
                    "{} score {} is out of range ({}-{})",
                    ability.abbreviation(),
                    score,
                    SCORE_MIN,
                    SCORE_MAX
                ),
            )
        })
        .collect()
}

fn validate_text(field: &str, label: &str, value: &str, max_len: usize) -> Vec<ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        vec![ValidationError::new(field, format!("{label} is required"))]
    } else if trimmed.chars().count() > max_len {
        vec![ValidationError::new(
            field,
            format!("{label} must be at most {max_len} characters"),
        )]
    } else {
        Vec::new()
    }
}

pub fn validate_name(name: &str, max_len: usize) -> Vec<ValidationError> {
    validate_text("name", "Name", name, max_len)
}

pub fn validate_race(race: &str, max_len: usize) -> Vec<ValidationError> {
    validate_text("race", "Race", race, max_len)
}

pub fn validate_class(class: &str, max_len: usize) -> Vec<ValidationError> {
    validate_text("class", "Class", class, max_len)
}

pub fn validate_character_creation(draft: &CharacterDraft, rules: &RulesConfig) -> ValidationReport {
    let mut errors = validate_name(&draft.name, rules.max_name_len);
    errors.extend(validate_race(&draft.race, rules.max_name_len));
    errors.extend(validate_class(&draft.class, rules.max_name_len));
    errors.extend(match draft.method {
        AbilityMethod::StandardArray => validate_standard_array(&draft.abilities),
        AbilityMethod::PointBuy => validate_point_buy(&draft.abilities),
        AbilityMethod::Rolled => validate_ability_range(&draft.abilities),
    });
    ValidationReport::from_errors(errors)
}
