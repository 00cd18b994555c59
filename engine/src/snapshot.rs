use serde::{Deserialize, Serialize};

use crate::combat::Encounter;
use crate::error::EngineError;

/// A named, timestamped encounter as the persistence layer stores it. The engine only
/// produces and reads the JSON; where it lives is the caller's business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEncounter {
    pub name: String,
    /// Unix seconds, supplied by the caller.
    pub saved_at: u64,
    pub state: Encounter,
}

impl SavedEncounter {
    pub fn new(name: impl Into<String>, saved_at: u64, state: Encounter) -> Self {
        Self {
            name: name.into(),
            saved_at,
            state,
        }
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(text)?)
    }
}
