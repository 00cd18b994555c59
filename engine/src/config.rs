use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// How `set_temp_hp` treats an existing pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempHpPolicy {
    /// New value replaces the old pool.
    #[default]
    Replace,
    /// Keep whichever pool is larger (common house rule).
    KeepHigher,
}

/// Table-level rule switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RulesConfig {
    pub temp_hp_policy: TempHpPolicy,
    pub max_name_len: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            temp_hp_policy: TempHpPolicy::Replace,
            max_name_len: 64,
        }
    }
}

impl RulesConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, EngineError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file, picked by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            other => Err(EngineError::UnsupportedFormat(
                other.unwrap_or("").to_string(),
            )),
        }
    }
}
