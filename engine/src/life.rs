use serde::{Deserialize, Serialize};

use crate::config::TempHpPolicy;

pub const DEATH_SAVE_CAP: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i32,
    pub max: i32,
    #[serde(default)]
    pub temp: i32,
}

/// What one `adjust` call did, for logging and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpChange {
    pub before: i32,
    pub after: i32,
    pub temp_before: i32,
    pub temp_after: i32,
}

impl HpChange {
    pub fn dropped_to_zero(&self) -> bool {
        self.before > 0 && self.after == 0
    }
}

impl HitPoints {
    pub fn full(max: i32) -> Self {
        let max = max.max(0);
        Self {
            current: max,
            max,
            temp: 0,
        }
    }

    /// Clamp into `0 <= current <= max`, `temp >= 0`.
    pub fn normalized(self) -> Self {
        let max = self.max.max(0);
        Self {
            current: self.current.clamp(0, max),
            max,
            temp: self.temp.max(0),
        }
    }

    /// Negative `delta` is damage and drains temporary HP first; positive `delta` heals
    /// `current` only. The result is clamped to `[0, max]`.
    pub fn adjust(&mut self, delta: i32) -> HpChange {
        let before = *self;
        let max = self.max.max(0);
        if delta < 0 {
            let damage = delta.unsigned_abs().min(i32::MAX as u32) as i32;
            let absorbed = self.temp.max(0).min(damage);
            self.temp = self.temp.max(0) - absorbed;
            self.current = self.current.saturating_sub(damage - absorbed).clamp(0, max);
        } else {
            self.current = self.current.saturating_add(delta).clamp(0, max);
        }
        HpChange {
            before: before.current,
            after: self.current,
            temp_before: before.temp,
            temp_after: self.temp,
        }
    }

    pub fn set_temp(&mut self, value: i32, policy: TempHpPolicy) {
        let value = value.max(0);
        self.temp = match policy {
            TempHpPolicy::Replace => value,
            TempHpPolicy::KeepHigher => self.temp.max(value),
        };
    }

    pub fn is_down(&self) -> bool {
        self.current == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeathSaves {
    pub successes: u8, // 0..=3
    pub failures: u8,  // 0..=3
}

impl DeathSaves {
    /// Count one save; past the cap this is a no-op.
    pub fn record(&mut self, success: bool) {
        let counter = if success {
            &mut self.successes
        } else {
            &mut self.failures
        };
        *counter = (*counter + 1).min(DEATH_SAVE_CAP);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_stable(&self) -> bool {
        self.successes >= DEATH_SAVE_CAP
    }

    pub fn is_dead(&self) -> bool {
        self.failures >= DEATH_SAVE_CAP
    }

    pub fn is_settled(&self) -> bool {
        self.is_stable() || self.is_dead()
    }
}

/// Result of a rolled death save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathSaveRoll {
    /// Natural 20: regain 1 HP.
    Revived,
    Success,
    Failure,
    /// Natural 1: two failures.
    CriticalFailure,
}

impl DeathSaveRoll {
    pub fn from_d20(roll: u8) -> Self {
        match roll {
            20 => DeathSaveRoll::Revived,
            1 => DeathSaveRoll::CriticalFailure,
            r if r >= 10 => DeathSaveRoll::Success,
            _ => DeathSaveRoll::Failure,
        }
    }
}
