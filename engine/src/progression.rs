//! Experience points as the single source of truth for level.

use serde::{Deserialize, Serialize};
use tracing::info;

pub const MIN_LEVEL: u8 = 1;
pub const MAX_LEVEL: u8 = 20;

/// XP floor for each level; index is `level - 1`.
pub const XP_THRESHOLDS: [u32; 20] = [
    0, 300, 900, 2_700, 6_500, 14_000, 23_000, 34_000, 48_000, 64_000, 85_000, 100_000, 120_000,
    140_000, 165_000, 195_000, 225_000, 265_000, 305_000, 355_000,
];

fn clamp_level(level: i32) -> u8 {
    level.clamp(MIN_LEVEL as i32, MAX_LEVEL as i32) as u8
}

/// Highest level whose threshold is at or below `xp`.
pub fn level_from_xp(xp: u32) -> u8 {
    XP_THRESHOLDS
        .iter()
        .rposition(|&threshold| xp >= threshold)
        .map_or(MIN_LEVEL, |i| (i + 1) as u8)
}

/// XP floor of `level`. Levels outside 1..=20 are clamped.
pub fn xp_for_level(level: i32) -> u32 {
    XP_THRESHOLDS[(clamp_level(level) - 1) as usize]
}

/// XP still needed to reach the next level; 0 at level 20.
pub fn xp_to_next_level(xp: u32) -> u32 {
    let level = level_from_xp(xp);
    if level >= MAX_LEVEL {
        return 0;
    }
    XP_THRESHOLDS[level as usize] - xp
}

/// Fraction of the current level's band already earned, in `[0, 1]`.
pub fn progress_to_next_level(xp: u32) -> f64 {
    let level = level_from_xp(xp);
    if level >= MAX_LEVEL {
        return 1.0;
    }
    let floor = XP_THRESHOLDS[(level - 1) as usize];
    let next = XP_THRESHOLDS[level as usize];
    f64::from(xp - floor) / f64::from(next - floor)
}

/// Every level reached by awarding `added_xp` on top of `current_xp`, one entry per level
/// so skipped levels each get their own notification.
pub fn levels_gained(current_xp: u32, added_xp: u32) -> Vec<u8> {
    let from = level_from_xp(current_xp);
    let to = level_from_xp(current_xp.saturating_add(added_xp));
    (from + 1..=to).collect()
}

/// Milestone helper: XP floor for an explicit level.
pub fn set_to_level(level: i32) -> u32 {
    xp_for_level(level)
}

/// Milestone helper: XP floor of the level above the one `xp` sits at.
pub fn level_up(xp: u32) -> u32 {
    xp_for_level(level_from_xp(xp) as i32 + 1)
}

/// Milestone helper: XP floor of the level below the one `xp` sits at.
pub fn level_down(xp: u32) -> u32 {
    xp_for_level(level_from_xp(xp) as i32 - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub level: u8,
    pub xp: u32,
}

/// Stored experience. Level is always derived on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExperienceTracker {
    xp: u32,
}

impl ExperienceTracker {
    pub fn new(xp: u32) -> Self {
        Self { xp }
    }

    /// Negative totals are clamped to 0 here, at the entity boundary.
    pub fn from_signed(xp: i64) -> Self {
        Self {
            xp: xp.clamp(0, u32::MAX as i64) as u32,
        }
    }

    pub fn xp(&self) -> u32 {
        self.xp
    }

    pub fn level(&self) -> u8 {
        level_from_xp(self.xp)
    }

    pub fn xp_to_next_level(&self) -> u32 {
        xp_to_next_level(self.xp)
    }

    pub fn progress(&self) -> f64 {
        progress_to_next_level(self.xp)
    }

    /// Award (or remove, when negative) experience. Returns one event per level gained.
    pub fn add_xp(&mut self, amount: i64) -> Vec<LevelUp> {
        let before = self.xp;
        *self = Self::from_signed(i64::from(before).saturating_add(amount));
        if self.xp <= before {
            return Vec::new();
        }
        let events: Vec<LevelUp> = levels_gained(before, self.xp - before)
            .into_iter()
            .map(|level| LevelUp { level, xp: self.xp })
            .collect();
        for e in &events {
            info!(level = e.level, xp = e.xp, "level up");
        }
        events
    }

    /// Milestone: snap xp to the floor of `level`.
    pub fn set_level(&mut self, level: i32) {
        self.xp = set_to_level(level);
    }

    pub fn level_up(&mut self) -> u8 {
        self.xp = level_up(self.xp);
        self.level()
    }

    pub fn level_down(&mut self) -> u8 {
        self.xp = level_down(self.xp);
        self.level()
    }
}
