//! Level-derived difficulty parameters
//!
//! Difficulty is a pure function of the level. Levels start at 1 and only
//! ever grow by one, whenever a generation produces at least one finisher.

use serde::{Deserialize, Serialize};

/// Obstacle-generation knobs for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    /// Minimum gap between neighbours, as a multiple of the wider width
    pub gap_factor: f32,
    /// Scales the procedural obstacle count
    pub count_boost: f32,
    /// Height multiplier range (relative to runner diameter)
    pub min_multiplier: f32,
    pub max_multiplier: f32,
    /// Obstacle width range
    pub width_min: f32,
    pub width_max: f32,
}

impl DifficultyParams {
    /// Derive parameters for `level` (levels below 1 are treated as 1)
    pub fn for_level(level: u32, base_gap_factor: f32, max_cap: f32) -> Self {
        let steps = level.max(1) as f32 - 1.0;
        let growth = 1.0 + steps * 0.2;

        let width_min = (12.0 - steps * 0.7).max(8.0);

        Self {
            gap_factor: (base_gap_factor / growth).max(0.85),
            count_boost: 1.0 + steps * 0.25,
            min_multiplier: (1.6 + steps * 0.2).min(max_cap),
            max_multiplier: (2.5 + steps * 0.35).min(max_cap),
            width_min,
            width_max: (18.0 - steps * 0.4).max(width_min + 2.0),
        }
    }
}

/// Multiplier applied to manual obstacle heights at `level`
pub fn height_boost(level: u32) -> f32 {
    1.0 + (level.max(1) as f32 - 1.0) * 0.15
}
