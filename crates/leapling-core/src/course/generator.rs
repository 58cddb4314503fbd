//! Obstacle layout generation
//!
//! Both modes produce unsorted candidates; [`enforce_spacing`] then sorts
//! them, pushes crowded ones right and drops whatever no longer fits.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::difficulty::{height_boost, DifficultyParams};
use crate::obstacle::Obstacle;

use super::manual::ManualEntry;

/// Procedural obstacles start this far into the course
pub const INTERIOR_START: f32 = 120.0;
/// Obstacles must end at least this far before the finish line
pub const FINISH_MARGIN: f32 = 80.0;
/// Segment starts never move past `length - SEGMENT_CAP_MARGIN`
pub const SEGMENT_CAP_MARGIN: f32 = 180.0;

/// Inputs shared by both generation modes
#[derive(Debug, Clone, Copy)]
pub struct LayoutParams {
    pub length: f32,
    pub level: u32,
    pub difficulty: DifficultyParams,
    pub runner_radius: f32,
    pub max_height_multiplier: f32,
}

impl LayoutParams {
    fn height_for(&self, multiplier: f32) -> f32 {
        2.0 * self.runner_radius * multiplier
    }

    fn random_width<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let d = &self.difficulty;
        rng.random_range(d.width_min..=d.width_max)
    }
}

/// Number of obstacles a procedural layout aims for
pub fn procedural_count(length: f32, level: u32, count_boost: f32) -> usize {
    let floor = 6 + level.max(1) as usize - 1;
    let by_length = (length / (160.0 / count_boost)).round().max(0.0) as usize;
    floor.max(by_length)
}

/// Procedural candidates: one obstacle per irregular segment
pub fn generate_procedural<R: Rng + ?Sized>(params: &LayoutParams, rng: &mut R) -> Vec<Obstacle> {
    let d = &params.difficulty;
    let count = procedural_count(params.length, params.level, d.count_boost);
    let segment_length =
        ((params.length - 2.0 * INTERIOR_START) / count as f32).max(params.runner_radius * 2.0 * 1.8);
    let start_cap = params.length - SEGMENT_CAP_MARGIN;

    let mut segment_start = INTERIOR_START;
    let mut obstacles = Vec::with_capacity(count);

    for id in 0..count {
        let width = params.random_width(rng);
        let max_x = (params.length - FINISH_MARGIN - width).max(INTERIOR_START);
        let x = (segment_start + rng.random_range(0.0..=segment_length)).clamp(INTERIOR_START, max_x);

        let multiplier = if d.max_multiplier > d.min_multiplier {
            rng.random_range(d.min_multiplier..=d.max_multiplier)
        } else {
            d.min_multiplier
        };

        obstacles.push(Obstacle::new(id as u32, x, width, params.height_for(multiplier)));

        segment_start =
            (segment_start + segment_length * rng.random_range(0.5..=1.1)).min(start_cap);
    }

    obstacles
}

/// Scaled height multiplier for a manual entry
pub fn manual_multiplier(raw: f32, params: &LayoutParams) -> f32 {
    (raw * height_boost(params.level))
        .clamp(1.0, params.max_height_multiplier.max(1.0))
        .max(params.difficulty.min_multiplier)
}

/// Manual candidates, topped up with procedural ones above level 1
pub fn generate_manual<R: Rng + ?Sized>(
    entries: &[ManualEntry],
    params: &LayoutParams,
    rng: &mut R,
) -> Vec<Obstacle> {
    let mut obstacles: Vec<Obstacle> = entries
        .iter()
        .enumerate()
        .map(|(id, entry)| {
            let multiplier = manual_multiplier(entry.height_multiplier, params);
            Obstacle::new(
                id as u32,
                entry.position,
                params.random_width(rng),
                params.height_for(multiplier),
            )
        })
        .collect();

    if params.level > 1 {
        let procedural = generate_procedural(params, rng);
        let wanted = params.level as usize + entries.len().div_ceil(2);
        let extra = wanted.min(procedural.len());
        obstacles.extend(procedural.choose_multiple(rng, extra).cloned());
    }

    obstacles
}

/// Sort, space out and renumber candidates
///
/// Each obstacle ends up at least `gap_factor * max(width_prev, width)`
/// right of its predecessor and no later than `length - FINISH_MARGIN - width`;
/// candidates that cannot satisfy both are dropped. All `hit` flags reset.
pub fn enforce_spacing(mut candidates: Vec<Obstacle>, length: f32, gap_factor: f32) -> Vec<Obstacle> {
    candidates.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut placed: Vec<Obstacle> = Vec::with_capacity(candidates.len());
    for mut candidate in candidates {
        let max_x = length - FINISH_MARGIN - candidate.width;

        match placed.last() {
            None => {
                candidate.x = candidate.x.min(max_x);
                if candidate.x < 0.0 {
                    continue;
                }
            }
            Some(prev) => {
                let min_gap = gap_factor * prev.width.max(candidate.width);
                let min_x = prev.right() + min_gap;
                candidate.x = candidate.x.max(min_x).min(max_x);
                if candidate.x < min_x {
                    log::trace!("Dropping obstacle at x={:.1}: no room before finish", candidate.x);
                    continue;
                }
            }
        }

        candidate.id = placed.len() as u32;
        candidate.hit = false;
        placed.push(candidate);
    }

    placed
}
