//! Obstacle course: layout, level and difficulty
//!
//! The course owns the obstacle set shared by every runner of a generation.
//! Layouts are only ever replaced wholesale (level-up or reconfiguration);
//! between those, runners may only flip `hit` flags.

mod generator;
mod manual;

pub use generator::{
    enforce_spacing, generate_manual, generate_procedural, manual_multiplier, procedural_count,
    LayoutParams, FINISH_MARGIN, INTERIOR_START, SEGMENT_CAP_MARGIN,
};
pub use manual::{
    parse_entry, parse_manual_spec, ManualEntry, ManualSpecError, DEFAULT_HEIGHT_MULTIPLIER,
};

use crate::difficulty::DifficultyParams;
use crate::obstacle::Obstacle;
use crate::settings::{CourseSettings, ObstacleMode};
use crate::SimRng;

#[derive(Debug, Clone)]
pub struct Course {
    settings: CourseSettings,
    runner_radius: f32,
    level: u32,
    difficulty: DifficultyParams,
    obstacles: Vec<Obstacle>,
    rng: SimRng,
}

impl Course {
    /// Build a level-1 course
    pub fn new(settings: CourseSettings, runner_radius: f32, rng: SimRng) -> Self {
        let mut course = Self {
            difficulty: DifficultyParams::for_level(
                1,
                settings.base_gap_factor,
                settings.max_hurdle_height_multiplier,
            ),
            settings,
            runner_radius,
            level: 1,
            obstacles: Vec::new(),
            rng,
        };
        course.regenerate();
        course
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn difficulty(&self) -> &DifficultyParams {
        &self.difficulty
    }

    pub fn length(&self) -> f32 {
        self.settings.length
    }

    pub fn settings(&self) -> &CourseSettings {
        &self.settings
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Runners flip `hit` flags through this; layouts are never edited in place
    pub(crate) fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    /// Advance one level and lay out a fresh course; returns the new level
    pub fn level_up(&mut self) -> u32 {
        self.level += 1;
        self.regenerate();
        log::info!(
            "Level {}: {} obstacles, gap factor {:.2}, heights x{:.2}-x{:.2}",
            self.level,
            self.obstacles.len(),
            self.difficulty.gap_factor,
            self.difficulty.min_multiplier,
            self.difficulty.max_multiplier
        );
        self.level
    }

    /// Swap in new course settings (mode, manual text, length) at the current level
    pub fn reconfigure(&mut self, settings: CourseSettings) {
        self.settings = settings;
        self.regenerate();
    }

    pub fn clear_hits(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.hit = false;
        }
    }

    fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            length: self.settings.length,
            level: self.level,
            difficulty: self.difficulty,
            runner_radius: self.runner_radius,
            max_height_multiplier: self.settings.max_hurdle_height_multiplier,
        }
    }

    fn regenerate(&mut self) {
        self.difficulty = DifficultyParams::for_level(
            self.level,
            self.settings.base_gap_factor,
            self.settings.max_hurdle_height_multiplier,
        );
        let params = self.layout_params();

        let candidates = match self.settings.mode {
            ObstacleMode::Manual => {
                let entries = parse_manual_spec(&self.settings.manual_spec, params.length);
                if entries.is_empty() {
                    log::warn!("Manual obstacle spec has no usable entries, generating procedurally");
                    generate_procedural(&params, &mut self.rng)
                } else {
                    generate_manual(&entries, &params, &mut self.rng)
                }
            }
            ObstacleMode::Random => generate_procedural(&params, &mut self.rng),
        };

        self.obstacles = enforce_spacing(candidates, params.length, params.difficulty.gap_factor);
    }
}
