//! Simulation settings bundle
//!
//! Everything the core needs from its host is grouped here and passed
//! explicitly into constructors. Out-of-range values are clamped by
//! [`SimulationSettings::sanitize`] rather than rejected.

use serde::{Deserialize, Serialize};

/// How the obstacle layout is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleMode {
    /// Procedurally generated from the current difficulty
    #[default]
    Random,
    /// Parsed from `CourseSettings::manual_spec`, procedural fallback
    Manual,
}

impl std::str::FromStr for ObstacleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" | "procedural" => Ok(Self::Random),
            "manual" => Ok(Self::Manual),
            other => Err(format!("Unknown obstacle mode '{}'", other)),
        }
    }
}

/// Complete settings bundle for one run
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SimulationSettings {
    #[serde(default)]
    pub evolution: EvolutionSettings,

    #[serde(default)]
    pub course: CourseSettings,

    #[serde(default)]
    pub physics: PhysicsSettings,

    #[serde(default)]
    pub jump: JumpSettings,
}

/// Genetic algorithm parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvolutionSettings {
    /// Runners per generation
    pub population_size: usize,
    /// Number of gene slots per genome
    pub genome_length: usize,
    /// Frames each gene slot stays active
    pub gene_duration: u32,
    /// Per-gene mutation probability
    pub mutation_rate: f32,
    /// Run halts once this generation has been evaluated
    pub max_generations: u32,
    /// Master seed (None = seeded from OS entropy)
    pub seed: Option<u64>,
}

impl Default for EvolutionSettings {
    fn default() -> Self {
        Self {
            population_size: 50,
            genome_length: 60,
            gene_duration: 10,
            mutation_rate: 0.05,
            max_generations: 200,
            seed: None,
        }
    }
}

/// Course layout parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CourseSettings {
    /// Finish line x coordinate
    pub length: f32,
    pub mode: ObstacleMode,
    /// `position:heightMultiplier` entries separated by commas
    pub manual_spec: String,
    /// Gap factor at level 1 before growth scaling
    pub base_gap_factor: f32,
    /// Upper cap for obstacle height multipliers
    pub max_hurdle_height_multiplier: f32,
}

impl Default for CourseSettings {
    fn default() -> Self {
        Self {
            length: 1000.0,
            mode: ObstacleMode::Random,
            manual_spec: String::new(),
            base_gap_factor: 2.2,
            max_hurdle_height_multiplier: 4.0,
        }
    }
}

/// Per-frame kinematics (units are pixels and frames)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsSettings {
    /// Downward acceleration per frame
    pub gravity: f32,
    /// Horizontal speed at gene value 0.5
    pub base_speed: f32,
    /// Ground surface y (y grows downward)
    pub ground_y: f32,
    pub runner_radius: f32,
    /// Spawn x of every runner
    pub start_x: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            base_speed: 3.0,
            ground_y: 300.0,
            runner_radius: 10.0,
            start_x: 30.0,
        }
    }
}

impl PhysicsSettings {
    /// Center y of a runner resting on the ground
    pub fn rest_y(&self) -> f32 {
        self.ground_y - self.runner_radius
    }
}

/// Jump decision parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JumpSettings {
    /// Gene values above this trigger a jump
    pub threshold: f32,
    pub velocity_min: f32,
    pub velocity_max: f32,
    pub cooldown_frames: u32,
}

impl Default for JumpSettings {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            velocity_min: 6.0,
            velocity_max: 11.0,
            cooldown_frames: 20,
        }
    }
}

impl JumpSettings {
    /// Map a gene value from `[threshold, 1]` onto `[velocity_min, velocity_max]`
    pub fn power_for(&self, value: f32) -> f32 {
        let span = (1.0 - self.threshold).max(f32::EPSILON);
        let t = (value - self.threshold) / span;
        let power = self.velocity_min + t * (self.velocity_max - self.velocity_min);
        power.clamp(self.velocity_min, self.velocity_max)
    }

    /// Below this value an exhausted jump trigger re-arms
    pub fn rearm_below(&self) -> f32 {
        self.threshold * 0.6
    }
}

/// Clamp into `[min, max]`; unordered values (NaN) fall back to `min`
fn clamp_logged<T: PartialOrd + Copy + std::fmt::Debug>(name: &str, value: T, min: T, max: T) -> T {
    if value.partial_cmp(&value).is_none() {
        log::warn!("{} = {:?} is not a number, using {:?}", name, value, min);
        return min;
    }
    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };
    if clamped != value {
        log::warn!("{} = {:?} out of range, clamped to {:?}", name, value, clamped);
    }
    clamped
}

impl SimulationSettings {
    /// Clamp every numeric value into a usable range
    pub fn sanitize(mut self) -> Self {
        let evo = &mut self.evolution;
        evo.population_size = clamp_logged("population_size", evo.population_size, 3, 10_000);
        evo.genome_length = clamp_logged("genome_length", evo.genome_length, 1, 100_000);
        evo.gene_duration = clamp_logged("gene_duration", evo.gene_duration, 1, 10_000);
        evo.mutation_rate = clamp_logged("mutation_rate", evo.mutation_rate, 0.0, 1.0);
        evo.max_generations = clamp_logged("max_generations", evo.max_generations, 1, u32::MAX);

        let course = &mut self.course;
        course.length = clamp_logged("course.length", course.length, 400.0, 1_000_000.0);
        course.base_gap_factor = clamp_logged("base_gap_factor", course.base_gap_factor, 0.85, 20.0);
        course.max_hurdle_height_multiplier = clamp_logged(
            "max_hurdle_height_multiplier",
            course.max_hurdle_height_multiplier,
            1.0,
            50.0,
        );

        let physics = &mut self.physics;
        physics.gravity = clamp_logged("gravity", physics.gravity, 0.01, 100.0);
        physics.base_speed = clamp_logged("base_speed", physics.base_speed, 0.35, 1_000.0);
        physics.runner_radius = clamp_logged("runner_radius", physics.runner_radius, 1.0, 1_000.0);
        physics.ground_y = clamp_logged("ground_y", physics.ground_y, 0.0, 1_000_000.0);
        physics.start_x = clamp_logged("start_x", physics.start_x, 0.0, course.length / 4.0);

        let jump = &mut self.jump;
        jump.threshold = clamp_logged("jump.threshold", jump.threshold, 0.01, 0.99);
        jump.velocity_min = clamp_logged("jump.velocity_min", jump.velocity_min, 0.0, 1_000.0);
        jump.velocity_max =
            clamp_logged("jump.velocity_max", jump.velocity_max, jump.velocity_min, 1_000.0);

        self
    }

    /// Number of runners carried over unchanged each generation
    pub fn elite_count(&self) -> usize {
        let size = self.evolution.population_size;
        let tenth = (size as f32 * 0.1).round() as usize;
        tenth.max(2).min(size.saturating_sub(1))
    }

    /// Frames a runner may spend before timing out
    pub fn frame_budget(&self) -> u32 {
        (self.evolution.genome_length as u32).saturating_mul(self.evolution.gene_duration)
    }
}
