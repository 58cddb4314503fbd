//! A single evolving runner
//!
//! Runners move right at a genome-perturbed pace, jump when the active gene
//! says so, and stop for good on the finish line, on an obstacle, or when
//! their frame budget runs out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::genome::Genome;
use crate::obstacle::Obstacle;
use crate::physics::{first_collision, is_grounded};
use crate::settings::{PhysicsSettings, SimulationSettings};

/// Lifecycle of a runner within one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RunnerStatus {
    #[default]
    Running,
    /// Crossed the finish line
    Succeeded,
    /// Touched an obstacle
    Crashed,
    /// Used up `genome_length * gene_duration` frames
    TimedOut,
}

impl RunnerStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Per-frame state handed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunnerSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub distance: f32,
    pub gene_index: usize,
    pub status: RunnerStatus,
}

#[derive(Debug, Clone)]
pub struct Runner {
    genome: Genome,
    position: Vec2,
    velocity: Vec2,
    elapsed_frames: u32,
    gene_index: usize,
    jump_cooldown: u32,
    can_trigger_jump: bool,
    /// Furthest x reached
    distance: f32,
    status: RunnerStatus,
}

impl Runner {
    /// New runner standing at the start line
    pub fn new(genome: Genome, physics: &PhysicsSettings) -> Self {
        Self {
            genome,
            position: Vec2::new(physics.start_x, physics.rest_y()),
            velocity: Vec2::ZERO,
            elapsed_frames: 0,
            gene_index: 0,
            jump_cooldown: 0,
            can_trigger_jump: true,
            distance: physics.start_x,
            status: RunnerStatus::Running,
        }
    }

    /// Fresh runner carrying a copy of this genome
    pub fn respawn(&self, physics: &PhysicsSettings) -> Self {
        Self::new(self.genome.clone(), physics)
    }

    /// Return to the start line, keeping the genome
    pub fn reset_state(&mut self, physics: &PhysicsSettings) {
        let genome = std::mem::replace(&mut self.genome, Genome::from_genes(Vec::new()));
        *self = Self::new(genome, physics);
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Circle center, y growing downward
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn status(&self) -> RunnerStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn elapsed_frames(&self) -> u32 {
        self.elapsed_frames
    }

    pub fn gene_index(&self) -> usize {
        self.gene_index
    }

    pub fn jump_cooldown(&self) -> u32 {
        self.jump_cooldown
    }

    pub fn can_trigger_jump(&self) -> bool {
        self.can_trigger_jump
    }

    /// End the run now; counts as a timeout unless already finished
    pub fn force_finish(&mut self) {
        if !self.is_finished() {
            self.status = RunnerStatus::TimedOut;
        }
    }

    pub fn snapshot(&self) -> RunnerSnapshot {
        RunnerSnapshot {
            position: self.position,
            velocity: self.velocity,
            distance: self.distance,
            gene_index: self.gene_index,
            status: self.status,
        }
    }

    /// Advance exactly one frame; does nothing once finished
    pub fn step(&mut self, obstacles: &mut [Obstacle], settings: &SimulationSettings) {
        if self.is_finished() {
            return;
        }

        let physics = &settings.physics;
        let jump = &settings.jump;
        let gene_duration = settings.evolution.gene_duration.max(1);

        self.elapsed_frames += 1;

        // Active slot; entering a new slot re-arms the trigger
        let last_slot = self.genome.len().saturating_sub(1);
        let index = ((self.elapsed_frames / gene_duration) as usize).min(last_slot);
        if index != self.gene_index {
            self.gene_index = index;
            self.can_trigger_jump = true;
        }
        let value = self.genome.gene(index);

        let grounded = is_grounded(self.position.y, physics.rest_y());
        if grounded && self.jump_cooldown == 0 && self.can_trigger_jump && value > jump.threshold {
            self.velocity.y = -jump.power_for(value);
            self.can_trigger_jump = false;
            self.jump_cooldown = jump.cooldown_frames;
        } else if value < jump.rearm_below() {
            self.can_trigger_jump = true;
        }

        if self.jump_cooldown > 0 {
            self.jump_cooldown -= 1;
        }

        self.velocity.x = physics.base_speed + (value - 0.5) * 0.6;
        self.position.x += self.velocity.x;
        self.velocity.y += physics.gravity;
        self.position.y += self.velocity.y;
        if self.position.y >= physics.rest_y() {
            self.position.y = physics.rest_y();
            self.velocity.y = 0.0;
        }

        self.distance = self.distance.max(self.position.x);

        if self.position.x >= settings.course.length {
            self.status = RunnerStatus::Succeeded;
            self.distance = settings.course.length;
        } else if let Some(hit) =
            first_collision(self.position, physics.runner_radius, obstacles, physics.ground_y)
        {
            obstacles[hit].hit = true;
            self.status = RunnerStatus::Crashed;
            log::trace!(
                "runner crashed into obstacle {} at x={:.1}",
                obstacles[hit].id,
                self.position.x
            );
        } else if self.elapsed_frames >= settings.frame_budget() {
            self.status = RunnerStatus::TimedOut;
        }
    }
}
