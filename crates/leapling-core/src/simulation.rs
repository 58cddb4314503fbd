//! Frame-stepped simulation facade
//!
//! Owns the course and the population and advances both one frame at a
//! time. Hosts drive it with [`Simulation::step`] or [`Simulation::tick`]
//! and read back [`Simulation::snapshot`]; nothing here blocks or sleeps.

use rand::{Rng, SeedableRng};

use crate::course::Course;
use crate::events::{FinalResult, FrameSnapshot, SimEvent};
use crate::population::{GenerationReport, Population};
use crate::settings::{CourseSettings, SimulationSettings};
use crate::{seeded_rng, SimRng};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunState {
    Running,
    /// Halted by the host before the generation limit
    Stopped,
    /// Generation limit reached
    Completed(FinalResult),
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }
}

pub struct Simulation {
    settings: SimulationSettings,
    seed: u64,
    course: Course,
    population: Population,
    frame: u64,
    state: RunState,
}

impl Simulation {
    /// Sanitize `settings`, lay out the level-1 course and spawn generation 1
    pub fn new(settings: SimulationSettings) -> Self {
        let settings = settings.sanitize();
        let (mut master, seed) = seeded_rng(settings.evolution.seed);

        // Separate streams so course layout never shifts breeding
        let course_rng = SimRng::seed_from_u64(master.random());
        let population_rng = SimRng::seed_from_u64(master.random());

        let course = Course::new(
            settings.course.clone(),
            settings.physics.runner_radius,
            course_rng,
        );
        let population = Population::new(settings.clone(), population_rng);

        log::info!(
            "Simulation seeded with {}: {} runners, {} obstacles on a {:.0}px course",
            seed,
            population.len(),
            course.obstacles().len(),
            course.length()
        );

        Self {
            settings,
            seed,
            course,
            population,
            frame: 0,
            state: RunState::Running,
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Seed the run was started with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Frames simulated since the start of the run
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn generation(&self) -> u32 {
        self.population.generation()
    }

    pub fn level(&self) -> u32 {
        self.course.level()
    }

    /// Advance one frame
    pub fn step(&mut self) -> Vec<SimEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        self.frame += 1;
        let report = self.population.advance_one_frame(&mut self.course);
        self.absorb(report)
    }

    /// Advance up to `steps` frames, stopping early once the run ends
    pub fn tick(&mut self, steps: u32) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..steps {
            if !self.is_running() {
                break;
            }
            events.extend(self.step());
        }
        events
    }

    /// End the current generation immediately
    pub fn force_advance(&mut self) -> Vec<SimEvent> {
        if !self.is_running() {
            return Vec::new();
        }
        let report = self.population.force_advance(&mut self.course);
        self.absorb(report)
    }

    /// Halt the run; later step calls do nothing
    pub fn stop(&mut self) {
        if self.is_running() {
            log::info!(
                "Simulation stopped at generation {}, level {}",
                self.generation(),
                self.level()
            );
            self.state = RunState::Stopped;
        }
    }

    /// Replace the course settings and restart the current generation
    ///
    /// The level is kept; the new layout is generated for it.
    pub fn reconfigure_course(&mut self, course: CourseSettings) {
        let mut settings = self.settings.clone();
        settings.course = course;
        self.settings = settings.sanitize();

        self.course.reconfigure(self.settings.course.clone());
        self.population.reconfigure_course(
            self.settings.course.clone(),
            self.settings.physics.clone(),
        );
        log::info!(
            "Course reconfigured: {:?} mode, {:.0}px, {} obstacles",
            self.settings.course.mode,
            self.course.length(),
            self.course.obstacles().len()
        );
    }

    /// Current frame for rendering
    pub fn snapshot(&self) -> FrameSnapshot<'_> {
        FrameSnapshot {
            generation: self.population.generation(),
            level: self.course.level(),
            frame: self.frame,
            course_length: self.course.length(),
            ground_y: self.settings.physics.ground_y,
            runner_radius: self.settings.physics.runner_radius,
            runners: self.population.runners().iter().map(|r| r.snapshot()).collect(),
            best_index: self.population.stats().best_index,
            obstacles: self.course.obstacles(),
        }
    }

    fn absorb(&mut self, report: Option<GenerationReport>) -> Vec<SimEvent> {
        let Some(report) = report else {
            return Vec::new();
        };
        if let Some(result) = report.final_result {
            self.state = RunState::Completed(result);
        }
        report.events()
    }
}
