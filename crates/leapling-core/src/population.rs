//! Generational evolution loop
//!
//! A population steps all of its runners in lockstep. When the last runner
//! finishes, the generation is evaluated: a finisher bumps the course level,
//! the generation limit halts the run, and otherwise the next generation is
//! bred from the current one (elitism + roulette selection + single-point
//! crossover + mutation).

use rand::Rng;

use crate::course::Course;
use crate::events::{FinalResult, GenerationSummary, SimEvent};
use crate::genome::{crossover, Genome};
use crate::runner::Runner;
use crate::settings::{CourseSettings, PhysicsSettings, SimulationSettings};
use crate::stats::{BestRecord, GenerationStats};
use crate::SimRng;

/// Fitness-proportionate pick; entries with zero weight are never chosen
///
/// Returns None when no entry has positive weight.
pub fn roulette_select<R: Rng + ?Sized>(weights: &[f32], rng: &mut R) -> Option<usize> {
    let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }

    let target = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (index, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        if target < cumulative {
            return Some(index);
        }
    }

    // Rounding can leave `target` just past the final sum
    weights.iter().rposition(|w| *w > 0.0)
}

/// Selection weight of a runner; never below 1
pub fn selection_weight(distance: f32) -> f32 {
    distance.max(0.0) + 1.0
}

/// What happened at a generation boundary
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub summary: GenerationSummary,
    /// New level, if a runner finished the course
    pub level_up: Option<u32>,
    /// Set when this was the last generation of the run
    pub final_result: Option<FinalResult>,
}

impl GenerationReport {
    pub fn events(&self) -> Vec<SimEvent> {
        let mut events = vec![SimEvent::GenerationCompleted(self.summary)];
        if let Some(level) = self.level_up {
            events.push(SimEvent::LevelUp {
                level,
                generation: self.summary.generation,
            });
        }
        if let Some(result) = self.final_result {
            events.push(SimEvent::RunFinished(result));
        }
        events
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Simulating,
    Breeding,
    Halted,
}

pub struct Population {
    settings: SimulationSettings,
    runners: Vec<Runner>,
    generation: u32,
    stats: GenerationStats,
    /// Best distance since the last level-up
    level_best: BestRecord,
    overall_best: BestRecord,
    phase: Phase,
    final_result: Option<FinalResult>,
    rng: SimRng,
}

impl Population {
    /// Random first generation
    pub fn new(settings: SimulationSettings, mut rng: SimRng) -> Self {
        let genomes = (0..settings.evolution.population_size)
            .map(|_| Genome::random(settings.evolution.genome_length, &mut rng))
            .collect();
        Self::from_genomes(settings, genomes, rng)
    }

    /// First generation from explicit genomes
    pub fn from_genomes(settings: SimulationSettings, genomes: Vec<Genome>, rng: SimRng) -> Self {
        let runners: Vec<Runner> = genomes
            .into_iter()
            .map(|genome| Runner::new(genome, &settings.physics))
            .collect();
        let stats = GenerationStats::from_runners(&runners);

        Self {
            settings,
            runners,
            generation: 1,
            stats,
            level_best: BestRecord::default(),
            overall_best: BestRecord::default(),
            phase: Phase::Simulating,
            final_result: None,
            rng,
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn runners(&self) -> &[Runner] {
        &self.runners
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }

    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    pub fn level_best(&self) -> BestRecord {
        self.level_best
    }

    pub fn overall_best(&self) -> BestRecord {
        self.overall_best
    }

    /// Current leader of this generation
    pub fn best_runner(&self) -> Option<&Runner> {
        self.stats.best_index.and_then(|index| self.runners.get(index))
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    pub fn final_result(&self) -> Option<FinalResult> {
        self.final_result
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Step every unfinished runner once
    ///
    /// Returns a report when this frame finished the generation.
    pub fn advance_one_frame(&mut self, course: &mut Course) -> Option<GenerationReport> {
        if self.phase != Phase::Simulating {
            return None;
        }

        for runner in self.runners.iter_mut().filter(|r| !r.is_finished()) {
            runner.step(course.obstacles_mut(), &self.settings);
        }
        self.refresh_stats();

        if self.stats.running_count == 0 {
            self.evaluate_and_breed(course)
        } else {
            None
        }
    }

    /// End the generation now, as if every runner had finished
    pub fn force_advance(&mut self, course: &mut Course) -> Option<GenerationReport> {
        if self.phase != Phase::Simulating {
            return None;
        }
        for runner in &mut self.runners {
            runner.force_finish();
        }
        self.evaluate_and_breed(course)
    }

    /// Adopt a new course and physics mid-run and restart the current generation
    ///
    /// Evolution settings (population size, genome length, rates) are fixed
    /// for the lifetime of a population.
    pub fn reconfigure_course(&mut self, course: CourseSettings, physics: PhysicsSettings) {
        self.settings.course = course;
        self.settings.physics = physics;
        self.restart_generation();
    }

    /// Put every runner back on the start line without breeding
    pub fn restart_generation(&mut self) {
        if self.phase == Phase::Halted {
            return;
        }
        for runner in &mut self.runners {
            runner.reset_state(&self.settings.physics);
        }
        self.stats = GenerationStats::from_runners(&self.runners);
    }

    /// Evaluate the finished generation and produce the next one
    ///
    /// Returns None if a pass is already running or the run has halted.
    pub fn evaluate_and_breed(&mut self, course: &mut Course) -> Option<GenerationReport> {
        if self.phase != Phase::Simulating {
            return None;
        }
        self.phase = Phase::Breeding;

        self.refresh_stats();
        let summary = GenerationSummary::new(self.generation, course.level(), &self.stats);
        log::info!(
            "Gen {}: avg={:.1}, best={:.1}, crashed={}, completed={}, timed out={}",
            summary.generation,
            summary.average_distance,
            summary.best_distance,
            summary.dropout_count,
            summary.completed_count,
            summary.timed_out_count
        );

        let level_up = if self.stats.completed_count > 0 {
            self.level_best = BestRecord::default();
            Some(course.level_up())
        } else {
            None
        };

        if self.generation >= self.settings.evolution.max_generations {
            let result = FinalResult {
                level: course.level(),
                best_distance: self.overall_best.distance,
                best_generation: self.overall_best.generation,
                generations: self.generation,
            };
            log::info!(
                "Run finished after {} generations: best {:.1} (gen {}), level {}",
                result.generations,
                result.best_distance,
                result.best_generation,
                result.level
            );
            self.final_result = Some(result);
            self.phase = Phase::Halted;
            return Some(GenerationReport {
                summary,
                level_up,
                final_result: Some(result),
            });
        }

        self.breed();
        self.generation += 1;
        course.clear_hits();
        self.stats = GenerationStats::from_runners(&self.runners);
        self.phase = Phase::Simulating;

        Some(GenerationReport {
            summary,
            level_up,
            final_result: None,
        })
    }

    fn refresh_stats(&mut self) {
        self.stats = GenerationStats::from_runners(&self.runners);
        if self.stats.best_index.is_some() {
            self.level_best.offer(self.stats.best_distance, self.generation);
            self.overall_best.offer(self.stats.best_distance, self.generation);
        }
    }

    /// Runner indices ordered by descending distance (stable for ties)
    fn ranked_indices(&self) -> Vec<usize> {
        let mut ranked: Vec<usize> = (0..self.runners.len()).collect();
        ranked.sort_by(|&a, &b| self.runners[b].distance().total_cmp(&self.runners[a].distance()));
        ranked
    }

    fn breed(&mut self) {
        let size = self.settings.evolution.population_size;
        let physics = &self.settings.physics;
        let mutation_rate = self.settings.evolution.mutation_rate;

        let ranked = self.ranked_indices();
        let elite_count = self.settings.elite_count().min(ranked.len());

        let mut next: Vec<Runner> = Vec::with_capacity(size);
        for &index in &ranked[..elite_count] {
            next.push(self.runners[index].respawn(physics));
        }

        let weights: Vec<f32> = self
            .runners
            .iter()
            .map(|runner| selection_weight(runner.distance()))
            .collect();

        while next.len() < size {
            let (Some(a), Some(b)) = (
                roulette_select(&weights, &mut self.rng),
                roulette_select(&weights, &mut self.rng),
            ) else {
                break;
            };
            let mut child = crossover(self.runners[a].genome(), self.runners[b].genome(), &mut self.rng);
            child.mutate(mutation_rate, &mut self.rng);
            next.push(Runner::new(child, physics));
        }

        self.runners = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn settings(population: usize) -> SimulationSettings {
        let mut settings = SimulationSettings::default();
        settings.evolution.population_size = population;
        settings
    }

    fn course(settings: &SimulationSettings) -> Course {
        Course::new(
            settings.course.clone(),
            settings.physics.runner_radius,
            SimRng::seed_from_u64(1),
        )
    }

    /// Move every obstacle out of reach
    fn clear_path(course: &mut Course) {
        for obstacle in course.obstacles_mut() {
            obstacle.x = 1.0e6;
        }
    }

    #[test]
    fn test_roulette_skips_zero_weights() {
        let mut rng = SimRng::seed_from_u64(3);
        let weights = [0.0, 2.0, 0.0, 1.0, 0.0];
        for _ in 0..2000 {
            let picked = roulette_select(&weights, &mut rng).unwrap();
            assert!(picked == 1 || picked == 3);
        }
        assert_eq!(roulette_select(&[0.0, 0.0], &mut rng), None);
        assert_eq!(roulette_select(&[], &mut rng), None);
    }

    #[test]
    fn test_roulette_is_fitness_proportionate() {
        let mut rng = SimRng::seed_from_u64(4);
        let weights = [1.0, 3.0];
        let heavy = (0..10_000)
            .filter(|_| roulette_select(&weights, &mut rng) == Some(1))
            .count();
        // Expect ~7500
        assert!((7000..8000).contains(&heavy), "picked heavy {} times", heavy);
    }

    #[test]
    fn test_selection_weight_floor() {
        assert_eq!(selection_weight(0.0), 1.0);
        assert_eq!(selection_weight(-5.0), 1.0);
        assert_eq!(selection_weight(99.0), 100.0);
    }

    #[test]
    fn test_new_population() {
        let settings = settings(20);
        let population = Population::new(settings, SimRng::seed_from_u64(5));
        assert_eq!(population.len(), 20);
        assert_eq!(population.generation(), 1);
        assert_eq!(population.stats().running_count, 20);
        assert!(!population.is_halted());
    }

    #[test]
    fn test_force_advance_on_fresh_population() {
        let settings = settings(12);
        let mut course = course(&settings);
        let mut population = Population::new(settings, SimRng::seed_from_u64(6));

        let report = population.force_advance(&mut course).unwrap();
        let s = report.summary;
        assert_eq!(s.generation, 1);
        assert_eq!(s.dropout_count + s.completed_count + s.timed_out_count, 12);
        assert_eq!(s.timed_out_count, 12);
        assert_eq!(report.level_up, None);
        assert_eq!(population.generation(), 2);
        assert_eq!(population.len(), 12);
        assert_eq!(course.level(), 1);
    }

    #[test]
    fn test_elites_survive_unchanged() {
        let settings = settings(30);
        let elite_count = settings.elite_count();
        let mut course = course(&settings);
        let mut population = Population::new(settings, SimRng::seed_from_u64(7));

        // Short of the first obstacle, so distances differ only by pace
        for _ in 0..15 {
            population.advance_one_frame(&mut course);
        }
        let ranked = population.ranked_indices();
        let expected: Vec<Genome> = ranked[..elite_count]
            .iter()
            .map(|&i| population.runners()[i].genome().clone())
            .collect();

        population.force_advance(&mut course).unwrap();
        for (runner, genome) in population.runners().iter().zip(&expected) {
            assert_eq!(runner.genome(), genome);
            assert_eq!(runner.elapsed_frames(), 0);
            assert!(!runner.is_finished());
        }
        assert!(course.obstacles().iter().all(|o| !o.hit));
    }

    #[test]
    fn test_population_size_constant_and_genes_in_range() {
        let mut settings = settings(15);
        settings.evolution.mutation_rate = 0.9;
        let mut course = course(&settings);
        let mut population = Population::new(settings, SimRng::seed_from_u64(8));

        for _ in 0..25 {
            for _ in 0..30 {
                population.advance_one_frame(&mut course);
            }
            population.force_advance(&mut course);
            assert_eq!(population.len(), 15);
            for runner in population.runners() {
                assert!(runner.genome().genes().iter().all(|g| (0.0..=1.0).contains(g)));
            }
        }
    }

    #[test]
    fn test_natural_generation_end() {
        let mut settings = settings(6);
        settings.evolution.genome_length = 3;
        settings.evolution.gene_duration = 5;
        let mut course = course(&settings);
        clear_path(&mut course);
        let mut population = Population::new(settings, SimRng::seed_from_u64(9));

        for _ in 0..14 {
            assert!(population.advance_one_frame(&mut course).is_none());
        }
        let report = population.advance_one_frame(&mut course).unwrap();
        assert_eq!(report.summary.timed_out_count, 6);
        assert_eq!(population.generation(), 2);
    }

    #[test]
    fn test_finisher_triggers_level_up() {
        let mut settings = settings(5);
        settings.course.length = 400.0;
        let genomes = vec![Genome::constant(60, 0.5); 5];
        let mut course = course(&settings);
        clear_path(&mut course);
        let mut population = Population::from_genomes(settings, genomes, SimRng::seed_from_u64(10));

        let mut report = None;
        for _ in 0..200 {
            if let Some(r) = population.advance_one_frame(&mut course) {
                report = Some(r);
                break;
            }
        }
        let report = report.unwrap();
        assert_eq!(report.summary.completed_count, 5);
        assert_eq!(report.summary.best_distance, 400.0);
        assert_eq!(report.level_up, Some(2));
        assert_eq!(course.level(), 2);
        // Level-scoped tracker restarts, overall best keeps the record
        assert_eq!(population.level_best(), BestRecord::default());
        assert_eq!(population.overall_best().distance, 400.0);
        assert_eq!(population.overall_best().generation, 1);

        let events = report.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], SimEvent::LevelUp { level: 2, generation: 1 }));
    }

    #[test]
    fn test_no_level_up_without_finishers() {
        let settings = settings(8);
        let mut course = course(&settings);
        let mut population = Population::new(settings, SimRng::seed_from_u64(11));
        for _ in 0..5 {
            let report = population.force_advance(&mut course).unwrap();
            assert_eq!(report.level_up, None);
        }
        assert_eq!(course.level(), 1);
    }

    #[test]
    fn test_halts_at_max_generations() {
        let mut settings = settings(6);
        settings.evolution.max_generations = 2;
        let mut course = course(&settings);
        let mut population = Population::new(settings, SimRng::seed_from_u64(12));

        assert!(population.force_advance(&mut course).unwrap().final_result.is_none());
        let report = population.force_advance(&mut course).unwrap();
        let result = report.final_result.unwrap();
        assert_eq!(result.generations, 2);
        assert_eq!(result.level, 1);
        assert!(population.is_halted());
        assert_eq!(population.final_result(), Some(result));
        assert!(matches!(report.events().last(), Some(SimEvent::RunFinished(_))));

        // Terminal: nothing moves any more
        assert!(population.advance_one_frame(&mut course).is_none());
        assert!(population.force_advance(&mut course).is_none());
        assert_eq!(population.generation(), 2);
    }

    #[test]
    fn test_restart_generation_resets_runners() {
        let settings = settings(6);
        let mut course = course(&settings);
        let mut population = Population::new(settings, SimRng::seed_from_u64(13));
        for _ in 0..10 {
            population.advance_one_frame(&mut course);
        }
        population.restart_generation();
        assert!(population.runners().iter().all(|r| r.elapsed_frames() == 0));
        assert_eq!(population.stats().running_count, 6);
        assert_eq!(population.generation(), 1);
    }

    #[test]
    fn test_reconfigure_course_keeps_evolution_settings() {
        let settings = settings(6);
        let evolution = settings.evolution.clone();
        let mut course = course(&settings);
        let mut population = Population::new(settings, SimRng::seed_from_u64(15));
        for _ in 0..10 {
            population.advance_one_frame(&mut course);
        }

        let mut physics = population.settings().physics.clone();
        physics.start_x = 60.0;
        let course_settings = CourseSettings {
            length: 1500.0,
            ..CourseSettings::default()
        };
        population.reconfigure_course(course_settings, physics);

        assert_eq!(population.settings().evolution, evolution);
        assert_eq!(population.settings().course.length, 1500.0);
        assert!(population
            .runners()
            .iter()
            .all(|r| r.elapsed_frames() == 0 && r.position().x == 60.0));
        assert!(population
            .runners()
            .iter()
            .all(|r| r.genome().len() == evolution.genome_length));
    }

    #[test]
    fn test_generation_only_flips_hit_flags() {
        let settings = settings(20);
        let mut course = course(&settings);
        let layout: Vec<(f32, f32, f32)> = course
            .obstacles()
            .iter()
            .map(|o| (o.x, o.width, o.height))
            .collect();
        let mut population = Population::new(settings, SimRng::seed_from_u64(16));

        let mut report = None;
        while report.is_none() {
            report = population.advance_one_frame(&mut course);
        }
        // No finisher means no level-up, so the same layout is still in place
        if report.and_then(|r| r.level_up).is_none() {
            let after: Vec<(f32, f32, f32)> = course
                .obstacles()
                .iter()
                .map(|o| (o.x, o.width, o.height))
                .collect();
            assert_eq!(after, layout);
        }
    }

    #[test]
    fn test_best_runner_is_index_into_runners() {
        let settings = settings(10);
        let mut course = course(&settings);
        let mut population = Population::new(settings, SimRng::seed_from_u64(14));
        for _ in 0..20 {
            population.advance_one_frame(&mut course);
        }
        let best = population.best_runner().unwrap();
        assert_eq!(best.distance(), population.stats().best_distance);
        assert!(population
            .runners()
            .iter()
            .all(|r| r.distance() <= best.distance()));
    }
}
