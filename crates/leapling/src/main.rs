use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use leapling::config::AppConfig;
use leapling::headless::Trainer;
use leapling_core::ObstacleMode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON configuration file (default: ./leapling.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of generations to evolve
    #[arg(long)]
    generations: Option<u32>,

    /// Runners per generation
    #[arg(long)]
    population: Option<usize>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Course length in pixels
    #[arg(long)]
    course_length: Option<f32>,

    /// Obstacle layout: random or manual
    #[arg(long)]
    obstacles: Option<ObstacleMode>,

    /// Manual obstacles, e.g. "150:1.2, 320:1.8, 600" (implies --obstacles manual)
    #[arg(long)]
    manual: Option<String>,

    /// Simulation frames per tick
    #[arg(long)]
    steps_per_tick: Option<u32>,

    /// Stop after this many ticks
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,

    /// Print the effective configuration as RON and exit
    #[arg(long)]
    dump_config: bool,
}

impl Args {
    /// Command-line flags win over every configuration layer
    fn apply_overrides(&self, config: &mut AppConfig) {
        let sim = &mut config.simulation;
        if let Some(generations) = self.generations {
            sim.evolution.max_generations = generations;
        }
        if let Some(population) = self.population {
            sim.evolution.population_size = population;
        }
        if let Some(seed) = self.seed {
            sim.evolution.seed = Some(seed);
        }
        if let Some(length) = self.course_length {
            sim.course.length = length;
        }
        if let Some(spec) = &self.manual {
            sim.course.manual_spec = spec.clone();
            sim.course.mode = ObstacleMode::Manual;
        }
        if let Some(mode) = self.obstacles {
            sim.course.mode = mode;
        }
        if let Some(steps) = self.steps_per_tick {
            config.run.steps_per_tick = steps;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.run.max_ticks = Some(max_ticks);
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    let config = config.sanitize();

    if args.dump_config {
        println!("{}", config.to_ron()?);
        return Ok(());
    }

    log::info!("Starting leapling training");
    log::info!("  Generations: {}", config.simulation.evolution.max_generations);
    log::info!("  Population: {}", config.simulation.evolution.population_size);
    log::info!("  Obstacles: {:?}", config.simulation.course.mode);
    log::info!("  Steps per tick: {}", config.run.steps_per_tick);

    let mut trainer = Trainer::new(config.simulation, config.run);
    if !args.quiet && !args.json {
        trainer = trainer.with_progress()?;
    }
    let report = trainer.run();

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
