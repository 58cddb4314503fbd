//! Host side of leapling: configuration loading and headless training

pub mod config;
pub mod headless;

pub use config::{AppConfig, RunConfig};
pub use headless::{Trainer, TrainingReport};
