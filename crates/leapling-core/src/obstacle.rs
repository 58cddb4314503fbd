//! Hurdles placed along the course

use serde::{Deserialize, Serialize};

/// Axis-aligned hurdle standing on the ground
///
/// Only `hit` changes during a generation; positions are fixed until the
/// whole set is regenerated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Left edge along the course
    pub x: f32,
    pub width: f32,
    pub height: f32,
    /// Set by the first runner that collides with it
    pub hit: bool,
}

impl Obstacle {
    pub fn new(id: u32, x: f32, width: f32, height: f32) -> Self {
        Self {
            id,
            x,
            width,
            height,
            hit: false,
        }
    }

    /// Right edge along the course
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge y for a given ground line (y grows downward)
    pub fn top(&self, ground_y: f32) -> f32 {
        ground_y - self.height
    }
}
