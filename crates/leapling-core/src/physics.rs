//! Kinematic helpers shared by runners
//!
//! No physics engine: runners are circles integrated once per frame and
//! obstacles are static rectangles resting on the ground.

use glam::Vec2;

use crate::obstacle::Obstacle;

/// Tolerance for "standing on the ground"
pub const GROUND_EPSILON: f32 = 0.5;

/// Axis-aligned rectangle (min = top-left, max = bottom-right)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Rectangle occupied by an obstacle standing on `ground_y`
    pub fn from_obstacle(obstacle: &Obstacle, ground_y: f32) -> Self {
        Self {
            min: Vec2::new(obstacle.x, obstacle.top(ground_y)),
            max: Vec2::new(obstacle.right(), ground_y),
        }
    }
}

/// Closest-point circle/rectangle test (touching counts as a hit)
pub fn circle_hits_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = center.clamp(rect.min, rect.max);
    center.distance_squared(closest) <= radius * radius
}

/// Whether a circle center at `y` rests on the ground line `rest_y`
pub fn is_grounded(y: f32, rest_y: f32) -> bool {
    (y - rest_y).abs() <= GROUND_EPSILON
}

/// Index of the first obstacle a circle overlaps
pub fn first_collision(
    center: Vec2,
    radius: f32,
    obstacles: &[Obstacle],
    ground_y: f32,
) -> Option<usize> {
    obstacles
        .iter()
        .position(|obstacle| circle_hits_rect(center, radius, &Rect::from_obstacle(obstacle, ground_y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Rect {
        Rect {
            min: Vec2::new(100.0, 260.0),
            max: Vec2::new(115.0, 300.0),
        }
    }

    #[test]
    fn test_circle_inside_rect() {
        assert!(circle_hits_rect(Vec2::new(105.0, 280.0), 10.0, &rect()));
    }

    #[test]
    fn test_circle_beside_rect() {
        // Left of the rectangle, touching exactly
        assert!(circle_hits_rect(Vec2::new(90.0, 290.0), 10.0, &rect()));
        // Just out of reach
        assert!(!circle_hits_rect(Vec2::new(89.0, 290.0), 10.0, &rect()));
    }

    #[test]
    fn test_circle_near_corner() {
        // Diagonal to the top-left corner: distance sqrt(50) < 10
        assert!(circle_hits_rect(Vec2::new(95.0, 255.0), 10.0, &rect()));
        // Diagonal distance sqrt(128) > 10
        assert!(!circle_hits_rect(Vec2::new(92.0, 252.0), 10.0, &rect()));
    }

    #[test]
    fn test_circle_above_rect() {
        assert!(!circle_hits_rect(Vec2::new(107.0, 240.0), 10.0, &rect()));
        assert!(circle_hits_rect(Vec2::new(107.0, 251.0), 10.0, &rect()));
    }

    #[test]
    fn test_is_grounded() {
        assert!(is_grounded(290.0, 290.0));
        assert!(is_grounded(289.7, 290.0));
        assert!(!is_grounded(285.0, 290.0));
    }

    #[test]
    fn test_first_collision_returns_first_match() {
        let obstacles = vec![
            Obstacle::new(0, 100.0, 15.0, 40.0),
            Obstacle::new(1, 108.0, 15.0, 40.0),
        ];
        let hit = first_collision(Vec2::new(110.0, 290.0), 10.0, &obstacles, 300.0);
        assert_eq!(hit, Some(0));
        assert_eq!(first_collision(Vec2::new(10.0, 290.0), 10.0, &obstacles, 300.0), None);
    }
}
