//! World-space vectors and distance helpers

use serde::{Deserialize, Serialize};

/// A point or orientation in world space.
///
/// Positions use the client's world units with `y` pointing up. Rotations
/// are stored in the same shape but are never interpreted by the server.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Distance on the ground plane (x/z), ignoring height
    pub fn horizontal_distance(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

/// Smallest horizontal distance from `point` to any of `others`.
/// Returns `f64::INFINITY` when there is nobody to compare against.
pub fn min_horizontal_distance(point: &Vec3, others: &[Vec3]) -> f64 {
    others
        .iter()
        .map(|other| point.horizontal_distance(other))
        .fold(f64::INFINITY, f64::min)
}
