//! Spawn point allocation

use rand::seq::SliceRandom;
use rand::Rng;

use super::geometry::{min_horizontal_distance, Vec3};

/// Minimum ground-plane distance between a fresh spawn and any player
pub const MIN_SPAWN_DISTANCE: f64 = 20.0;

/// Fixed candidate spawn locations around the arena
pub const SPAWN_POINTS: [Vec3; 12] = [
    Vec3::new(-70.0, 2.0, -70.0),
    Vec3::new(70.0, 2.0, -70.0),
    Vec3::new(-70.0, 2.0, 70.0),
    Vec3::new(70.0, 2.0, 70.0),
    Vec3::new(0.0, 2.0, -50.0),
    Vec3::new(0.0, 2.0, 50.0),
    Vec3::new(-50.0, 2.0, 0.0),
    Vec3::new(50.0, 2.0, 0.0),
    Vec3::new(-35.0, 2.0, -35.0),
    Vec3::new(35.0, 2.0, 35.0),
    Vec3::new(-35.0, 2.0, 35.0),
    Vec3::new(35.0, 2.0, -35.0),
];

/// Is `candidate` at least [`MIN_SPAWN_DISTANCE`] from every occupied position
pub fn is_safe(candidate: &Vec3, occupied: &[Vec3]) -> bool {
    min_horizontal_distance(candidate, occupied) >= MIN_SPAWN_DISTANCE
}

/// Pick a spawn point away from the given player positions.
///
/// Candidates are scanned in shuffled order so two allocations made from
/// the same snapshot are unlikely to land on the same point. When nothing
/// is safe the first shuffled candidate is returned anyway.
pub fn find_safe_spawn<R: Rng + ?Sized>(occupied: &[Vec3], rng: &mut R) -> Vec3 {
    let mut candidates = SPAWN_POINTS;
    candidates.shuffle(rng);

    candidates
        .iter()
        .find(|candidate| is_safe(candidate, occupied))
        .copied()
        .unwrap_or(candidates[0])
}

/// [`find_safe_spawn`] with the thread-local RNG
pub fn allocate_spawn(occupied: &[Vec3]) -> Vec3 {
    find_safe_spawn(occupied, &mut rand::thread_rng())
}
