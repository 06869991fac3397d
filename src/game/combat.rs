//! Combat resolution - damage, invulnerability, lives and respawn

use super::geometry::Vec3;
use super::player::{LifeState, Player, MAX_HEALTH};
use super::Rejection;

/// Result of a hit that was applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Target survived
    Damaged { health: i32, lives: u32 },
    /// Target died and was respawned within the same transaction
    Respawned { lives_left: u32, position: Vec3 },
    /// Target died on its last life
    GameOver,
}

impl HitOutcome {
    /// Health to announce right after the hit
    pub fn reported_health(&self) -> i32 {
        match self {
            HitOutcome::Damaged { health, .. } => *health,
            HitOutcome::Respawned { .. } | HitOutcome::GameOver => 0,
        }
    }
}

/// Combat rules for a single player entity.
///
/// Every function here mutates exactly one [`Player`] and expects the
/// caller to hold that entity exclusively for the whole call.
pub struct CombatResolver;

impl CombatResolver {
    /// Convert a client-reported damage value into whole hit points
    pub fn validate_damage(raw: f64) -> Result<i32, Rejection> {
        if !raw.is_finite() || raw <= 0.0 {
            return Err(Rejection::Malformed("damage must be a positive number"));
        }
        let damage = raw.round().min(i32::MAX as f64) as i32;
        if damage == 0 {
            return Err(Rejection::Malformed("damage rounds to zero"));
        }
        Ok(damage)
    }

    /// Apply `damage` to `target` at time `now`.
    ///
    /// `respawn_at` is only used when the hit is lethal and the target
    /// still has lives left; it must be allocated from a position snapshot
    /// taken before the target was locked.
    pub fn apply_hit(
        target: &mut Player,
        damage: i32,
        now: u64,
        respawn_at: Vec3,
    ) -> Result<HitOutcome, Rejection> {
        match target.settle(now) {
            LifeState::GameOver => return Err(Rejection::GameOver),
            LifeState::Invulnerable { .. } => return Err(Rejection::Invulnerable),
            LifeState::Alive => {}
        }

        let remaining = i64::from(target.health) - i64::from(damage);
        if remaining > 0 {
            target.health = remaining.min(i64::from(MAX_HEALTH)) as i32;
            return Ok(HitOutcome::Damaged {
                health: target.health,
                lives: target.lives,
            });
        }

        target.lives = target.lives.saturating_sub(1);

        if target.lives == 0 {
            target.health = 0;
            target.life = LifeState::GameOver;
            return Ok(HitOutcome::GameOver);
        }

        target.respawn(respawn_at, now);
        Ok(HitOutcome::Respawned {
            lives_left: target.lives,
            position: target.position,
        })
    }

    /// Client-requested respawn. Costs no life, refused after game over.
    pub fn request_respawn(player: &mut Player, now: u64, position: Vec3) -> Result<(), Rejection> {
        if player.is_game_over() || player.lives == 0 {
            return Err(Rejection::GameOver);
        }
        player.respawn(position, now);
        Ok(())
    }
}
