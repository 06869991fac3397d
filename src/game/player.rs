//! Authoritative player record

use uuid::Uuid;

use crate::util::time::has_elapsed;
use crate::ws::protocol::PlayerInfo;

use super::geometry::Vec3;

/// Connection-scoped player identifier
pub type PlayerId = Uuid;

/// Health on spawn and respawn
pub const MAX_HEALTH: i32 = 100;
/// Lives granted on registration
pub const STARTING_LIVES: u32 = 3;
/// Post-spawn grace window during which damage is ignored
pub const INVULNERABILITY_MS: u64 = 3_000;
/// Longest display name kept after sanitizing, in characters
pub const MAX_NAME_LEN: usize = 15;

/// Combat state of a player.
///
/// `Invulnerable` decays into `Alive` lazily: nothing fires when the
/// deadline passes, callers observe it through [`Player::settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Alive,
    Invulnerable { until: u64 },
    GameOver,
}

/// Whether the client is currently driving its avatar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    #[default]
    Active,
    /// Client reported it went idle; its stale position is not relayed
    Inactive,
}

/// Player state (authoritative)
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,

    pub position: Vec3,
    pub rotation: Vec3,

    /// Always within `0..=MAX_HEALTH`
    pub health: i32,
    pub lives: u32,
    pub life: LifeState,
    pub presence: Presence,

    /// Start of the most recent spawn, never moves backwards
    pub spawned_at: u64,
    pub last_activity: u64,

    /// Registration order, used to keep snapshots stable
    pub(crate) join_seq: u64,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, spawn: Vec3, now: u64) -> Self {
        Self {
            id,
            name: sanitize_name(name),
            position: spawn,
            rotation: Vec3::ZERO,
            health: MAX_HEALTH,
            lives: STARTING_LIVES,
            life: LifeState::Invulnerable {
                until: now + INVULNERABILITY_MS,
            },
            presence: Presence::Active,
            spawned_at: now,
            last_activity: now,
            join_seq: 0,
        }
    }

    /// Resolve an expired invulnerability window into `Alive`
    pub fn settle(&mut self, now: u64) -> LifeState {
        if let LifeState::Invulnerable { until } = self.life {
            if has_elapsed(until, now) {
                self.life = LifeState::Alive;
            }
        }
        self.life
    }

    pub fn is_invulnerable(&self, now: u64) -> bool {
        matches!(self.life, LifeState::Invulnerable { until } if !has_elapsed(until, now))
    }

    pub fn is_game_over(&self) -> bool {
        self.life == LifeState::GameOver
    }

    pub fn is_inactive(&self) -> bool {
        self.presence == Presence::Inactive
    }

    /// Deadline of the latest spawn protection window
    pub fn invulnerable_until(&self) -> u64 {
        self.spawned_at + INVULNERABILITY_MS
    }

    /// Put the player at `position` with full health and a fresh
    /// invulnerability window. Lives are left untouched.
    pub fn respawn(&mut self, position: Vec3, now: u64) {
        let now = now.max(self.spawned_at);
        self.position = position;
        self.health = MAX_HEALTH;
        self.spawned_at = now;
        self.life = LifeState::Invulnerable {
            until: now + INVULNERABILITY_MS,
        };
    }

    /// Wire representation of this player
    pub fn info(&self, now: u64) -> PlayerInfo {
        PlayerInfo {
            id: self.id,
            name: self.name.clone(),
            position: self.position,
            rotation: self.rotation,
            health: self.health,
            lives: self.lives,
            inactive: self.is_inactive(),
            invulnerable: self.is_invulnerable(now),
            invulnerable_until: self.invulnerable_until(),
            last_activity: self.last_activity,
        }
    }
}

/// Trim surrounding whitespace and cap the name at [`MAX_NAME_LEN`] characters
pub fn sanitize_name(raw: &str) -> String {
    raw.trim().chars().take(MAX_NAME_LEN).collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_trims_and_truncates() {
        assert_eq!(sanitize_name("  Ripley  "), "Ripley");
        assert_eq!(sanitize_name("abcdefghijklmnopqrstuvwxyz"), "abcdefghijklmno");
        assert_eq!(sanitize_name("   "), "");
    }

    #[test]
    fn sanitize_counts_characters_not_bytes() {
        let name = "ääääääääääääääääää";
        assert_eq!(sanitize_name(name).chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn new_player_starts_protected() {
        let player = Player::new(Uuid::new_v4(), "Vasquez", Vec3::ZERO, 1_000);
        assert_eq!(player.health, MAX_HEALTH);
        assert_eq!(player.lives, STARTING_LIVES);
        assert!(player.is_invulnerable(1_000));
        assert!(player.is_invulnerable(3_999));
        assert!(!player.is_invulnerable(4_000));
        assert_eq!(player.invulnerable_until(), 4_000);
    }

    #[test]
    fn settle_expires_invulnerability_lazily() {
        let mut player = Player::new(Uuid::new_v4(), "Hicks", Vec3::ZERO, 0);
        assert_eq!(player.settle(2_999), LifeState::Invulnerable { until: 3_000 });
        assert_eq!(player.settle(3_000), LifeState::Alive);
    }

    #[test]
    fn respawn_never_moves_window_backwards() {
        let mut player = Player::new(Uuid::new_v4(), "Bishop", Vec3::ZERO, 10_000);
        player.respawn(Vec3::new(1.0, 2.0, 3.0), 5_000);
        assert_eq!(player.spawned_at, 10_000);
        assert_eq!(player.invulnerable_until(), 13_000);
    }

    #[test]
    fn info_reports_camel_case_fields() {
        let player = Player::new(Uuid::new_v4(), "Newt", Vec3::new(1.0, 2.0, 3.0), 0);
        let json = serde_json::to_value(player.info(0)).unwrap();
        assert_eq!(json["invulnerable"], true);
        assert_eq!(json["invulnerableUntil"], 3_000);
        assert_eq!(json["lastActivity"], 0);
        assert_eq!(json["position"]["y"], 2.0);
    }
}
