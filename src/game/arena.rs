//! Arena - routes client messages to the session and combat rules

use tracing::{debug, info};

use crate::util::time::unix_millis;
use crate::ws::protocol::{
    ClientMsg, HealthUpdate, HitPayload, PlayerDied, PlayerShot, RespawnPosition, ServerMsg,
    ShootPayload,
};

use super::combat::{CombatResolver, HitOutcome};
use super::player::{Player, PlayerId};
use super::registry::PlayerRegistry;
use super::relay::EventRelay;
use super::spawn::allocate_spawn;
use super::Rejection;

/// The authoritative arena: every connected player and every outbound queue.
///
/// Handlers run directly on the connection tasks. Anything that changes a
/// player is done inside a registry `update`, and the resulting events are
/// emitted before the entry is released so all clients see outcomes for a
/// given player in the same order.
pub struct Arena {
    pub registry: PlayerRegistry,
    pub relay: EventRelay,
}

impl Arena {
    pub fn new() -> Self {
        Self {
            registry: PlayerRegistry::new(),
            relay: EventRelay::new(),
        }
    }

    /// Handle one inbound message from `conn`
    pub fn dispatch(&self, conn: PlayerId, msg: ClientMsg) {
        self.dispatch_at(conn, msg, unix_millis());
    }

    /// [`Arena::dispatch`] with an explicit clock
    pub fn dispatch_at(&self, conn: PlayerId, msg: ClientMsg, now: u64) {
        let event = msg.name();
        let result = match msg {
            ClientMsg::PlayerName(name) => self.handle_name(conn, &name, now),
            ClientMsg::PlayerMovement(payload) => self.handle_movement(conn, payload, now),
            ClientMsg::PlayerShoot(payload) => self.handle_shoot(conn, payload),
            ClientMsg::PlayerHit(payload) => self.handle_hit(conn, payload, now),
            ClientMsg::PlayerInactive => self.handle_inactive(conn),
            ClientMsg::RequestSync => self.handle_sync(conn, now),
            ClientMsg::RequestRespawn => self.handle_respawn(conn, now),
        };

        if let Err(reason) = result {
            debug!(conn_id = %conn, event, %reason, "Dropped client message");
        }
    }

    /// Relay a shot to everyone else
    fn handle_shoot(&self, shooter: PlayerId, payload: ShootPayload) -> Result<(), Rejection> {
        if !self.registry.contains(&shooter) {
            return Err(Rejection::NotRegistered);
        }
        let origin = payload.origin.ok_or(Rejection::Malformed("shot origin"))?;
        let direction = payload.direction.ok_or(Rejection::Malformed("shot direction"))?;

        self.relay.broadcast_except(
            &shooter,
            ServerMsg::PlayerShot(PlayerShot {
                player_id: shooter,
                origin: origin.to_array(),
                direction: direction.to_array(),
            }),
        );
        Ok(())
    }

    /// Apply a client-reported hit
    fn handle_hit(&self, shooter: PlayerId, payload: HitPayload, now: u64) -> Result<(), Rejection> {
        if !self.registry.contains(&shooter) {
            return Err(Rejection::NotRegistered);
        }
        let damage = CombatResolver::validate_damage(payload.damage)?;
        let target_id = payload.hit_player_id;

        // Allocated up front: the registry cannot be scanned while the
        // target entry is locked. Unused unless the hit is lethal.
        let respawn_at = allocate_spawn(&self.registry.positions());

        self.registry
            .update(&target_id, |target| -> Result<(), Rejection> {
                let outcome = CombatResolver::apply_hit(target, damage, now, respawn_at)?;
                self.announce_hit(target, damage, &outcome);
                Ok(())
            })
            .ok_or(Rejection::UnknownPlayer)?
    }

    fn announce_hit(&self, target: &Player, damage: i32, outcome: &HitOutcome) {
        self.relay.broadcast(ServerMsg::PlayerHealthUpdate(HealthUpdate {
            id: target.id,
            name: target.name.clone(),
            health: outcome.reported_health(),
            lives: target.lives,
            damage,
        }));

        match *outcome {
            HitOutcome::Damaged { .. } => {}
            HitOutcome::Respawned {
                lives_left,
                position,
            } => {
                info!(player_id = %target.id, lives_left, "Player died and respawned");
                self.relay.broadcast(ServerMsg::PlayerDied(PlayerDied {
                    player_id: target.id,
                    lives_left,
                    new_position: position,
                    new_health: target.health,
                }));
            }
            HitOutcome::GameOver => {
                info!(player_id = %target.id, "Player is out of lives");
                self.relay.broadcast(ServerMsg::GameOver(target.id));
            }
        }
    }

    /// Manual respawn after the client's death screen
    fn handle_respawn(&self, id: PlayerId, now: u64) -> Result<(), Rejection> {
        let position = allocate_spawn(&self.registry.positions());

        self.registry
            .update(&id, |player| -> Result<(), Rejection> {
                CombatResolver::request_respawn(player, now, position)?;

                self.relay.unicast(
                    &id,
                    ServerMsg::RespawnPosition(RespawnPosition {
                        position: player.position,
                        lives: player.lives,
                    }),
                );
                self.relay.broadcast(ServerMsg::PlayerHealthUpdate(HealthUpdate {
                    id,
                    name: player.name.clone(),
                    health: player.health,
                    lives: player.lives,
                    damage: 0,
                }));
                Ok(())
            })
            .ok_or(Rejection::UnknownPlayer)?
    }

    pub fn player_count(&self) -> usize {
        self.registry.len()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
