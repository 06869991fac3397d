//! Session lifecycle - connect, naming, movement, idling and disconnect

use tokio::sync::mpsc;
use tracing::info;

use crate::ws::protocol::{MovementPayload, PlayerInfo, PlayerMoved, ServerMsg, Welcome};

use super::arena::Arena;
use super::player::{Player, PlayerId, Presence};
use super::spawn::allocate_spawn;
use super::Rejection;

impl Arena {
    /// Open a connection. No player exists until it sends `playerName`.
    pub fn connect(&self, id: PlayerId, now: u64) -> mpsc::Receiver<ServerMsg> {
        let rx = self.relay.register(id);
        self.relay.unicast(
            &id,
            ServerMsg::Welcome(Welcome {
                id,
                server_time: now,
            }),
        );
        rx
    }

    /// Drop the connection and its player, if it had one
    pub fn disconnect(&self, id: PlayerId) {
        self.relay.unregister(&id);

        if let Some(player) = self.registry.remove(&id) {
            info!(
                player_id = %id,
                name = %player.name,
                player_count = self.registry.len(),
                "Player left"
            );
            self.relay.broadcast(ServerMsg::PlayerLeft(id));
        }
    }

    /// Every registered player as sent in `currentPlayers`
    pub fn snapshot_infos(&self, now: u64) -> Vec<PlayerInfo> {
        self.registry
            .snapshot()
            .iter()
            .map(|p| p.info(now))
            .collect()
    }

    pub(crate) fn handle_name(&self, id: PlayerId, raw_name: &str, now: u64) -> Result<(), Rejection> {
        if self.registry.contains(&id) {
            return Err(Rejection::AlreadyRegistered);
        }

        let spawn = allocate_spawn(&self.registry.positions());
        let player = Player::new(id, raw_name, spawn, now);
        let joined = player.info(now);

        if !self.registry.insert(player) {
            return Err(Rejection::AlreadyRegistered);
        }

        info!(
            player_id = %id,
            name = %joined.name,
            x = spawn.x,
            z = spawn.z,
            player_count = self.registry.len(),
            "Player joined"
        );

        self.relay
            .unicast(&id, ServerMsg::CurrentPlayers(self.snapshot_infos(now)));
        self.relay
            .broadcast_except(&id, ServerMsg::PlayerJoined(joined));
        Ok(())
    }

    pub(crate) fn handle_movement(
        &self,
        id: PlayerId,
        payload: MovementPayload,
        now: u64,
    ) -> Result<(), Rejection> {
        self.registry
            .update(&id, |player| -> Result<(), Rejection> {
                if player.is_inactive() {
                    return Err(Rejection::Inactive);
                }
                let position = payload.position.ok_or(Rejection::Malformed("position"))?;

                player.position = position;
                if let Some(rotation) = payload.rotation {
                    player.rotation = rotation;
                }
                player.last_activity = now;

                self.relay.broadcast_except(
                    &id,
                    ServerMsg::PlayerMoved(PlayerMoved {
                        id,
                        position: player.position,
                        rotation: player.rotation,
                        health: player.health,
                        name: player.name.clone(),
                        inactive: player.is_inactive(),
                    }),
                );
                Ok(())
            })
            .ok_or(Rejection::UnknownPlayer)?
    }

    pub(crate) fn handle_inactive(&self, id: PlayerId) -> Result<(), Rejection> {
        self.registry
            .update(&id, |player| player.presence = Presence::Inactive)
            .ok_or(Rejection::UnknownPlayer)
    }

    pub(crate) fn handle_sync(&self, id: PlayerId, now: u64) -> Result<(), Rejection> {
        self.registry
            .update(&id, |player| player.presence = Presence::Active)
            .ok_or(Rejection::UnknownPlayer)?;

        self.relay
            .unicast(&id, ServerMsg::CurrentPlayers(self.snapshot_infos(now)));
        Ok(())
    }
}
