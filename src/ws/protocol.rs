//! WebSocket protocol message definitions
//! These are the wire types for client-server communication.
//!
//! Every frame is a JSON object `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::game::geometry::Vec3;
use crate::game::PlayerId;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Register a display name; nothing else is accepted before this
    PlayerName(String),

    /// Latest position and orientation of the sender
    PlayerMovement(MovementPayload),

    /// Sender fired a projectile
    PlayerShoot(ShootPayload),

    /// Sender's client detected a projectile hit
    PlayerHit(HitPayload),

    /// Client went idle (tab hidden, pointer unlocked)
    PlayerInactive,

    /// Client wants a fresh snapshot and resumes relaying
    RequestSync,

    /// Client finished its death screen and wants a spawn point
    RequestRespawn,
}

impl ClientMsg {
    /// Logical event name, for logging
    pub fn name(&self) -> &'static str {
        match self {
            ClientMsg::PlayerName(_) => "playerName",
            ClientMsg::PlayerMovement(_) => "playerMovement",
            ClientMsg::PlayerShoot(_) => "playerShoot",
            ClientMsg::PlayerHit(_) => "playerHit",
            ClientMsg::PlayerInactive => "playerInactive",
            ClientMsg::RequestSync => "requestSync",
            ClientMsg::RequestRespawn => "requestRespawn",
        }
    }
}

/// Movement update. Either field may be absent or malformed, in which case
/// it is `None` and the session decides what to keep.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovementPayload {
    #[serde(default, deserialize_with = "lenient_vec3")]
    pub position: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient_vec3")]
    pub rotation: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShootPayload {
    #[serde(default, deserialize_with = "lenient_vec3")]
    pub origin: Option<Vec3>,
    #[serde(default, deserialize_with = "lenient_vec3")]
    pub direction: Option<Vec3>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitPayload {
    pub hit_player_id: PlayerId,
    pub damage: f64,
}

/// Vector shapes clients are known to send
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireVec3 {
    /// `{x, y, z}`, or three.js Euler internals `{_x, _y, _z, _order}`
    Named {
        #[serde(alias = "_x")]
        x: f64,
        #[serde(alias = "_y")]
        y: f64,
        #[serde(alias = "_z")]
        z: f64,
    },
    /// `[x, y, z]`
    Ordered([f64; 3]),
}

impl From<WireVec3> for Vec3 {
    fn from(wire: WireVec3) -> Self {
        match wire {
            WireVec3::Named { x, y, z } => Vec3::new(x, y, z),
            WireVec3::Ordered(xyz) => Vec3::from(xyz),
        }
    }
}

/// Accept any vector shape, mapping anything unrecognised to `None`
/// instead of failing the whole message.
fn lenient_vec3<'de, D>(deserializer: D) -> Result<Option<Vec3>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<WireVec3>(value)
        .ok()
        .map(Vec3::from)
        .filter(Vec3::is_finite))
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Sent once on connect so the client can recognise itself
    Welcome(Welcome),

    /// Every registered player, unicast on join and on sync
    CurrentPlayers(Vec<PlayerInfo>),

    PlayerJoined(PlayerInfo),

    PlayerLeft(PlayerId),

    PlayerMoved(PlayerMoved),

    PlayerShot(PlayerShot),

    PlayerHealthUpdate(HealthUpdate),

    /// A player died and was respawned in the same transaction
    PlayerDied(PlayerDied),

    /// Player ran out of lives
    GameOver(PlayerId),

    /// Reply to `requestRespawn`
    RespawnPosition(RespawnPosition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Welcome {
    pub id: PlayerId,
    pub server_time: u64,
}

/// Player record as clients see it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub health: i32,
    pub lives: u32,
    pub inactive: bool,
    pub invulnerable: bool,
    pub invulnerable_until: u64,
    pub last_activity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMoved {
    pub id: PlayerId,
    pub position: Vec3,
    pub rotation: Vec3,
    pub health: i32,
    pub name: String,
    pub inactive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerShot {
    pub player_id: PlayerId,
    pub origin: [f64; 3],
    pub direction: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthUpdate {
    pub id: PlayerId,
    pub name: String,
    pub health: i32,
    pub lives: u32,
    pub damage: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDied {
    pub player_id: PlayerId,
    pub lives_left: u32,
    pub new_position: Vec3,
    pub new_health: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RespawnPosition {
    pub position: Vec3,
    pub lives: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn parse(value: serde_json::Value) -> ClientMsg {
        serde_json::from_value(value).expect("client message should parse")
    }

    #[test]
    fn parses_player_name() {
        let msg = parse(json!({"event": "playerName", "data": "  Dallas "}));
        assert_eq!(msg, ClientMsg::PlayerName("  Dallas ".to_string()));
    }

    #[test]
    fn parses_events_without_data() {
        assert_eq!(parse(json!({"event": "playerInactive"})), ClientMsg::PlayerInactive);
        assert_eq!(parse(json!({"event": "requestSync"})), ClientMsg::RequestSync);
        assert_eq!(parse(json!({"event": "requestRespawn"})), ClientMsg::RequestRespawn);
    }

    #[test]
    fn movement_accepts_objects_and_arrays() {
        let msg = parse(json!({
            "event": "playerMovement",
            "data": {"position": {"x": 1, "y": 2, "z": 3}, "rotation": [0.1, 0.2, 0.3]}
        }));
        let ClientMsg::PlayerMovement(payload) = msg else {
            panic!("expected movement");
        };
        assert_eq!(payload.position, Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(payload.rotation, Some(Vec3::new(0.1, 0.2, 0.3)));
    }

    #[test]
    fn movement_accepts_euler_internals() {
        let msg = parse(json!({
            "event": "playerMovement",
            "data": {
                "position": [4, 2, -4],
                "rotation": {"isEuler": true, "_x": 0.5, "_y": 1.0, "_z": 0.0, "_order": "YXZ"}
            }
        }));
        let ClientMsg::PlayerMovement(payload) = msg else {
            panic!("expected movement");
        };
        assert_eq!(payload.rotation, Some(Vec3::new(0.5, 1.0, 0.0)));
    }

    #[test]
    fn malformed_vectors_become_none() {
        let msg = parse(json!({
            "event": "playerMovement",
            "data": {"position": {"x": 1, "y": "two"}, "rotation": [1, 2]}
        }));
        let ClientMsg::PlayerMovement(payload) = msg else {
            panic!("expected movement");
        };
        assert_eq!(payload.position, None);
        assert_eq!(payload.rotation, None);

        let msg = parse(json!({"event": "playerMovement", "data": {}}));
        assert_eq!(
            msg,
            ClientMsg::PlayerMovement(MovementPayload {
                position: None,
                rotation: None
            })
        );
    }

    #[test]
    fn parses_hit_report() {
        let target = Uuid::new_v4();
        let msg = parse(json!({
            "event": "playerHit",
            "data": {"hitPlayerId": target, "damage": 25}
        }));
        assert_eq!(
            msg,
            ClientMsg::PlayerHit(HitPayload {
                hit_player_id: target,
                damage: 25.0
            })
        );
    }

    #[test]
    fn unknown_event_is_an_error() {
        let result = serde_json::from_value::<ClientMsg>(json!({"event": "teleport", "data": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn server_events_use_logical_names() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(ServerMsg::PlayerDied(PlayerDied {
            player_id: id,
            lives_left: 2,
            new_position: Vec3::new(70.0, 2.0, 70.0),
            new_health: 100,
        }))
        .unwrap();
        assert_eq!(json["event"], "playerDied");
        assert_eq!(json["data"]["livesLeft"], 2);
        assert_eq!(json["data"]["newHealth"], 100);
        assert_eq!(json["data"]["newPosition"]["x"], 70.0);

        let json = serde_json::to_value(ServerMsg::GameOver(id)).unwrap();
        assert_eq!(json["event"], "gameOver");
        assert_eq!(json["data"], id.to_string());

        let json = serde_json::to_value(ServerMsg::PlayerShot(PlayerShot {
            player_id: id,
            origin: [1.0, 2.0, 3.0],
            direction: [0.0, 0.0, -1.0],
        }))
        .unwrap();
        assert_eq!(json["data"]["playerId"], id.to_string());
        assert_eq!(json["data"]["origin"], json!([1.0, 2.0, 3.0]));
    }
}
