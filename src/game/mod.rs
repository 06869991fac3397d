//! Authoritative arena state and the rules that mutate it

pub mod arena;
pub mod combat;
pub mod geometry;
pub mod player;
pub mod registry;
pub mod relay;
pub mod session;
pub mod spawn;

pub use arena::Arena;
pub use player::{Player, PlayerId};

/// Reasons an inbound message is dropped.
///
/// None of these are reported to the client; they are expected in normal
/// play and only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("connection has not registered a name")]
    NotRegistered,

    #[error("no such player")]
    UnknownPlayer,

    #[error("connection already registered")]
    AlreadyRegistered,

    #[error("player is inactive")]
    Inactive,

    #[error("target is invulnerable")]
    Invulnerable,

    #[error("player is out of lives")]
    GameOver,

    #[error("malformed payload: {0}")]
    Malformed(&'static str),
}
