//! Player registry - the single source of truth for connected players

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::geometry::Vec3;
use super::player::{Player, PlayerId};

/// Registry of all named players.
///
/// Each operation touches a single id and holds only that entry's lock, so
/// updates to one player are serialized without blocking the others.
pub struct PlayerRegistry {
    players: DashMap<PlayerId, Player>,
    next_join_seq: AtomicU64,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
            next_join_seq: AtomicU64::new(0),
        }
    }

    /// Insert a new player. Returns `false` if the id is already registered.
    pub fn insert(&self, mut player: Player) -> bool {
        match self.players.entry(player.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                player.join_seq = self.next_join_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(player);
                true
            }
        }
    }

    pub fn get(&self, id: &PlayerId) -> Option<Player> {
        self.players.get(id).map(|p| p.value().clone())
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    /// Run `f` with exclusive access to one player.
    ///
    /// `f` must not call back into the registry: the entry stays locked
    /// until it returns.
    pub fn update<F, R>(&self, id: &PlayerId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Player) -> R,
    {
        self.players.get_mut(id).map(|mut entry| f(entry.value_mut()))
    }

    pub fn remove(&self, id: &PlayerId) -> Option<Player> {
        self.players.remove(id).map(|(_, p)| p)
    }

    /// All players in registration order
    pub fn snapshot(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.iter().map(|p| p.value().clone()).collect();
        players.sort_by_key(|p| p.join_seq);
        players
    }

    /// Point-in-time positions of every player, for spawn allocation
    pub fn positions(&self) -> Vec<Vec3> {
        self.players.iter().map(|p| p.value().position).collect()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn player(name: &str) -> Player {
        Player::new(Uuid::new_v4(), name, Vec3::ZERO, 0)
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let registry = PlayerRegistry::new();
        let p = player("Ash");
        let id = p.id;
        assert!(registry.insert(p.clone()));
        assert!(!registry.insert(p));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&id));
    }

    #[test]
    fn update_unknown_id_fails_closed() {
        let registry = PlayerRegistry::new();
        let touched = registry.update(&Uuid::new_v4(), |p| p.health = 1);
        assert!(touched.is_none());
    }

    #[test]
    fn update_mutates_in_place() {
        let registry = PlayerRegistry::new();
        let p = player("Parker");
        let id = p.id;
        registry.insert(p);
        assert_eq!(registry.update(&id, |p| {
            p.health -= 30;
            p.health
        }), Some(70));
        assert_eq!(registry.get(&id).map(|p| p.health), Some(70));
    }

    #[test]
    fn snapshot_follows_join_order() {
        let registry = PlayerRegistry::new();
        let names = ["one", "two", "three", "four", "five", "six"];
        for name in names {
            registry.insert(player(name));
        }
        let order: Vec<String> = registry.snapshot().into_iter().map(|p| p.name).collect();
        assert_eq!(order, names);
    }

    #[test]
    fn remove_forgets_player() {
        let registry = PlayerRegistry::new();
        let p = player("Lambert");
        let id = p.id;
        registry.insert(p);
        assert!(registry.remove(&id).is_some());
        assert!(registry.get(&id).is_none());
        assert!(registry.remove(&id).is_none());
        assert!(registry.is_empty());
    }
}
