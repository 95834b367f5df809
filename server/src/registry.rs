//! Session registry for connected players
//!
//! This module tracks which peers currently own a player in the world:
//! - Player creation on connect, at a random spawn point inside the field
//! - Exact-match removal on disconnect
//! - Ordered iteration for snapshots (join order is preserved)
//!
//! Capacity is enforced by the transport, which never reports more than
//! its peer limit as connected.

use log::{info, warn};
use rand::Rng;
use shared::Player;

/// Ordered collection of active players keyed by their peer id
///
/// Players are stored in join order. Removing a player keeps the relative
/// order of everyone else, so clients see a stable listing between snapshots.
#[derive(Debug, Clone)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    /// Exclusive upper bound for spawn x (field width minus player width)
    spawn_width: i32,
    /// Exclusive upper bound for spawn y (field height minus player height)
    spawn_height: i32,
}

impl PlayerRegistry {
    /// Creates an empty registry spawning players in `[0, spawn_width) x [0, spawn_height)`
    ///
    /// Degenerate areas (a field no larger than the player footprint) collapse
    /// to spawning at the origin.
    pub fn new(spawn_width: i32, spawn_height: i32) -> Self {
        Self {
            players: Vec::new(),
            spawn_width: spawn_width.max(1),
            spawn_height: spawn_height.max(1),
        }
    }

    /// Registers a newly connected peer
    ///
    /// Returns true if a player was created. A peer id that is already
    /// present keeps its existing player and nothing is added.
    pub fn on_connect<R: Rng + ?Sized>(&mut self, peer_id: &str, rng: &mut R) -> bool {
        if self.get(peer_id).is_some() {
            warn!("Peer {} connected twice, keeping existing player", peer_id);
            return false;
        }

        let x = rng.gen_range(0..self.spawn_width);
        let y = rng.gen_range(0..self.spawn_height);
        info!("Player {} joined at ({}, {})", peer_id, x, y);
        self.players.push(Player::new(peer_id, x, y));
        true
    }

    /// Removes the player owned by `peer_id`
    ///
    /// Returns the removed player, or None when no player matches. In the
    /// latter case the registry is left untouched.
    pub fn on_disconnect(&mut self, peer_id: &str) -> Option<Player> {
        match self.players.iter().position(|p| p.id == peer_id) {
            Some(index) => {
                let player = self.players.remove(index);
                info!("Player {} left with score {}", player.id, player.score);
                Some(player)
            }
            None => {
                warn!("Disconnect for unknown peer {}", peer_id);
                None
            }
        }
    }

    pub fn get(&self, peer_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == peer_id)
    }

    pub fn get_mut(&mut self, peer_id: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == peer_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Inserts a fully-formed player, replacing nothing if the id is taken
    pub fn insert(&mut self, player: Player) -> bool {
        if self.get(&player.id).is_some() {
            return false;
        }
        self.players.push(player);
        true
    }

    /// Returns the number of connected players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns true if no players are connected
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::{FIELD_HEIGHT, FIELD_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH};

    fn test_registry() -> PlayerRegistry {
        PlayerRegistry::new(FIELD_WIDTH - PLAYER_WIDTH, FIELD_HEIGHT - PLAYER_HEIGHT)
    }

    fn ids(registry: &PlayerRegistry) -> Vec<&str> {
        registry.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_registry_creation() {
        let registry = test_registry();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_connect_spawns_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut registry = test_registry();

        for i in 0..200 {
            let id = format!("127.0.0.1:{}", 10000 + i);
            assert!(registry.on_connect(&id, &mut rng));
        }

        assert_eq!(registry.len(), 200);
        for player in registry.iter() {
            assert!((0..=FIELD_WIDTH - PLAYER_WIDTH).contains(&player.x));
            assert!((0..=FIELD_HEIGHT - PLAYER_HEIGHT).contains(&player.y));
            assert_eq!(player.score, 0);
        }
    }

    #[test]
    fn test_connect_same_peer_twice() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut registry = test_registry();

        assert!(registry.on_connect("A", &mut rng));
        let first = registry.get("A").cloned();
        assert!(!registry.on_connect("A", &mut rng));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("A").cloned(), first);
    }

    #[test]
    fn test_disconnect_removes_only_match() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut registry = test_registry();
        for id in ["A", "B", "C"] {
            registry.on_connect(id, &mut rng);
        }

        let removed = registry.on_disconnect("B");
        assert_eq!(removed.map(|p| p.id), Some("B".to_string()));
        assert_eq!(ids(&registry), vec!["A", "C"]);
    }

    #[test]
    fn test_disconnect_unknown_removes_nothing() {
        let mut rng = StdRng::seed_from_u64(3);

        let mut empty = test_registry();
        assert!(empty.on_disconnect("ghost").is_none());
        assert!(empty.is_empty());

        let mut single = test_registry();
        single.on_connect("A", &mut rng);
        assert!(single.on_disconnect("ghost").is_none());
        assert_eq!(ids(&single), vec!["A"]);

        let mut many = test_registry();
        for id in ["A", "B", "C"] {
            many.on_connect(id, &mut rng);
        }
        assert!(many.on_disconnect("ghost").is_none());
        assert_eq!(ids(&many), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_connect_then_disconnect_empties() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut registry = test_registry();

        registry.on_connect("A", &mut rng);
        assert!(registry.on_disconnect("A").is_some());
        assert!(registry.is_empty());
        assert!(registry.on_disconnect("A").is_none());
    }

    #[test]
    fn test_degenerate_spawn_area() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut registry = PlayerRegistry::new(0, -10);

        registry.on_connect("A", &mut rng);
        let player = registry.get("A").unwrap();
        assert_eq!((player.x, player.y), (0, 0));
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut registry = test_registry();
        assert!(registry.insert(Player::new("A", 1, 1)));
        assert!(!registry.insert(Player::new("A", 5, 5)));
        assert_eq!(registry.get("A").map(|p| p.x), Some(1));
    }
}
