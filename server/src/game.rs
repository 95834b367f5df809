use crate::registry::PlayerRegistry;
use log::{debug, info};
use rand::Rng;
use shared::{
    overlap, Direction, Item, Snapshot, FIELD_HEIGHT, FIELD_WIDTH, ITEM_COUNT, ITEM_HEIGHT,
    ITEM_WIDTH, PLAYER_HEIGHT, PLAYER_WIDTH, TRAVEL_SPEED,
};

/// Dimensions and tuning for one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub field_width: i32,
    pub field_height: i32,
    pub player_width: i32,
    pub player_height: i32,
    pub item_width: i32,
    pub item_height: i32,
    pub travel_speed: i32,
    pub item_count: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            item_width: ITEM_WIDTH,
            item_height: ITEM_HEIGHT,
            travel_speed: TRAVEL_SPEED,
            item_count: ITEM_COUNT,
        }
    }
}

/// Result of applying one input to the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No player is registered for the sending peer.
    UnknownPlayer,
    Moved,
    /// The player picked up an item during this step.
    Collected { score: u32, remaining: usize },
}

/// Authoritative world: connected players and the items still on the field.
///
/// Items are only created here and never respawn, so the list shrinks
/// monotonically over the life of the server.
#[derive(Debug, Clone)]
pub struct World {
    config: GameConfig,
    pub players: PlayerRegistry,
    pub items: Vec<Item>,
}

impl World {
    /// Creates a world with `config.item_count` items scattered over the field
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Self {
        let items = (0..config.item_count)
            .map(|_| {
                Item::new(
                    rng.gen_range(0..config.field_width.max(1)),
                    rng.gen_range(0..config.field_height.max(1)),
                )
            })
            .collect();
        Self::with_items(config, items)
    }

    pub fn with_items(config: GameConfig, items: Vec<Item>) -> Self {
        Self {
            config,
            players: PlayerRegistry::new(
                config.field_width - config.player_width,
                config.field_height - config.player_height,
            ),
            items,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Applies one input from `peer_id`: move, then collect at most one item
    ///
    /// Movement is not clamped, so a player can walk off the visible field.
    /// Items are scanned in list order and only the first overlapping one is
    /// collected, even if the player covers several.
    pub fn step(&mut self, peer_id: &str, direction: Direction) -> StepOutcome {
        let config = self.config;
        let Some(player) = self.players.get_mut(peer_id) else {
            debug!("Ignoring input from unregistered peer {}", peer_id);
            return StepOutcome::UnknownPlayer;
        };

        let (dx, dy) = direction.delta(config.travel_speed);
        player.x = player.x.saturating_add(dx);
        player.y = player.y.saturating_add(dy);
        debug!(
            "Player {} moved {:?} to ({}, {})",
            player.id, direction, player.x, player.y
        );

        let player_bounds = player.bounds(config.player_width, config.player_height);
        let hit = self.items.iter().position(|item| {
            overlap(
                &player_bounds,
                &item.bounds(config.item_width, config.item_height),
            )
        });

        match hit {
            Some(index) => {
                self.items.remove(index);
                player.score += 1;
                info!(
                    "Player {} collected an item (score {}, {} left)",
                    player.id,
                    player.score,
                    self.items.len()
                );
                StepOutcome::Collected {
                    score: player.score,
                    remaining: self.items.len(),
                }
            }
            None => StepOutcome::Moved,
        }
    }

    /// Copies the full world state for transmission
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            players: self.players.iter().cloned().collect(),
            items: self.items.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared::Player;

    fn far_items(count: usize) -> Vec<Item> {
        (0..count).map(|i| Item::new(1400, 900 - i as i32 * 40)).collect()
    }

    fn world_with_player(x: i32, y: i32, items: Vec<Item>) -> World {
        let mut world = World::with_items(GameConfig::default(), items);
        world.players.insert(Player::new("A", x, y));
        world
    }

    #[test]
    fn test_new_world_scatters_items() {
        let mut rng = StdRng::seed_from_u64(11);
        let world = World::new(GameConfig::default(), &mut rng);

        assert_eq!(world.items.len(), ITEM_COUNT);
        for item in &world.items {
            assert!((0..FIELD_WIDTH).contains(&item.x));
            assert!((0..FIELD_HEIGHT).contains(&item.y));
        }
        assert!(world.players.is_empty());
    }

    #[test]
    fn test_step_unknown_player_is_noop() {
        let mut world = world_with_player(100, 100, far_items(3));
        let before = world.snapshot();

        assert_eq!(world.step("B", Direction::Up), StepOutcome::UnknownPlayer);
        assert_eq!(world.snapshot(), before);
    }

    #[test]
    fn test_movement_is_deterministic() {
        for direction in Direction::ALL {
            for steps in [0, 1, 5, 37] {
                let mut world = world_with_player(500, 500, Vec::new());
                for _ in 0..steps {
                    world.step("A", direction);
                }

                let player = world.players.get("A").unwrap();
                let (dx, dy) = direction.delta(TRAVEL_SPEED);
                assert_eq!(player.x, 500 + dx * steps);
                assert_eq!(player.y, 500 + dy * steps);
            }
        }
    }

    #[test]
    fn test_up_five_times() {
        let mut world = world_with_player(100, 100, far_items(10));

        for _ in 0..5 {
            assert_eq!(world.step("A", Direction::Up), StepOutcome::Moved);
        }

        let player = world.players.get("A").unwrap();
        assert_eq!((player.x, player.y), (100, 90));
        assert_eq!(player.score, 0);
        assert_eq!(world.items, far_items(10));
    }

    #[test]
    fn test_no_clamping_at_field_edge() {
        let mut world = world_with_player(0, 0, Vec::new());
        world.step("A", Direction::Left);
        world.step("A", Direction::Up);

        let player = world.players.get("A").unwrap();
        assert_eq!((player.x, player.y), (-2, -2));
    }

    #[test]
    fn test_movement_saturates_at_coordinate_limits() {
        let mut world = world_with_player(i32::MIN + 1, i32::MAX - 1, Vec::new());

        world.step("A", Direction::Left);
        world.step("A", Direction::Left);
        world.step("A", Direction::Down);
        world.step("A", Direction::Down);

        let player = world.players.get("A").unwrap();
        assert_eq!((player.x, player.y), (i32::MIN, i32::MAX));
    }

    #[test]
    fn test_huge_speed_does_not_overflow() {
        let config = GameConfig {
            travel_speed: i32::MAX,
            ..GameConfig::default()
        };
        let mut world = World::with_items(config, vec![Item::new(100, 100)]);
        world.players.insert(Player::new("A", 10, 10));

        assert_eq!(world.step("A", Direction::Right), StepOutcome::Moved);
        assert_eq!(world.players.get("A").unwrap().x, i32::MAX);
        assert_eq!(world.items.len(), 1);
    }

    #[test]
    fn test_collect_item_once() {
        let mut items = far_items(9);
        items.insert(4, Item::new(120, 110));
        let mut world = world_with_player(100, 100, items);

        let outcome = world.step("A", Direction::Right);
        assert_eq!(
            outcome,
            StepOutcome::Collected {
                score: 1,
                remaining: 9
            }
        );
        assert_eq!(world.items, far_items(9));

        assert_eq!(world.step("A", Direction::Right), StepOutcome::Moved);
        assert_eq!(world.items.len(), 9);
        assert_eq!(world.players.get("A").unwrap().score, 1);
    }

    #[test]
    fn test_collect_at_most_one_per_step() {
        let items = vec![Item::new(110, 110), Item::new(120, 120), Item::new(130, 100)];
        let mut world = world_with_player(100, 100, items);

        world.step("A", Direction::Still);
        assert_eq!(world.items, vec![Item::new(120, 120), Item::new(130, 100)]);
        assert_eq!(world.players.get("A").unwrap().score, 1);

        world.step("A", Direction::Still);
        assert_eq!(world.items, vec![Item::new(130, 100)]);
        assert_eq!(world.players.get("A").unwrap().score, 2);
    }

    #[test]
    fn test_collection_uses_list_order() {
        let items = vec![Item::new(160, 160), Item::new(100, 100)];
        let mut world = world_with_player(100, 100, items);

        world.step("A", Direction::Still);
        assert_eq!(world.items, vec![Item::new(100, 100)]);
    }

    #[test]
    fn test_edge_touch_collects() {
        let mut world = world_with_player(100, 100, vec![Item::new(166, 100)]);

        assert_eq!(world.step("A", Direction::Still), StepOutcome::Moved);
        assert_eq!(
            world.step("A", Direction::Right),
            StepOutcome::Collected {
                score: 1,
                remaining: 0
            }
        );
    }

    #[test]
    fn test_only_stepping_player_scores() {
        let mut world = world_with_player(100, 100, vec![Item::new(100, 100)]);
        world.players.insert(Player::new("B", 100, 100));

        world.step("B", Direction::Still);
        assert_eq!(world.players.get("A").unwrap().score, 0);
        assert_eq!(world.players.get("B").unwrap().score, 1);
        assert!(world.items.is_empty());
    }

    #[test]
    fn test_snapshot_contents() {
        let mut world = world_with_player(1, 2, vec![Item::new(3, 4)]);
        world.players.insert(Player::new("B", 5, 6));

        let snapshot = world.snapshot();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.players[0].id, "A");
        assert_eq!(snapshot.players[1].id, "B");
        assert_eq!(snapshot.items, vec![Item::new(3, 4)]);
    }

    #[test]
    fn test_custom_config_speed() {
        let config = GameConfig {
            travel_speed: 7,
            ..GameConfig::default()
        };
        let mut world = World::with_items(config, Vec::new());
        world.players.insert(Player::new("A", 0, 0));

        world.step("A", Direction::Down);
        assert_eq!(world.players.get("A").unwrap().y, 7);
        assert_eq!(world.config().travel_speed, 7);
    }
}
