//! Automated input: picks the direction to send each frame

use shared::{Direction, Item, Player};

/// Heads for the nearest item by Manhattan distance between box origins
///
/// Moves along whichever axis has the larger gap, horizontal on ties, and
/// stands still once the field is empty.
pub fn choose_direction(me: &Player, items: &[Item]) -> Direction {
    let Some(target) = items
        .iter()
        .min_by_key(|item| (item.x - me.x).abs() + (item.y - me.y).abs())
    else {
        return Direction::Still;
    };

    let dx = target.x - me.x;
    let dy = target.y - me.y;
    if dx == 0 && dy == 0 {
        Direction::Still
    } else if dx.abs() >= dy.abs() {
        if dx > 0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(x: i32, y: i32) -> Player {
        Player::new("127.0.0.1:5000", x, y)
    }

    #[test]
    fn test_no_items_stands_still() {
        assert_eq!(choose_direction(&player_at(10, 10), &[]), Direction::Still);
    }

    #[test]
    fn test_moves_along_larger_gap() {
        let me = player_at(100, 100);
        assert_eq!(choose_direction(&me, &[Item::new(300, 120)]), Direction::Right);
        assert_eq!(choose_direction(&me, &[Item::new(-50, 90)]), Direction::Left);
        assert_eq!(choose_direction(&me, &[Item::new(110, 400)]), Direction::Down);
        assert_eq!(choose_direction(&me, &[Item::new(90, 0)]), Direction::Up);
    }

    #[test]
    fn test_prefers_nearest_item() {
        let me = player_at(100, 100);
        let items = [Item::new(1000, 1000), Item::new(100, 60), Item::new(400, 100)];
        assert_eq!(choose_direction(&me, &items), Direction::Up);
    }

    #[test]
    fn test_tie_moves_horizontally() {
        let me = player_at(0, 0);
        assert_eq!(choose_direction(&me, &[Item::new(20, 20)]), Direction::Right);
    }

    #[test]
    fn test_on_target_stands_still() {
        let me = player_at(40, 40);
        assert_eq!(choose_direction(&me, &[Item::new(40, 40)]), Direction::Still);
    }
}
