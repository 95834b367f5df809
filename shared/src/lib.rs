//! Wire contract and pure game rules shared by the server and the client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FIELD_WIDTH: i32 = 1500;
pub const FIELD_HEIGHT: i32 = 1000;
pub const PLAYER_WIDTH: i32 = 64;
pub const PLAYER_HEIGHT: i32 = 64;
pub const ITEM_WIDTH: i32 = 32;
pub const ITEM_HEIGHT: i32 = 32;
pub const TRAVEL_SPEED: i32 = 2;
pub const ITEM_COUNT: usize = 10;
pub const MAX_PLAYERS: usize = 32;
pub const DEFAULT_PORT: u16 = 8095;
/// The transport exposes a single logical channel per peer.
pub const CHANNEL_COUNT: u8 = 1;

/// Errors raised while decoding a direction message from a client.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("direction payload is not valid UTF-8")]
    NotUtf8,
    #[error("direction payload {0:?} is not a decimal number")]
    NotNumeric(String),
    #[error("unknown direction code {0}")]
    UnknownDirection(i64),
}

/// Movement requested by a client for one step. Exactly one axis moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Still,
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 5] = [
        Direction::Still,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Numeric code used on the wire.
    pub fn code(self) -> u8 {
        match self {
            Direction::Still => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Up => 3,
            Direction::Down => 4,
        }
    }

    /// Codes outside `0..=4` are rejected rather than read as standing still.
    pub fn from_code(code: i64) -> Result<Self, ProtocolError> {
        match code {
            0 => Ok(Direction::Still),
            1 => Ok(Direction::Left),
            2 => Ok(Direction::Right),
            3 => Ok(Direction::Up),
            4 => Ok(Direction::Down),
            other => Err(ProtocolError::UnknownDirection(other)),
        }
    }

    /// Decodes the bare ASCII decimal payload a client sends every frame.
    pub fn decode(payload: &[u8]) -> Result<Self, ProtocolError> {
        let text = std::str::from_utf8(payload).map_err(|_| ProtocolError::NotUtf8)?;
        let code = text
            .parse::<i64>()
            .map_err(|_| ProtocolError::NotNumeric(text.to_string()))?;
        Self::from_code(code)
    }

    pub fn encode(self) -> String {
        self.code().to_string()
    }

    /// Displacement for one step at the given speed, as `(dx, dy)`.
    /// The y axis grows downwards.
    pub fn delta(self, speed: i32) -> (i32, i32) {
        match self {
            Direction::Still => (0, 0),
            Direction::Left => (-speed, 0),
            Direction::Right => (speed, 0),
            Direction::Up => (0, -speed),
            Direction::Down => (0, speed),
        }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }
}

/// Closed-interval AABB test: boxes that only touch along an edge overlap.
pub fn overlap(a: &BoundingBox, b: &BoundingBox) -> bool {
    let x_overlap = a.x <= b.right() && b.x <= a.right();
    let y_overlap = a.y <= b.bottom() && b.y <= a.bottom();
    x_overlap && y_overlap
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub score: u32,
}

impl Player {
    pub fn new(id: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            score: 0,
        }
    }

    pub fn bounds(&self, width: i32, height: i32) -> BoundingBox {
        BoundingBox::new(self.x, self.y, width, height)
    }
}

/// A collectible lying on the play field.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub x: i32,
    pub y: i32,
}

impl Item {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn bounds(&self, width: i32, height: i32) -> BoundingBox {
        BoundingBox::new(self.x, self.y, width, height)
    }
}

/// Full world state as sent to a peer after each of its steps.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub items: Vec<Item>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}
