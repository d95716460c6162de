use std::fmt;

/// Stable identifier the host assigns to a player (a Steam id for real players).
pub type PlayerId = u64;

/// Every real Steam account id is above this value; anything at or below it
/// belongs to an NPC or another synthetic entity.
pub const STEAM_ID_BASE: PlayerId = 76561197960265728;

pub fn is_steam_id(id: PlayerId) -> bool {
    id > STEAM_ID_BASE
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl WorldPos {
    pub fn new(x: f32, y: f32, z: f32) -> WorldPos {
        WorldPos { x, y, z }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// The integer map column this position falls in.
    pub fn column(self) -> (i32, i32) {
        (self.x.floor() as i32, self.z.floor() as i32)
    }
}

impl fmt::Display for WorldPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// A note a player placed on the in-game map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapNote {
    pub world_position: WorldPos,
}

impl MapNote {
    pub fn new(x: f32, z: f32) -> MapNote {
        MapNote {
            world_position: WorldPos::new(x, 0.0, z),
        }
    }
}

/// Snapshot of what the host knows about a connected player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerInfo {
    pub position: WorldPos,
    /// Seated in a chair or riding a vehicle.
    pub mounted: bool,
    pub alive: bool,
    pub language: Option<String>,
}

impl Default for PlayerInfo {
    fn default() -> PlayerInfo {
        PlayerInfo {
            position: WorldPos::default(),
            mounted: false,
            alive: true,
            language: None,
        }
    }
}
