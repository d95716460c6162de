//! Host services kept entirely in memory.
//!
//! The world is a heightmap with a flat default and per-column overrides,
//! plus stacks of obstacles standing in individual columns.

use crate::host::{
    ChatSink, ConfigStore, DataStore, EntityKind, LayerMask, Permissions, PhysicsWorld,
    PlayerService, RayHit,
};
use crate::permissions::PermissionRegistry;
use crate::player::{PlayerId, PlayerInfo, WorldPos};
use mapnote_save_data::player_data::{DataLoadError, DataSaveError, StoredData};
use rustc_hash::FxHashMap;
use std::io;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObstacleKind {
    Solid,
    Building,
    Water,
    Vehicle,
    CargoShip,
}

impl ObstacleKind {
    fn layer(self) -> LayerMask {
        match self {
            ObstacleKind::Solid | ObstacleKind::Building => LayerMask::SOLID,
            ObstacleKind::Water => LayerMask::WATER,
            ObstacleKind::Vehicle | ObstacleKind::CargoShip => LayerMask::VEHICLE_LARGE,
        }
    }

    fn entity(self) -> Option<EntityKind> {
        match self {
            ObstacleKind::Solid | ObstacleKind::Water => None,
            ObstacleKind::Building => Some(EntityKind::Building),
            ObstacleKind::Vehicle => Some(EntityKind::Vehicle),
            ObstacleKind::CargoShip => Some(EntityKind::CargoShip),
        }
    }

    pub fn parse(name: &str) -> Option<ObstacleKind> {
        Some(match name {
            "solid" => ObstacleKind::Solid,
            "building" | "roof" => ObstacleKind::Building,
            "water" => ObstacleKind::Water,
            "vehicle" => ObstacleKind::Vehicle,
            "cargoship" | "ship" => ObstacleKind::CargoShip,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Obstacle {
    top: f32,
    kind: ObstacleKind,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryPlayer {
    pub info: PlayerInfo,
    pub flyhack_pause: f32,
    pub trigger_refreshes: u32,
    pub teleports: u32,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryWorld {
    default_terrain: f32,
    terrain: FxHashMap<(i32, i32), f32>,
    obstacles: FxHashMap<(i32, i32), Vec<Obstacle>>,
    players: FxHashMap<PlayerId, MemoryPlayer>,
}

fn column(x: f32, z: f32) -> (i32, i32) {
    WorldPos::new(x, 0.0, z).column()
}

impl MemoryWorld {
    pub fn new(default_terrain: f32) -> MemoryWorld {
        MemoryWorld {
            default_terrain,
            ..Default::default()
        }
    }

    pub fn set_terrain(&mut self, x: f32, z: f32, height: f32) {
        self.terrain.insert(column(x, z), height);
    }

    /// Places an obstacle whose top surface is at `top` in the column `(x, z)`.
    pub fn add_obstacle(&mut self, x: f32, z: f32, top: f32, kind: ObstacleKind) {
        self.obstacles
            .entry(column(x, z))
            .or_default()
            .push(Obstacle { top, kind });
    }

    /// Adds a living, unmounted player, replacing any existing one.
    pub fn add_player(&mut self, player: PlayerId) -> &mut MemoryPlayer {
        let slot = self.players.entry(player).or_default();
        *slot = MemoryPlayer::default();
        slot
    }

    pub fn remove_player(&mut self, player: PlayerId) -> Option<MemoryPlayer> {
        self.players.remove(&player)
    }

    pub fn player(&self, player: PlayerId) -> Option<&MemoryPlayer> {
        self.players.get(&player)
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut MemoryPlayer> {
        self.players.get_mut(&player)
    }
}

impl PhysicsWorld for MemoryWorld {
    fn terrain_height(&self, x: f32, z: f32) -> f32 {
        self.terrain
            .get(&column(x, z))
            .copied()
            .unwrap_or(self.default_terrain)
    }

    fn raycast_down(
        &self,
        origin: WorldPos,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.obstacles
            .get(&origin.column())?
            .iter()
            .filter(|obstacle| mask.intersects(obstacle.kind.layer()))
            .filter(|obstacle| obstacle.top <= origin.y && origin.y - obstacle.top <= max_distance)
            .max_by(|a, b| a.top.total_cmp(&b.top))
            .map(|obstacle| RayHit {
                point: WorldPos::new(origin.x, obstacle.top, origin.z),
                entity: obstacle.kind.entity(),
            })
    }
}

impl PlayerService for MemoryWorld {
    fn player_info(&self, player: PlayerId) -> Option<PlayerInfo> {
        self.players.get(&player).map(|p| p.info.clone())
    }

    fn teleport(&mut self, player: PlayerId, pos: WorldPos) {
        if let Some(p) = self.players.get_mut(&player) {
            p.info.position = pos;
            p.teleports += 1;
        }
    }

    fn refresh_triggers(&mut self, player: PlayerId) {
        if let Some(p) = self.players.get_mut(&player) {
            p.trigger_refreshes += 1;
        }
    }

    fn set_flyhack_pause(&mut self, player: PlayerId, seconds: f32) {
        if let Some(p) = self.players.get_mut(&player) {
            p.flyhack_pause = seconds;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatLine {
    pub player: PlayerId,
    pub icon: u64,
    pub message: String,
}

/// A complete host with in-memory stores.
#[derive(Debug, Default)]
pub struct MemoryHost {
    pub world: MemoryWorld,
    pub permissions: PermissionRegistry,
    pub chat: Vec<ChatLine>,
    pub data: Option<StoredData>,
    /// Makes the next reads of the data store fail.
    pub data_corrupt: bool,
    pub data_writes: usize,
    pub config: Option<String>,
    pub config_writes: usize,
}

impl MemoryHost {
    pub fn new(world: MemoryWorld) -> MemoryHost {
        MemoryHost {
            world,
            ..Default::default()
        }
    }

    /// Chat lines sent to `player`, oldest first.
    pub fn chat_for(&self, player: PlayerId) -> Vec<&str> {
        self.chat
            .iter()
            .filter(|line| line.player == player)
            .map(|line| line.message.as_str())
            .collect()
    }
}

impl Permissions for MemoryHost {
    fn has_permission(&self, player: PlayerId, node: &str) -> bool {
        self.permissions.has(player, node)
    }

    fn is_admin(&self, player: PlayerId) -> bool {
        self.permissions.is_admin(player)
    }

    fn register_permission(&mut self, node: &str) {
        self.permissions.register(node);
    }
}

impl PlayerService for MemoryHost {
    fn player_info(&self, player: PlayerId) -> Option<PlayerInfo> {
        self.world.player_info(player)
    }

    fn teleport(&mut self, player: PlayerId, pos: WorldPos) {
        self.world.teleport(player, pos);
    }

    fn refresh_triggers(&mut self, player: PlayerId) {
        self.world.refresh_triggers(player);
    }

    fn set_flyhack_pause(&mut self, player: PlayerId, seconds: f32) {
        self.world.set_flyhack_pause(player, seconds);
    }
}

impl PhysicsWorld for MemoryHost {
    fn terrain_height(&self, x: f32, z: f32) -> f32 {
        self.world.terrain_height(x, z)
    }

    fn raycast_down(
        &self,
        origin: WorldPos,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.world.raycast_down(origin, max_distance, mask)
    }
}

impl ChatSink for MemoryHost {
    fn send_chat(&mut self, player: PlayerId, icon: u64, message: &str) {
        self.chat.push(ChatLine {
            player,
            icon,
            message: message.to_string(),
        });
    }
}

impl DataStore for MemoryHost {
    fn read_data(&self) -> Result<Option<StoredData>, DataLoadError> {
        if self.data_corrupt {
            return Err(DataLoadError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                "corrupt data file",
            )));
        }
        Ok(self.data.clone())
    }

    fn write_data(&mut self, data: &StoredData) -> Result<(), DataSaveError> {
        self.data = Some(data.clone());
        self.data_corrupt = false;
        self.data_writes += 1;
        Ok(())
    }
}

impl ConfigStore for MemoryHost {
    fn read_config(&self) -> io::Result<Option<String>> {
        Ok(self.config.clone())
    }

    fn write_config(&mut self, contents: &str) -> io::Result<()> {
        self.config = Some(contents.to_string());
        self.config_writes += 1;
        Ok(())
    }
}
