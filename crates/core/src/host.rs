//! Services the plugin needs from the game server it runs inside.
//!
//! Everything the plugin does to the outside world goes through one of these
//! traits so the logic can run against a real server, the headless console
//! host, or the in-memory test host alike.

use crate::player::{PlayerId, PlayerInfo, WorldPos};
use bitflags::bitflags;
use mapnote_save_data::player_data::{DataLoadError, DataSaveError, StoredData};
use std::fs;
use std::io;
use std::path::PathBuf;

bitflags! {
    /// Physics layers a raycast may collide with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LayerMask: u32 {
        const TERRAIN = 0x01;
        const SOLID = 0x02;
        const WATER = 0x04;
        const VEHICLE_LARGE = 0x08;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    CargoShip,
    Vehicle,
    Building,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: WorldPos,
    /// The entity owning the collider that was hit, if any.
    pub entity: Option<EntityKind>,
}

pub trait Permissions {
    fn has_permission(&self, player: PlayerId, node: &str) -> bool;

    fn is_admin(&self, player: PlayerId) -> bool;

    fn register_permission(&mut self, _node: &str) {}
}

pub trait PlayerService {
    /// Returns `None` if the player is not connected.
    fn player_info(&self, player: PlayerId) -> Option<PlayerInfo>;

    fn teleport(&mut self, player: PlayerId, pos: WorldPos);

    /// Drops the player out of every trigger volume and re-evaluates them at
    /// the current position.
    fn refresh_triggers(&mut self, player: PlayerId);

    /// Seconds during which the anti-cheat ignores large position changes.
    fn set_flyhack_pause(&mut self, player: PlayerId, seconds: f32);
}

pub trait ChatSink {
    fn send_chat(&mut self, player: PlayerId, icon: u64, message: &str);
}

pub trait PhysicsWorld {
    fn terrain_height(&self, x: f32, z: f32) -> f32;

    /// Casts a ray straight down from `origin`.
    fn raycast_down(&self, origin: WorldPos, max_distance: f32, mask: LayerMask)
    -> Option<RayHit>;
}

pub trait DataStore {
    /// Returns `Ok(None)` if nothing has been written yet.
    fn read_data(&self) -> Result<Option<StoredData>, DataLoadError>;

    fn write_data(&mut self, data: &StoredData) -> Result<(), DataSaveError>;
}

pub trait ConfigStore {
    fn read_config(&self) -> io::Result<Option<String>>;

    fn write_config(&mut self, contents: &str) -> io::Result<()>;
}

/// Everything the plugin is constructed with.
pub trait Host: Permissions + PlayerService + ChatSink + PhysicsWorld + DataStore + ConfigStore {}

impl<T> Host for T where
    T: Permissions + PlayerService + ChatSink + PhysicsWorld + DataStore + ConfigStore
{
}

/// Config and data files on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    pub config_path: PathBuf,
    pub data_path: PathBuf,
}

impl FileStore {
    pub fn new(config_path: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> FileStore {
        FileStore {
            config_path: config_path.into(),
            data_path: data_path.into(),
        }
    }
}

impl DataStore for FileStore {
    fn read_data(&self) -> Result<Option<StoredData>, DataLoadError> {
        StoredData::load_from_file(&self.data_path)
    }

    fn write_data(&mut self, data: &StoredData) -> Result<(), DataSaveError> {
        data.save_to_file(&self.data_path)
    }
}

impl ConfigStore for FileStore {
    fn read_config(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.config_path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write_config(&mut self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.config_path, contents)
    }
}
