use mapnote_core::host::{
    ChatSink, ConfigStore, DataStore, FileStore, LayerMask, Permissions, PhysicsWorld,
    PlayerService, RayHit,
};
use mapnote_core::memory::MemoryWorld;
use mapnote_core::permissions::PermissionRegistry;
use mapnote_core::player::{PlayerId, PlayerInfo, WorldPos};
use mapnote_save_data::player_data::{DataLoadError, DataSaveError, StoredData};
use mapnote_text::strip_tags;
use std::io;
use tracing::info;

/// Host for the headless runner: an in-memory world with config and player
/// data kept on disk. Chat is written to the log.
pub struct ConsoleHost {
    pub world: MemoryWorld,
    pub permissions: PermissionRegistry,
    files: FileStore,
}

impl ConsoleHost {
    pub fn new(world: MemoryWorld, files: FileStore) -> ConsoleHost {
        ConsoleHost {
            world,
            permissions: PermissionRegistry::default(),
            files,
        }
    }
}

impl Permissions for ConsoleHost {
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

impl PlayerService for ConsoleHost {
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

impl PhysicsWorld for ConsoleHost {
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

impl ChatSink for ConsoleHost {
    fn send_chat(&mut self, player: PlayerId, _icon: u64, message: &str) {
        info!("[chat -> {}] {}", player, strip_tags(message));
    }
}

impl DataStore for ConsoleHost {
    fn read_data(&self) -> Result<Option<StoredData>, DataLoadError> {
        self.files.read_data()
    }

    fn write_data(&mut self, data: &StoredData) -> Result<(), DataSaveError> {
        self.files.write_data(data)
    }
}

impl ConfigStore for ConsoleHost {
    fn read_config(&self) -> io::Result<Option<String>> {
        self.files.read_config()
    }

    fn write_config(&mut self, contents: &str) -> io::Result<()> {
        self.files.write_config(contents)
    }
}
