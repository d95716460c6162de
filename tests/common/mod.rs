#![allow(dead_code)]

use mapnote_core::memory::{MemoryHost, MemoryWorld, ObstacleKind};
use mapnote_core::player::{MapNote, PlayerId, WorldPos};
use mapnote_core::{MapNoteTeleport, TeleportOutcome, PERMISSION_USE};
use std::time::{Duration, Instant};

pub const PLAYER: PlayerId = 76561198000000001;
pub const OTHER: PlayerId = 76561198000000002;

/// A plugin over an in-memory host with a clock that only moves on
/// `advance`.
pub struct TestServer {
    pub plugin: MapNoteTeleport<MemoryHost>,
    pub now: Instant,
}

impl TestServer {
    pub fn new(terrain: f32) -> TestServer {
        TestServer::with_host(MemoryHost::new(MemoryWorld::new(terrain)))
    }

    pub fn with_config(terrain: f32, config: &str) -> TestServer {
        let mut host = MemoryHost::new(MemoryWorld::new(terrain));
        host.config = Some(config.to_string());
        TestServer::with_host(host)
    }

    pub fn with_host(host: MemoryHost) -> TestServer {
        let mut plugin = MapNoteTeleport::new(host);
        plugin.on_server_initialized();
        TestServer {
            plugin,
            now: Instant::now(),
        }
    }

    pub fn host(&self) -> &MemoryHost {
        self.plugin.host()
    }

    pub fn host_mut(&mut self) -> &mut MemoryHost {
        self.plugin.host_mut()
    }

    /// Connects a living player that holds the use permission, standing at
    /// `(100, ?, 200)`.
    pub fn join(&mut self, player: PlayerId) {
        let host = self.host_mut();
        host.world.add_player(player).info.position = WorldPos::new(100.0, 10.0, 200.0);
        host.permissions.grant(player, PERMISSION_USE);
    }

    pub fn join_without_permission(&mut self, player: PlayerId) {
        self.host_mut().world.add_player(player);
    }

    pub fn set_terrain(&mut self, x: f32, z: f32, height: f32) {
        self.host_mut().world.set_terrain(x, z, height);
    }

    pub fn add_obstacle(&mut self, x: f32, z: f32, top: f32, kind: ObstacleKind) {
        self.host_mut().world.add_obstacle(x, z, top, kind);
    }

    pub fn place_marker(&mut self, player: PlayerId, x: f32, z: f32) -> Option<TeleportOutcome> {
        let note = MapNote::new(x, z);
        self.plugin
            .on_map_marker_added(Some(player), Some(&note), self.now)
    }

    pub fn position(&self, player: PlayerId) -> WorldPos {
        self.host().world.player(player).unwrap().info.position
    }

    pub fn advance(&mut self, seconds: f32) {
        self.now += Duration::from_secs_f32(seconds);
        self.plugin.tick(self.now);
    }

    pub fn command(&mut self, player: PlayerId, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        self.plugin.handle_command(player, command, &args)
    }

    pub fn chat(&self, player: PlayerId) -> Vec<String> {
        self.host()
            .chat_for(player)
            .into_iter()
            .map(mapnote_text::strip_tags)
            .collect()
    }

    pub fn last_chat(&self, player: PlayerId) -> Option<String> {
        self.chat(player).pop()
    }
}
