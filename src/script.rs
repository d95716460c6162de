//! Line based event scripts for the headless runner.
//!
//! ```text
//! # comments and blank lines are skipped
//! join 76561198000000001 perm admin lang=de
//! terrain 150 300 50
//! obstacle 150 300 120 building
//! marker 76561198000000001 150 300
//! damage 76561198000000001
//! cmd 76561198000000001 mnt cooldown 7
//! mount 76561198000000001 | dismount .. | die .. | respawn .. | leave ..
//! wait 5.5
//! save
//! ```

use crate::host::ConsoleHost;
use mapnote_core::memory::ObstacleKind;
use mapnote_core::player::{MapNote, PlayerId};
use mapnote_core::MapNoteTeleport;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("unknown event `{0}`")]
    UnknownEvent(String),
    #[error("missing argument `{0}`")]
    MissingArgument(&'static str),
    #[error("`{0}` is not a valid number")]
    InvalidNumber(String),
    #[error("unknown obstacle kind `{0}`")]
    UnknownObstacle(String),
    #[error("unknown player flag `{0}`")]
    UnknownFlag(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Join {
        player: PlayerId,
        permitted: bool,
        admin: bool,
        language: Option<String>,
    },
    Leave(PlayerId),
    SetMounted(PlayerId, bool),
    SetAlive(PlayerId, bool),
    Terrain { x: f32, z: f32, height: f32 },
    Obstacle { x: f32, z: f32, top: f32, kind: ObstacleKind },
    Marker { player: PlayerId, x: f32, z: f32 },
    Damage(PlayerId),
    Command {
        player: PlayerId,
        command: String,
        args: Vec<String>,
    },
    Wait(Duration),
    Save,
}

struct Args<'a> {
    parts: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn next(&mut self, name: &'static str) -> Result<&'a str, ParseError> {
        self.parts.next().ok_or(ParseError::MissingArgument(name))
    }

    fn player(&mut self) -> Result<PlayerId, ParseError> {
        let id = self.next("player")?;
        id.parse()
            .map_err(|_| ParseError::InvalidNumber(id.to_string()))
    }

    fn float(&mut self, name: &'static str) -> Result<f32, ParseError> {
        let value = self.next(name)?;
        value
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ParseError::InvalidNumber(value.to_string()))
    }

    fn rest(self) -> Vec<&'a str> {
        self.parts.collect()
    }
}

/// Parses one script line. Blank lines and `#` comments give `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Event>, ParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(None);
    };
    let mut args = Args { parts };

    let event = match name {
        "join" => {
            let player = args.player()?;
            let mut permitted = false;
            let mut admin = false;
            let mut language = None;
            for flag in args.rest() {
                match flag {
                    "perm" => permitted = true,
                    "admin" => admin = true,
                    flag => match flag.strip_prefix("lang=") {
                        Some(lang) => language = Some(lang.to_string()),
                        None => return Err(ParseError::UnknownFlag(flag.to_string())),
                    },
                }
            }
            Event::Join {
                player,
                permitted,
                admin,
                language,
            }
        }
        "leave" => Event::Leave(args.player()?),
        "mount" => Event::SetMounted(args.player()?, true),
        "dismount" => Event::SetMounted(args.player()?, false),
        "die" => Event::SetAlive(args.player()?, false),
        "respawn" => Event::SetAlive(args.player()?, true),
        "terrain" => Event::Terrain {
            x: args.float("x")?,
            z: args.float("z")?,
            height: args.float("height")?,
        },
        "obstacle" => {
            let x = args.float("x")?;
            let z = args.float("z")?;
            let top = args.float("top")?;
            let kind = args.next("kind")?;
            Event::Obstacle {
                x,
                z,
                top,
                kind: ObstacleKind::parse(kind)
                    .ok_or_else(|| ParseError::UnknownObstacle(kind.to_string()))?,
            }
        }
        "marker" => Event::Marker {
            player: args.player()?,
            x: args.float("x")?,
            z: args.float("z")?,
        },
        "damage" => Event::Damage(args.player()?),
        "cmd" => {
            let player = args.player()?;
            let command = args.next("command")?.trim_start_matches('/').to_string();
            Event::Command {
                player,
                command,
                args: args.rest().into_iter().map(str::to_string).collect(),
            }
        }
        "wait" => {
            let seconds = args.float("seconds")?;
            let duration = Duration::try_from_secs_f32(seconds)
                .map_err(|_| ParseError::InvalidNumber(seconds.to_string()))?;
            Event::Wait(duration)
        }
        "save" => Event::Save,
        other => return Err(ParseError::UnknownEvent(other.to_string())),
    };
    Ok(Some(event))
}

/// Applies events to a plugin on a virtual clock that only moves on `wait`.
pub struct ScriptRunner {
    now: Instant,
}

impl ScriptRunner {
    pub fn new(start: Instant) -> ScriptRunner {
        ScriptRunner { now: start }
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn apply(&mut self, plugin: &mut MapNoteTeleport<ConsoleHost>, event: Event) {
        match event {
            Event::Join {
                player,
                permitted,
                admin,
                language,
            } => {
                let host = plugin.host_mut();
                host.world.add_player(player).info.language = language;
                if permitted {
                    host.permissions.grant(player, mapnote_core::PERMISSION_USE);
                }
                host.permissions.set_admin(player, admin);
                info!("{} joined", player);
            }
            Event::Leave(player) => {
                plugin.host_mut().world.remove_player(player);
                plugin.on_player_disconnected(player);
                info!("{} left", player);
            }
            Event::SetMounted(player, mounted) => {
                if let Some(p) = plugin.host_mut().world.player_mut(player) {
                    p.info.mounted = mounted;
                }
            }
            Event::SetAlive(player, alive) => {
                if let Some(p) = plugin.host_mut().world.player_mut(player) {
                    p.info.alive = alive;
                }
            }
            Event::Terrain { x, z, height } => {
                plugin.host_mut().world.set_terrain(x, z, height);
            }
            Event::Obstacle { x, z, top, kind } => {
                plugin.host_mut().world.add_obstacle(x, z, top, kind);
            }
            Event::Marker { player, x, z } => {
                let note = MapNote::new(x, z);
                match plugin.on_map_marker_added(Some(player), Some(&note), self.now) {
                    Some(outcome) => info!("Marker by {}: {:?}", player, outcome),
                    None => info!("Marker by {} ignored", player),
                }
            }
            Event::Damage(player) => {
                let verdict = plugin.on_entity_take_damage(Some(player), self.now);
                info!("Damage to {}: {:?}", player, verdict);
            }
            Event::Command {
                player,
                command,
                args,
            } => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                if !plugin.handle_command(player, &command, &args) {
                    info!("Unknown command /{}", command);
                }
            }
            Event::Wait(duration) => match self.now.checked_add(duration) {
                Some(now) => self.now = now,
                None => warn!("Ignoring wait of {:?}, the clock would overflow", duration),
            },
            Event::Save => {
                let at = plugin.on_server_save(self.now);
                info!(
                    "Server save, player data follows in {:?}",
                    at.saturating_duration_since(self.now)
                );
            }
        }
        plugin.tick(self.now);
    }
}
