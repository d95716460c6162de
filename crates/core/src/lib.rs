#![deny(rust_2018_idioms)]

pub mod chat;
mod commands;
pub mod config;
pub mod ground;
pub mod host;
pub mod lang;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod permissions;
pub mod player;
pub mod plugin;
pub mod preferences;
pub mod session;
mod utils;

pub use plugin::{DamageVerdict, MapNoteTeleport, PERMISSION_USE};
pub use session::TeleportOutcome;
