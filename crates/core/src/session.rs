//! Cooldown and protection windows opened by a teleport.
//!
//! Both windows are stored as per-player expiry instants. An entry whose
//! instant has passed is treated as absent even before `sweep` removes it.

use crate::ground::resolve_landing_height;
use crate::host::{PhysicsWorld, PlayerService};
use crate::lang::MessageKey;
use crate::player::{is_steam_id, MapNote, PlayerId, WorldPos};
use rustc_hash::FxHashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeleportOutcome {
    Teleported { destination: WorldPos },
    Mounted,
    Dead,
    OnCooldown,
    /// The host does not know the player.
    Offline,
}

impl TeleportOutcome {
    /// Message the player is shown when the teleport was refused.
    pub fn rejection_message(&self) -> Option<MessageKey> {
        match self {
            TeleportOutcome::Mounted => Some(MessageKey::MapNoteTeleportMounted),
            TeleportOutcome::Dead => Some(MessageKey::MapNoteTeleportDead),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TeleportOutcome::Teleported { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportWindow {
    pub cooldown: Duration,
    pub protection: Duration,
    /// Seconds the anti-cheat should ignore the position change for.
    pub flyhack_pause: f32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Expired {
    pub cooldowns: Vec<PlayerId>,
    pub protections: Vec<PlayerId>,
}

#[derive(Debug, Default)]
pub struct TeleportTracker {
    cooldowns: FxHashMap<PlayerId, Instant>,
    protections: FxHashMap<PlayerId, Instant>,
    /// Whether incoming damage has to be checked at all. True exactly while
    /// `protections` is non-empty.
    damage_hook_active: bool,
}

impl TeleportTracker {
    pub fn new() -> TeleportTracker {
        TeleportTracker::default()
    }

    pub fn is_on_cooldown(&self, player: PlayerId, now: Instant) -> bool {
        self.cooldowns.get(&player).is_some_and(|&until| until > now)
    }

    pub fn is_protected(&self, player: PlayerId, now: Instant) -> bool {
        self.protections.get(&player).is_some_and(|&until| until > now)
    }

    pub fn cooldown_remaining(&self, player: PlayerId, now: Instant) -> Option<Duration> {
        self.cooldowns
            .get(&player)
            .map(|&until| until.saturating_duration_since(now))
            .filter(|remaining| !remaining.is_zero())
    }

    pub fn damage_hook_active(&self) -> bool {
        self.damage_hook_active
    }

    pub fn cooldown_count(&self) -> usize {
        self.cooldowns.len()
    }

    pub fn protected_count(&self) -> usize {
        self.protections.len()
    }

    fn update_damage_hook(&mut self) {
        let active = !self.protections.is_empty();
        if active != self.damage_hook_active {
            debug!("Damage hook {}", if active { "subscribed" } else { "unsubscribed" });
        }
        self.damage_hook_active = active;
    }

    /// Validates the player, moves them to the ground below `note` and opens
    /// the cooldown and protection windows. Refusals leave all state alone.
    pub fn attempt_teleport<H>(
        &mut self,
        host: &mut H,
        player: PlayerId,
        note: &MapNote,
        window: TeleportWindow,
        now: Instant,
    ) -> TeleportOutcome
    where
        H: PlayerService + PhysicsWorld + ?Sized,
    {
        let Some(info) = host.player_info(player) else {
            return TeleportOutcome::Offline;
        };
        if info.mounted {
            return TeleportOutcome::Mounted;
        }
        if !info.alive {
            return TeleportOutcome::Dead;
        }
        if self.is_on_cooldown(player, now) {
            return TeleportOutcome::OnCooldown;
        }

        let mut destination = note.world_position;
        destination.y = resolve_landing_height(&*host, destination.x, destination.z);

        self.begin_window(player, window, now);
        host.set_flyhack_pause(player, window.flyhack_pause);
        host.teleport(player, destination);
        host.refresh_triggers(player);

        info!("Teleported {} from {} to {}", player, info.position, destination);
        TeleportOutcome::Teleported { destination }
    }

    /// Puts the player on cooldown and under protection starting at `now`.
    pub fn begin_window(&mut self, player: PlayerId, window: TeleportWindow, now: Instant) {
        self.cooldowns.insert(player, now + window.cooldown);
        self.protections.insert(player, now + window.protection);
        self.update_damage_hook();
    }

    /// Whether damage to `player` has to be cancelled.
    pub fn should_suppress_damage(&self, player: PlayerId, now: Instant) -> bool {
        self.damage_hook_active && is_steam_id(player) && self.is_protected(player, now)
    }

    /// Removes every window that has ended by `now`.
    pub fn sweep(&mut self, now: Instant) -> Expired {
        let mut expired = Expired::default();
        self.cooldowns.retain(|&player, &mut until| {
            let keep = until > now;
            if !keep {
                expired.cooldowns.push(player);
            }
            keep
        });
        self.protections.retain(|&player, &mut until| {
            let keep = until > now;
            if !keep {
                expired.protections.push(player);
            }
            keep
        });
        expired.cooldowns.sort_unstable();
        expired.protections.sort_unstable();
        self.update_damage_hook();
        expired
    }

    /// Drops any windows the player has open, e.g. when they disconnect.
    pub fn forget(&mut self, player: PlayerId) {
        self.cooldowns.remove(&player);
        self.protections.remove(&player);
        self.update_damage_hook();
    }
}
