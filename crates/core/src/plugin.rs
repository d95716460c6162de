use crate::chat;
use crate::config::PluginConfig;
use crate::host::Host;
use crate::lang::{Lang, MessageKey};
use crate::player::{MapNote, PlayerId};
use crate::preferences::{clamp_cooldown, Preferences};
use crate::session::{TeleportOutcome, TeleportTracker, TeleportWindow};
use crate::utils::secs;
use rand::Rng;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const PERMISSION_USE: &str = "mapnoteteleport.use";

/// Upper bound of the random delay before a server save is mirrored to the
/// data file.
pub const SAVE_JITTER_SECS: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageVerdict {
    Proceed,
    /// The damage is cancelled and no other handler should see it.
    Suppress,
}

pub struct MapNoteTeleport<H: Host> {
    pub(crate) host: H,
    pub(crate) config: PluginConfig,
    pub(crate) lang: Lang,
    pub(crate) preferences: Preferences,
    pub(crate) tracker: TeleportTracker,
    pending_save: Option<Instant>,
}

impl<H: Host> MapNoteTeleport<H> {
    pub fn new(host: H) -> Self {
        Self::with_lang(host, Lang::new())
    }

    /// Loads the config and player data from the host's stores and registers
    /// the use permission.
    pub fn with_lang(mut host: H, lang: Lang) -> Self {
        let config = PluginConfig::load(&mut host);
        let preferences = Preferences::load(&mut host, Preferences::defaults_from(&config));
        host.register_permission(PERMISSION_USE);
        info!(
            "MapNote Teleport loaded, commands: {}",
            config.global.commands.join(", ")
        );

        MapNoteTeleport {
            host,
            config,
            lang,
            preferences,
            tracker: TeleportTracker::new(),
            pending_save: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    pub fn lang_mut(&mut self) -> &mut Lang {
        &mut self.lang
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn tracker(&self) -> &TeleportTracker {
        &self.tracker
    }

    pub fn pending_save(&self) -> Option<Instant> {
        self.pending_save
    }

    /// Called once the server has finished starting.
    pub fn on_server_initialized(&mut self) {
        if self.config.global.commands.is_empty() {
            info!("No commands configured, falling back to `mnt`");
            self.config.global.commands = vec!["mnt".to_string()];
            if let Err(err) = self.config.save_commands(&mut self.host) {
                error!("Failed to write the configuration file: {}", err);
            }
        }
    }

    /// Schedules a data save at a random point in the next minute. Returns
    /// when the save will happen.
    pub fn on_server_save(&mut self, now: Instant) -> Instant {
        let delay = rand::rng().random_range(0.0..SAVE_JITTER_SECS);
        let at = now + secs(delay);
        let at = match self.pending_save {
            Some(pending) if pending <= at => pending,
            _ => at,
        };
        debug!("Player data save scheduled in {:?}", at.saturating_duration_since(now));
        self.pending_save = Some(at);
        at
    }

    /// Expires finished windows and runs a scheduled save when it is due.
    pub fn tick(&mut self, now: Instant) {
        let expired = self.tracker.sweep(now);
        for player in expired.protections {
            self.notify(player, MessageKey::GodModeEnded, &[]);
        }
        for player in expired.cooldowns {
            self.notify(player, MessageKey::CooldownEnded, &[]);
        }

        if self.pending_save.is_some_and(|at| at <= now) {
            self.pending_save = None;
            self.save_data();
        }
    }

    /// Closes any cooldown or protection window the player still has open.
    pub fn on_player_disconnected(&mut self, player: PlayerId) {
        self.tracker.forget(player);
    }

    pub fn unload(&mut self) {
        self.pending_save = None;
        self.save_data();
    }

    pub fn save_data(&mut self) {
        match self.preferences.save(&mut self.host) {
            Ok(()) => debug!("Saved preferences for {} players", self.preferences.len()),
            Err(err) => error!("Failed to write player data: {}", err),
        }
    }

    /// Whether `player` may use map note teleports at all.
    pub fn can_use(&self, player: PlayerId) -> bool {
        let global = &self.config.global;
        !global.use_permission
            || self.host.has_permission(player, PERMISSION_USE)
            || (global.admins_allowed && self.host.is_admin(player))
    }

    /// The host reports a map note; `None` arguments come from note edits
    /// that are not placements. Returns `None` if no teleport was attempted.
    pub fn on_map_marker_added(
        &mut self,
        player: Option<PlayerId>,
        note: Option<&MapNote>,
        now: Instant,
    ) -> Option<TeleportOutcome> {
        let (player, note) = (player?, note?);
        if !note.world_position.is_finite() {
            warn!("Ignoring map note with invalid position from {}", player);
            return None;
        }
        if !self.can_use(player) {
            return None;
        }
        if !self.preferences.get(player).enabled {
            return None;
        }
        Some(self.teleport_to_note(player, note, now))
    }

    pub fn teleport_to_note(
        &mut self,
        player: PlayerId,
        note: &MapNote,
        now: Instant,
    ) -> TeleportOutcome {
        let prefs = self.preferences.get(player);
        let cooldown = clamp_cooldown(prefs.cooldown, self.config.cooldown_bounds());
        let window = TeleportWindow {
            cooldown: secs(cooldown),
            protection: self.config.protection_window(),
            flyhack_pause: self.config.global.maximum_cooldown,
        };

        let outcome = self
            .tracker
            .attempt_teleport(&mut self.host, player, note, window, now);
        match outcome {
            TeleportOutcome::Teleported { destination } => {
                let protection = self.config.global.godmode_cooldown;
                self.notify(
                    player,
                    MessageKey::Teleported,
                    &[&destination, &protection, &cooldown],
                );
            }
            TeleportOutcome::OnCooldown => {
                let remaining = self
                    .tracker
                    .cooldown_remaining(player, now)
                    .unwrap_or(Duration::ZERO);
                debug!("{} is on cooldown for another {:?}", player, remaining);
            }
            rejected => {
                if let Some(key) = rejected.rejection_message() {
                    let message = self.message(player, key, &[]);
                    self.print(player, &message);
                }
            }
        }
        outcome
    }

    /// Damage is about to be dealt to `player` (`None` for non-player
    /// entities).
    pub fn on_entity_take_damage(&mut self, player: Option<PlayerId>, now: Instant) -> DamageVerdict {
        if !self.tracker.damage_hook_active() {
            return DamageVerdict::Proceed;
        }
        match player {
            Some(player) if self.tracker.should_suppress_damage(player, now) => {
                DamageVerdict::Suppress
            }
            _ => DamageVerdict::Proceed,
        }
    }

    fn language(&self, player: PlayerId) -> Option<String> {
        self.host.player_info(player).and_then(|info| info.language)
    }

    pub(crate) fn message(&self, player: PlayerId, key: MessageKey, args: &[&dyn fmt::Display]) -> String {
        let language = self.language(player);
        self.lang.format(key, language.as_deref(), args)
    }

    /// Sends `message` with the configured prefix and chat icon.
    pub(crate) fn print(&mut self, player: PlayerId, message: &str) {
        let language = self.language(player);
        let prefix = self.lang.get_message(MessageKey::Prefix, language.as_deref());
        let text = chat::compose(prefix, message);
        self.host
            .send_chat(player, self.config.chat.steam_id_icon, &text);
    }

    /// Prints `key` if the player is online and wants notifications.
    fn notify(&mut self, player: PlayerId, key: MessageKey, args: &[&dyn fmt::Display]) {
        if !self.preferences.get(player).notification || self.host.player_info(player).is_none() {
            return;
        }
        let message = self.message(player, key, args);
        self.print(player, &message);
    }
}
