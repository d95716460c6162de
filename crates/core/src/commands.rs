use crate::host::Host;
use crate::lang::MessageKey;
use crate::player::PlayerId;
use crate::plugin::MapNoteTeleport;
use tracing::debug;

impl<H: Host> MapNoteTeleport<H> {
    /// Whether `command` is one of the configured aliases.
    pub fn is_command(&self, command: &str) -> bool {
        self.config
            .global
            .commands
            .iter()
            .any(|alias| alias.eq_ignore_ascii_case(command))
    }

    /// Handles `/mnt [cooldown <seconds> | notify]`. Returns false if
    /// `command` is not ours.
    ///
    /// Players without permission are ignored without a reply.
    pub fn handle_command(&mut self, player: PlayerId, command: &str, args: &[&str]) -> bool {
        if !self.is_command(command) {
            return false;
        }
        if !self.can_use(player) {
            debug!("{} used /{} without permission", player, command);
            return true;
        }

        match args {
            ["cooldown" | "cd", value] => match value.parse::<f32>() {
                Ok(seconds) if seconds.is_finite() => {
                    self.set_cooldown(player, seconds);
                }
                _ => self.send_cooldown_limits(player),
            },
            ["cooldown" | "cd"] => self.send_cooldown_limits(player),
            ["notify" | "notification"] => {
                self.toggle_notification(player);
            }
            // Anything else toggles, like the bare command.
            _ => {
                self.toggle_enabled(player);
            }
        }
        true
    }

    fn state_label(&self, player: PlayerId, enabled: bool) -> String {
        let key = if enabled {
            MessageKey::Enabled
        } else {
            MessageKey::Disabled
        };
        self.message(player, key, &[])
    }

    /// Flips whether placing a map note teleports the player. Returns the new
    /// state.
    pub fn toggle_enabled(&mut self, player: PlayerId) -> bool {
        let enabled = self.preferences.toggle_enabled(player);
        let label = self.state_label(player, enabled);
        let message = self.message(player, MessageKey::MapNoteTeleport, &[&label]);
        self.print(player, &message);
        enabled
    }

    /// Returns the new state.
    pub fn toggle_notification(&mut self, player: PlayerId) -> bool {
        let notification = self.preferences.toggle_notification(player);
        let label = self.state_label(player, notification);
        let message = self.message(player, MessageKey::MapNoteTeleportNotification, &[&label]);
        self.print(player, &message);
        notification
    }

    /// Stores a custom cooldown, clamped to the configured bounds. Returns the
    /// stored value.
    pub fn set_cooldown(&mut self, player: PlayerId, seconds: f32) -> f32 {
        let cooldown = self
            .preferences
            .set_cooldown(player, seconds, self.config.cooldown_bounds());
        let message = self.message(player, MessageKey::MapNoteTeleportCooldown, &[&cooldown]);
        self.print(player, &message);
        cooldown
    }

    fn send_cooldown_limits(&mut self, player: PlayerId) {
        let (min, max) = self.config.cooldown_bounds();
        let message = self.message(player, MessageKey::MapNoteTeleportCooldownLimit, &[&min, &max]);
        self.print(player, &message);
    }
}
