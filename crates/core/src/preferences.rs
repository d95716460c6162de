use crate::config::PluginConfig;
use crate::host::DataStore;
use crate::player::PlayerId;
use mapnote_save_data::player_data::{DataSaveError, PlayerData, StoredData};
use tracing::{error, info, warn};

/// Clamps a requested cooldown into `[min, max]`.
pub fn clamp_cooldown(seconds: f32, (min, max): (f32, f32)) -> f32 {
    seconds.max(min).min(max)
}

/// Per-player preferences backed by the plugin data file.
#[derive(Debug, Clone)]
pub struct Preferences {
    data: StoredData,
    defaults: PlayerData,
}

impl Preferences {
    pub fn new(data: StoredData, defaults: PlayerData) -> Preferences {
        Preferences { data, defaults }
    }

    pub fn defaults_from(config: &PluginConfig) -> PlayerData {
        PlayerData {
            enabled: config.global.default_enabled,
            cooldown: config.global.default_cooldown,
            notification: config.chat.default_notification,
        }
    }

    /// Reads the data file. An unreadable file is treated as empty and a
    /// fresh one is written in its place.
    pub fn load(store: &mut (impl DataStore + ?Sized), defaults: PlayerData) -> Preferences {
        let data = match store.read_data() {
            Ok(Some(data)) => {
                info!("Loaded preferences for {} players", data.player_data.len());
                Some(data)
            }
            Ok(None) => None,
            Err(err) => {
                warn!("Player data could not be read, starting fresh: {}", err);
                None
            }
        };

        match data {
            Some(data) => Preferences::new(data, defaults),
            None => {
                let prefs = Preferences::new(StoredData::new(), defaults);
                if let Err(err) = prefs.save(store) {
                    error!("Failed to write player data: {}", err);
                }
                prefs
            }
        }
    }

    pub fn save(&self, store: &mut (impl DataStore + ?Sized)) -> Result<(), DataSaveError> {
        store.write_data(&self.data)
    }

    /// The player's record, or the defaults if they have never changed
    /// anything. Never creates a record.
    pub fn get(&self, player: PlayerId) -> PlayerData {
        self.data
            .player_data
            .get(&player)
            .copied()
            .unwrap_or(self.defaults)
    }

    pub fn is_stored(&self, player: PlayerId) -> bool {
        self.data.player_data.contains_key(&player)
    }

    pub fn get_mut(&mut self, player: PlayerId) -> &mut PlayerData {
        let defaults = self.defaults;
        self.data.player_data.entry(player).or_insert(defaults)
    }

    /// Returns the new value.
    pub fn toggle_enabled(&mut self, player: PlayerId) -> bool {
        let data = self.get_mut(player);
        data.enabled = !data.enabled;
        data.enabled
    }

    /// Returns the new value.
    pub fn toggle_notification(&mut self, player: PlayerId) -> bool {
        let data = self.get_mut(player);
        data.notification = !data.notification;
        data.notification
    }

    /// Stores `seconds` clamped to `bounds` and returns the stored value.
    pub fn set_cooldown(&mut self, player: PlayerId, seconds: f32, bounds: (f32, f32)) -> f32 {
        let cooldown = clamp_cooldown(seconds, bounds);
        self.get_mut(player).cooldown = cooldown;
        cooldown
    }

    pub fn len(&self) -> usize {
        self.data.player_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.player_data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapnote_save_data::player_data::DataLoadError;

    const DEFAULTS: PlayerData = PlayerData {
        enabled: true,
        cooldown: 10.0,
        notification: true,
    };

    struct BrokenStore {
        writes: Vec<StoredData>,
    }

    impl DataStore for BrokenStore {
        fn read_data(&self) -> Result<Option<StoredData>, DataLoadError> {
            Err(DataLoadError::TooNew(42))
        }

        fn write_data(&mut self, data: &StoredData) -> Result<(), DataSaveError> {
            self.writes.push(data.clone());
            Ok(())
        }
    }

    #[test]
    fn unreadable_store_starts_empty_and_is_rewritten() {
        let mut store = BrokenStore { writes: Vec::new() };
        let prefs = Preferences::load(&mut store, DEFAULTS);
        assert!(prefs.is_empty());
        assert_eq!(store.writes, vec![StoredData::new()]);
    }

    #[test]
    fn get_does_not_insert() {
        let prefs = Preferences::new(StoredData::new(), DEFAULTS);
        assert_eq!(prefs.get(1), DEFAULTS);
        assert!(!prefs.is_stored(1));
    }

    #[test]
    fn toggle_twice_is_identity() {
        let mut prefs = Preferences::new(StoredData::new(), DEFAULTS);
        assert!(!prefs.toggle_enabled(1));
        assert!(prefs.toggle_enabled(1));
        assert_eq!(prefs.get(1), DEFAULTS);
        assert!(prefs.is_stored(1));
    }

    #[test]
    fn cooldown_is_clamped() {
        let mut prefs = Preferences::new(StoredData::new(), DEFAULTS);
        assert_eq!(prefs.set_cooldown(1, 1.0, (5.0, 15.0)), 5.0);
        assert_eq!(prefs.set_cooldown(1, 99.0, (5.0, 15.0)), 15.0);
        assert_eq!(prefs.set_cooldown(1, 7.5, (5.0, 15.0)), 7.5);
        assert_eq!(prefs.get(1).cooldown, 7.5);
    }

    #[test]
    fn notification_toggle() {
        let mut prefs = Preferences::new(StoredData::new(), DEFAULTS);
        assert!(!prefs.toggle_notification(3));
        assert!(!prefs.get(3).notification);
        assert!(prefs.get(3).enabled);
    }
}
