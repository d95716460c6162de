use crate::host::ConfigStore;
use crate::utils::secs;
use serde::{Deserialize, Serialize};
use std::io;
use std::time::Duration;
use thiserror::Error;
use toml_edit::{value, Array, DocumentMut, Item, Table};
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config is not valid toml")]
    Parse(#[from] toml_edit::TomlError),

    #[error("config section `{0}` is not a table")]
    NotATable(&'static str),

    #[error("config contains invalid values")]
    Deserialize(#[from] toml::de::Error),

    #[error("config serialization error")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

trait ConfigSerializeDefault {
    fn fix_config(self, name: &str, table: &mut Table);
}

macro_rules! impl_simple_default {
    ( $( $type:ty ),* ) => {
        $(
            impl ConfigSerializeDefault for $type {
                fn fix_config(self, name: &str, table: &mut Table) {
                    table.entry(name).or_insert_with(|| value(self));
                }
            }
        )*
    }
}

impl_simple_default!(String, i64, f64, bool);

impl ConfigSerializeDefault for f32 {
    fn fix_config(self, name: &str, table: &mut Table) {
        (self as f64).fix_config(name, table);
    }
}

impl ConfigSerializeDefault for u64 {
    fn fix_config(self, name: &str, table: &mut Table) {
        i64::try_from(self).unwrap_or(i64::MAX).fix_config(name, table);
    }
}

impl ConfigSerializeDefault for Vec<String> {
    fn fix_config(self, name: &str, table: &mut Table) {
        table.entry(name).or_insert_with(|| {
            let mut array = Array::new();
            for item in self {
                array.push(item);
            }
            value(array)
        });
    }
}

macro_rules! gen_config_section {
    (
        $(#[$meta:meta])*
        $section:ident in $key:literal {
            $( $(#[$field_meta:meta])* $name:ident: $type:ty = $default:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
        pub struct $section {
            $(
                $(#[$field_meta])*
                pub $name: $type,
            )*
        }

        impl Default for $section {
            fn default() -> Self {
                Self {
                    $( $name: $default, )*
                }
            }
        }

        impl $section {
            const KEY: &'static str = $key;

            fn fix_config(doc: &mut DocumentMut) -> Result<(), ConfigError> {
                let table = doc
                    .entry(Self::KEY)
                    .or_insert_with(|| Item::Table(Table::new()))
                    .as_table_mut()
                    .ok_or(ConfigError::NotATable(Self::KEY))?;
                $(
                    <$type as ConfigSerializeDefault>::fix_config($default, stringify!($name), table);
                )*
                Ok(())
            }
        }
    };
}

gen_config_section! {
    GlobalSettings in "global" {
        use_permission: bool = true,
        admins_allowed: bool = true,
        default_enabled: bool = true,
        default_cooldown: f32 = 10.0,
        maximum_cooldown: f32 = 15.0,
        minimum_cooldown: f32 = 5.0,
        /// Seconds of damage immunity after a teleport.
        godmode_cooldown: f32 = 5.0,
        commands: Vec<String> = vec!["mnt".to_string(), "mapnoteteleport".to_string()]
    }
}

gen_config_section! {
    ChatSettings in "chat" {
        /// Steam id whose avatar is shown next to plugin chat messages.
        steam_id_icon: u64 = 0,
        default_notification: bool = true
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct PluginConfig {
    pub global: GlobalSettings,
    pub chat: ChatSettings,
}

impl PluginConfig {
    /// Parses `existing`, filling in any missing keys with their defaults.
    /// Returns the patched document alongside the parsed config.
    pub fn parse(existing: &str) -> Result<(String, PluginConfig), ConfigError> {
        let mut doc = existing.parse::<DocumentMut>()?;
        GlobalSettings::fix_config(&mut doc)?;
        ChatSettings::fix_config(&mut doc)?;

        let patched = doc.to_string();
        let config = toml::from_str(&patched)?;
        Ok((patched, config))
    }

    /// Loads the config from `store`. A missing or corrupt config is replaced
    /// with the defaults, which are written back.
    pub fn load(store: &mut (impl ConfigStore + ?Sized)) -> PluginConfig {
        let existing = match store.read_config() {
            Ok(existing) => existing,
            Err(err) => {
                error!("Failed to read the configuration file: {}", err);
                None
            }
        };
        let Some(existing) = existing else {
            warn!("Creating a new configuration file");
            return Self::reset(store);
        };

        match PluginConfig::parse(&existing) {
            Ok((patched, config)) => {
                if patched != existing {
                    info!("Added missing keys to the configuration file");
                    if let Err(err) = store.write_config(&patched) {
                        error!("Failed to write the configuration file: {}", err);
                    }
                }
                config
            }
            Err(err) => {
                error!("The configuration file is corrupted: {}", err);
                warn!("Creating a new configuration file");
                Self::reset(store)
            }
        }
    }

    fn reset(store: &mut (impl ConfigStore + ?Sized)) -> PluginConfig {
        let config = PluginConfig::default();
        if let Err(err) = config.save(store) {
            error!("Failed to write the configuration file: {}", err);
        }
        config
    }

    pub fn save(&self, store: &mut (impl ConfigStore + ?Sized)) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        store.write_config(&contents)?;
        Ok(())
    }

    /// Writes the current command aliases into the stored document, leaving
    /// the rest of it (comments included) as it is. Without a stored document
    /// the whole config is saved.
    pub fn save_commands(&self, store: &mut (impl ConfigStore + ?Sized)) -> Result<(), ConfigError> {
        let Some(existing) = store.read_config()? else {
            return self.save(store);
        };
        let mut doc = existing.parse::<DocumentMut>()?;
        let table = doc
            .entry(GlobalSettings::KEY)
            .or_insert_with(|| Item::Table(Table::new()))
            .as_table_mut()
            .ok_or(ConfigError::NotATable(GlobalSettings::KEY))?;

        let mut commands = Array::new();
        for command in &self.global.commands {
            commands.push(command.as_str());
        }
        table.insert("commands", value(commands));
        store.write_config(&doc.to_string())?;
        Ok(())
    }

    pub fn protection_window(&self) -> Duration {
        secs(self.global.godmode_cooldown)
    }

    /// `(minimum, maximum)` allowed for a custom cooldown.
    pub fn cooldown_bounds(&self) -> (f32, f32) {
        let GlobalSettings {
            minimum_cooldown,
            maximum_cooldown,
            ..
        } = self.global;
        if minimum_cooldown <= maximum_cooldown {
            (minimum_cooldown, maximum_cooldown)
        } else {
            (maximum_cooldown, minimum_cooldown)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StringStore {
        contents: Option<String>,
        writes: usize,
    }

    impl ConfigStore for StringStore {
        fn read_config(&self) -> io::Result<Option<String>> {
            Ok(self.contents.clone())
        }

        fn write_config(&mut self, contents: &str) -> io::Result<()> {
            self.contents = Some(contents.to_string());
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn save_commands_keeps_comments() {
        let mut store = StringStore {
            contents: Some(
                "# my server\n[global]\n# short alias only\ndefault_cooldown = 12.0\ncommands = []\n"
                    .to_string(),
            ),
            writes: 0,
        };
        let mut config = PluginConfig::load(&mut store);
        config.global.commands = vec!["mnt".to_string()];
        config.save_commands(&mut store).unwrap();

        let written = store.contents.unwrap();
        assert!(written.contains("# my server"));
        assert!(written.contains("# short alias only"));
        assert!(written.contains("default_cooldown = 12.0"));
        let (_, reparsed) = PluginConfig::parse(&written).unwrap();
        assert_eq!(reparsed.global.commands, vec!["mnt".to_string()]);
    }

    #[test]
    fn save_commands_without_document_saves_everything() {
        let mut store = StringStore::default();
        PluginConfig::default().save_commands(&mut store).unwrap();
        let (_, reparsed) = PluginConfig::parse(store.contents.as_deref().unwrap()).unwrap();
        assert_eq!(reparsed, PluginConfig::default());
    }

    #[test]
    fn missing_config_writes_defaults() {
        let mut store = StringStore::default();
        let config = PluginConfig::load(&mut store);
        assert_eq!(config, PluginConfig::default());
        assert_eq!(store.writes, 1);

        let (_, reparsed) = PluginConfig::parse(store.contents.as_deref().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn missing_keys_are_patched_and_comments_kept() {
        let mut store = StringStore {
            contents: Some("# my server\n[global]\ndefault_cooldown = 12.0\n".to_string()),
            writes: 0,
        };
        let config = PluginConfig::load(&mut store);
        assert_eq!(config.global.default_cooldown, 12.0);
        assert_eq!(config.global.maximum_cooldown, 15.0);
        assert!(config.chat.default_notification);

        let written = store.contents.unwrap();
        assert!(written.starts_with("# my server"));
        assert!(written.contains("godmode_cooldown"));
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn complete_config_is_not_rewritten() {
        let (patched, _) = PluginConfig::parse("").unwrap();
        let mut store = StringStore {
            contents: Some(patched),
            writes: 0,
        };
        PluginConfig::load(&mut store);
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn corrupt_config_is_replaced() {
        let mut store = StringStore {
            contents: Some("[global\nnot toml at all".to_string()),
            writes: 0,
        };
        let config = PluginConfig::load(&mut store);
        assert_eq!(config, PluginConfig::default());
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn wrong_value_type_is_corrupt() {
        assert!(matches!(
            PluginConfig::parse("[global]\nuse_permission = \"yes\"\n"),
            Err(ConfigError::Deserialize(_))
        ));
        assert!(matches!(
            PluginConfig::parse("global = 3\n"),
            Err(ConfigError::NotATable("global"))
        ));
    }

    #[test]
    fn cooldown_bounds_are_ordered() {
        let mut config = PluginConfig::default();
        assert_eq!(config.cooldown_bounds(), (5.0, 15.0));
        config.global.minimum_cooldown = 20.0;
        assert_eq!(config.cooldown_bounds(), (15.0, 20.0));
    }
}
