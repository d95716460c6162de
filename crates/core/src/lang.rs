use mapnote_text::format_template;
use rustc_hash::FxHashMap;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

macro_rules! messages {
    ( $( $key:ident => $template:literal ),* $(,)? ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MessageKey {
            $( $key, )*
        }

        impl MessageKey {
            pub const ALL: &'static [MessageKey] = &[ $( MessageKey::$key, )* ];

            pub fn as_str(self) -> &'static str {
                match self {
                    $( MessageKey::$key => stringify!($key), )*
                }
            }

            pub fn from_name(name: &str) -> Option<MessageKey> {
                match name {
                    $( stringify!($key) => Some(MessageKey::$key), )*
                    _ => None,
                }
            }

            pub fn default_template(self) -> &'static str {
                match self {
                    $( MessageKey::$key => $template, )*
                }
            }
        }
    };
}

messages! {
    CooldownEnded => "Cooldown is now ended. You can teleport again.",
    GodModeEnded => "Godmode is now <color=#B22222>Disabled</color>.",
    Disabled => "<color=#B22222>Disabled</color>",
    Enabled => "<color=#228B22>Enabled</color>",
    MapNoteTeleport => "Teleporting to map marker is now {0}",
    MapNoteTeleportCooldown => "Teleporting to map marker Cooldown set to <color=#FFA500>{0}</color>s.",
    MapNoteTeleportCooldownLimit => "Teleporting to map marker Cooldown allowed is between <color=#FFA500>{0}</color>s and <color=#FFA500>{1}</color>s",
    MapNoteTeleportDead => "You can't teleport while being dead!",
    MapNoteTeleportMounted => "You can't teleport while seated!",
    MapNoteTeleportNotification => "Notification to chat is now {0}",
    NotAllowed => "You do not have permission to use this command!",
    Prefix => "<color=#BDC3C7>[ <color=#E74C3C>Strangeland</color> ] ",
    Teleported => "Teleported to <color=#FFA500>{0}</color>. Godmode is now <color=#228B22>Enabled</color> for <color=#FFA500>{1}</color>s. Teleport is on Cooldown for <color=#FFA500>{2}</color>s.",
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message catalog with per-language overrides on top of the English
/// defaults.
#[derive(Debug, Default, Clone)]
pub struct Lang {
    overrides: FxHashMap<String, FxHashMap<MessageKey, String>>,
}

impl Lang {
    pub fn new() -> Lang {
        Lang::default()
    }

    pub fn register_messages(
        &mut self,
        language: &str,
        messages: impl IntoIterator<Item = (MessageKey, String)>,
    ) {
        self.overrides
            .entry(language.to_lowercase())
            .or_default()
            .extend(messages);
    }

    /// Registers overrides from a JSON object of `{"Key": "template"}`.
    /// Unknown keys are skipped with a warning. Returns how many were taken.
    pub fn register_json(&mut self, language: &str, json: &str) -> Result<usize, serde_json::Error> {
        let raw: HashMap<String, String> = serde_json::from_str(json)?;
        let mut messages = Vec::with_capacity(raw.len());
        for (name, template) in raw {
            match MessageKey::from_name(&name) {
                Some(key) => messages.push((key, template)),
                None => warn!("Ignoring unknown message key `{}` for `{}`", name, language),
            }
        }
        let count = messages.len();
        self.register_messages(language, messages);
        Ok(count)
    }

    pub fn get_message(&self, key: MessageKey, language: Option<&str>) -> &str {
        language
            .and_then(|lang| self.overrides.get(&lang.to_lowercase()))
            .and_then(|messages| messages.get(&key))
            .map(String::as_str)
            .unwrap_or_else(|| key.default_template())
    }

    pub fn format(
        &self,
        key: MessageKey,
        language: Option<&str>,
        args: &[&dyn fmt::Display],
    ) -> String {
        format_template(self.get_message(key, language), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_language() {
        let lang = Lang::new();
        assert_eq!(
            lang.format(MessageKey::MapNoteTeleport, None, &[&"on"]),
            "Teleporting to map marker is now on"
        );
    }

    #[test]
    fn override_falls_back_per_key() {
        let mut lang = Lang::new();
        lang.register_messages(
            "DE",
            [(MessageKey::MapNoteTeleportDead, "Du bist tot!".to_string())],
        );
        assert_eq!(
            lang.get_message(MessageKey::MapNoteTeleportDead, Some("de")),
            "Du bist tot!"
        );
        assert_eq!(
            lang.get_message(MessageKey::MapNoteTeleportMounted, Some("de")),
            MessageKey::MapNoteTeleportMounted.default_template()
        );
        assert_eq!(
            lang.get_message(MessageKey::MapNoteTeleportDead, Some("fr")),
            MessageKey::MapNoteTeleportDead.default_template()
        );
    }

    #[test]
    fn json_overrides_skip_unknown_keys() {
        let mut lang = Lang::new();
        let count = lang
            .register_json("ru", r#"{ "Prefix": "", "NoSuchKey": "x" }"#)
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(lang.get_message(MessageKey::Prefix, Some("ru")), "");
    }

    #[test]
    fn key_names_round_trip() {
        for key in MessageKey::ALL {
            assert_eq!(MessageKey::from_name(key.as_str()), Some(*key));
        }
        assert_eq!(MessageKey::ALL.len(), 13);
    }
}
