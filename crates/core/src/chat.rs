/// Builds the final chat line: the prefix (when there is one) in front of the
/// message, with a trailing `</color>` closing the prefix's color tag.
pub fn compose(prefix: &str, message: &str) -> String {
    let mut text = String::with_capacity(prefix.len() + message.len() + 8);
    text.push_str(prefix);
    text.push_str(message);
    text.push_str("</color>");
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::MessageKey;
    use mapnote_text::strip_tags;

    #[test]
    fn with_default_prefix() {
        let line = compose(MessageKey::Prefix.default_template(), "Hello");
        assert!(line.starts_with("<color=#BDC3C7>[ "));
        assert!(line.ends_with("Hello</color>"));
        assert_eq!(strip_tags(&line), "[ Strangeland ] Hello");
    }

    #[test]
    fn empty_prefix() {
        assert_eq!(compose("", "Hello"), "Hello</color>");
    }
}
