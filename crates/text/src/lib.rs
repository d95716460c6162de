//! Rich text helpers for in-game chat.
//!
//! The game client renders a small subset of Unity rich text: `<color=#RRGGBB>`,
//! `<b>`, `<i>` and `<size=N>`. Message templates use positional `{0}` style
//! placeholders.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").unwrap());

static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?(?:color|b|i|size)(?:=[^>]*)?>").unwrap());

/// Replaces every `{n}` in `template` with the `n`th argument. Placeholders
/// without a matching argument are left untouched.
pub fn format_template(template: &str, args: &[&dyn fmt::Display]) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let idx: Option<usize> = caps[1].parse().ok();
            match idx.and_then(|idx| args.get(idx)) {
                Some(arg) => arg.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Removes rich text tags, leaving only the visible text.
pub fn strip_tags(text: &str) -> String {
    TAG_REGEX.replace_all(text, "").into_owned()
}
