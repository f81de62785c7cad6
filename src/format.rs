//! The `Format` descriptor consumed by both built-in sinks.

use regex::Regex;
use std::sync::OnceLock;

/// How a prefix and the user's message text are joined before being handed
/// to `Writer::begin_message`.
#[derive(Debug, Clone)]
pub enum PrefixJoin {
    /// `"{prefix}{sep}{text}"`. The default, and the one this crate's
    /// built-in sinks actually honor end to end.
    Concat(&'static str),
    /// A `{prefix}`/`{text}` template rendered with [`render_prefix_template`],
    /// e.g. `"[{prefix}] {text}"`. Sinks that don't special-case it fall
    /// back to simple concatenation with an empty separator.
    Template(&'static str),
}

impl Default for PrefixJoin {
    fn default() -> Self {
        PrefixJoin::Concat(": ")
    }
}

/// Metadata key names and timestamp layout for the built-in sinks.
///
/// An empty `timestamp_key` disables timestamp emission entirely.
#[derive(Debug, Clone)]
pub struct Format {
    pub timestamp_key: &'static str,
    pub timestamp_format: &'static str,
    pub level_key: &'static str,
    pub message_key: &'static str,
    pub prefix_join: PrefixJoin,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            timestamp_key: "ts",
            timestamp_format: "%Y-%m-%dT%H:%M:%S%.3fZ",
            level_key: "level",
            message_key: "message",
            prefix_join: PrefixJoin::default(),
        }
    }
}

impl Format {
    pub fn timestamp_enabled(&self) -> bool {
        !self.timestamp_key.is_empty()
    }

    /// Join `prefix` and `text` per `self.prefix_join`. Returns `text`
    /// unchanged if `prefix` is empty.
    pub fn join_prefix(&self, prefix: &str, text: &str) -> String {
        if prefix.is_empty() {
            return text.to_string();
        }
        match &self.prefix_join {
            PrefixJoin::Concat(sep) => format!("{prefix}{sep}{text}"),
            PrefixJoin::Template(tpl) => render_prefix_template(tpl, prefix, text),
        }
    }
}

fn prefix_template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{(prefix|text)\}").expect("static pattern compiles"))
}

/// Substitute `{prefix}`/`{text}` placeholders in `tpl`.
pub fn render_prefix_template(tpl: &str, prefix: &str, text: &str) -> String {
    prefix_template_re()
        .replace_all(tpl, |caps: &regex::Captures| match &caps[1] {
            "prefix" => prefix.to_string(),
            "text" => text.to_string(),
            _ => unreachable!(),
        })
        .into_owned()
}
