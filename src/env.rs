//! Environment-driven configuration knobs: parsing a level name out of an
//! environment variable, generalized to this crate's open `Levels` table
//! instead of a fixed six-variant enum.

use std::env;

use crate::level::{Level, Levels};

/// Parse a level name (case-insensitively) against `levels`' anchor table.
///
/// Returns `None` for anything that doesn't match one of the six anchors.
/// A custom registered level is matched by exact name through `Levels`
/// itself rather than through this anchor-only shortcut.
pub fn parse_anchor_name(levels: &Levels, name: &str) -> Option<Level> {
    match name.to_ascii_uppercase().as_str() {
        "TRACE" => Some(levels.trace()),
        "DEBUG" => Some(levels.debug()),
        "INFO" => Some(levels.info()),
        "WARN" | "WARNING" => Some(levels.warn()),
        "ERROR" => Some(levels.error()),
        "FATAL" | "CRITICAL" => Some(levels.fatal()),
        _ => None,
    }
}

/// Read `var`, parse it as a level name against `levels`, and fall back to
/// `default` if the variable is unset or doesn't match. Mirrors the
/// `RUST_LOG`-style env-var convention without pulling in `env_logger`'s
/// full directive grammar, which this crate's open level space doesn't need.
pub fn level_from_env(var: &str, levels: &Levels, default: Level) -> Level {
    match env::var(var) {
        Ok(value) => parse_anchor_name(levels, &value).unwrap_or(default),
        Err(_) => default,
    }
}

/// True unless `NO_COLOR` is set to a non-empty value. Thin wrapper kept
/// alongside [`crate::color::default_colorizer`] so callers who only need
/// the boolean don't have to construct a colorizer to get it.
pub fn color_enabled() -> bool {
    match env::var("NO_COLOR") {
        Ok(v) => v.is_empty(),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_names_are_case_insensitive() {
        let levels = Levels::new();
        assert_eq!(parse_anchor_name(&levels, "info"), Some(levels.info()));
        assert_eq!(parse_anchor_name(&levels, "WARN"), Some(levels.warn()));
        assert_eq!(parse_anchor_name(&levels, "warning"), Some(levels.warn()));
    }

    #[test]
    fn unknown_name_parses_to_none() {
        let levels = Levels::new();
        assert_eq!(parse_anchor_name(&levels, "verbose"), None);
    }

    #[test]
    fn missing_env_var_falls_back_to_default() {
        let levels = Levels::new();
        env::remove_var("SIGNALSTACK_TEST_LEVEL_UNSET");
        let level = level_from_env("SIGNALSTACK_TEST_LEVEL_UNSET", &levels, levels.info());
        assert_eq!(level, levels.info());
    }
}
