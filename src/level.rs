//! Level and level-filter primitives.
//!
//! Levels are small signed integers rather than an enum so that callers can
//! define levels between (or outside) the conventional anchors without
//! touching this crate. `LevelFilter` composes by intersection and never
//! looks past the `(ctx, level)` pair it is handed. Context opt-out lives
//! one layer up, in the sink itself.

use ahash::AHashMap;
use std::sync::Arc;

use crate::ctx::Ctx;

/// A log level. Negative values are more verbose than [`Levels::trace`].
pub type Level = i8;

/// Lowest level representable in the bitmap filter.
pub const MIN_BITMAP_LEVEL: Level = -32;
/// Highest level representable in the bitmap filter.
pub const MAX_BITMAP_LEVEL: Level = 31;

/// Immutable anchor-level table shared by every `Config` derived from it.
///
/// The six anchors (`trace` .. `fatal`) are the only levels most callers
/// need, but the table also accepts arbitrary custom levels via
/// [`Levels::with_custom`] so that a level outside the anchor set still
/// renders a name instead of a bare integer.
#[derive(Debug, Clone)]
pub struct Levels {
    trace: Level,
    debug: Level,
    info: Level,
    warn: Level,
    error: Level,
    fatal: Level,
    names: AHashMap<Level, String>,
}

impl Default for Levels {
    fn default() -> Self {
        Self::new()
    }
}

impl Levels {
    /// The conventional anchor table: `Trace(-8) < Debug(-4) < Info(0) < Warn(4) < Error(8) < Fatal(12)`.
    ///
    /// The gaps leave room for intermediate custom levels (e.g. a `Notice`
    /// between `Info` and `Warn`) without renumbering the anchors.
    pub fn new() -> Self {
        let mut names = AHashMap::new();
        names.insert(-8, "TRACE".to_string());
        names.insert(-4, "DEBUG".to_string());
        names.insert(0, "INFO".to_string());
        names.insert(4, "WARN".to_string());
        names.insert(8, "ERROR".to_string());
        names.insert(12, "FATAL".to_string());
        Levels {
            trace: -8,
            debug: -4,
            info: 0,
            warn: 4,
            error: 8,
            fatal: 12,
            names,
        }
    }

    /// Build a table with caller-chosen anchor values and an arbitrary
    /// number of additional named levels. Used when the six conventional
    /// anchors don't fit a domain (e.g. syslog's eight severities).
    pub fn with_custom(
        trace: Level,
        debug: Level,
        info: Level,
        warn: Level,
        error: Level,
        fatal: Level,
        extra_names: impl IntoIterator<Item = (Level, String)>,
    ) -> Self {
        let mut names = AHashMap::new();
        names.insert(trace, "TRACE".to_string());
        names.insert(debug, "DEBUG".to_string());
        names.insert(info, "INFO".to_string());
        names.insert(warn, "WARN".to_string());
        names.insert(error, "ERROR".to_string());
        names.insert(fatal, "FATAL".to_string());
        for (level, name) in extra_names {
            names.insert(level, name);
        }
        Levels {
            trace,
            debug,
            info,
            warn,
            error,
            fatal,
            names,
        }
    }

    pub fn trace(&self) -> Level {
        self.trace
    }
    pub fn debug(&self) -> Level {
        self.debug
    }
    pub fn info(&self) -> Level {
        self.info
    }
    pub fn warn(&self) -> Level {
        self.warn
    }
    pub fn error(&self) -> Level {
        self.error
    }
    pub fn fatal(&self) -> Level {
        self.fatal
    }

    /// Render a level's name, falling back to `LVL<n>` for unregistered
    /// levels rather than failing.
    pub fn name(&self, level: Level) -> String {
        match self.names.get(&level) {
            Some(n) => n.clone(),
            None => format!("LVL{level}"),
        }
    }
}

fn bit_index(level: Level) -> Option<u32> {
    if (MIN_BITMAP_LEVEL..=MAX_BITMAP_LEVEL).contains(&level) {
        Some((level as i16 - MIN_BITMAP_LEVEL as i16) as u32)
    } else {
        None
    }
}

/// A predicate over `(context, level)` deciding whether a message is
/// materialized. Cheap to clone: the `Join` variant shares its member list
/// via `Arc` rather than copying it.
#[derive(Debug, Clone)]
pub enum LevelFilter {
    /// Admits every level in `-32..=31` (and, conservatively, anything
    /// outside that window) whose corresponding bit is set.
    Bitmap(u64),
    /// Admits `level >= threshold` (or `level <= threshold` when `dual` is
    /// set) regardless of the bitmap window.
    Threshold { threshold: Level, dual: bool },
    /// Intersection of member filters: admits a level iff every member does.
    Join(Arc<[LevelFilter]>),
}

impl LevelFilter {
    /// The canonical "all active" filter.
    pub fn all() -> Self {
        LevelFilter::Bitmap(u64::MAX)
    }

    /// The canonical "nothing active" filter.
    pub fn none() -> Self {
        LevelFilter::Bitmap(0)
    }

    /// A single level.
    pub fn only(level: Level) -> Self {
        match bit_index(level) {
            Some(bit) => LevelFilter::Bitmap(1u64 << bit),
            None => LevelFilter::none(),
        }
    }

    /// Admits `level >= threshold`.
    pub fn filter_out_below(threshold: Level) -> Self {
        LevelFilter::Threshold {
            threshold,
            dual: false,
        }
    }

    /// Admits `level <= threshold`.
    pub fn filter_out_above(threshold: Level) -> Self {
        LevelFilter::Threshold {
            threshold,
            dual: true,
        }
    }

    /// Intersect several filters. A level must pass every member to be
    /// admitted by the result.
    pub fn join(filters: impl IntoIterator<Item = LevelFilter>) -> Self {
        LevelFilter::Join(filters.into_iter().collect::<Vec<_>>().into())
    }

    /// Pure predicate on `(ctx, level)`. `ctx` is accepted (rather than
    /// ignored outright) so application-layer filters built on top of this
    /// type can inspect it; the built-in variants never do.
    pub fn is_active(&self, ctx: &Ctx, level: Level) -> bool {
        match self {
            LevelFilter::Bitmap(bits) => match bit_index(level) {
                Some(bit) => (bits >> bit) & 1 == 1,
                // Levels outside the representable window are conservatively
                // treated as active; a caller relying on the bitmap for such
                // levels should use a Threshold filter instead.
                None => true,
            },
            LevelFilter::Threshold { threshold, dual } => {
                if *dual {
                    level <= *threshold
                } else {
                    level >= *threshold
                }
            }
            LevelFilter::Join(members) => members.iter().all(|f| f.is_active(ctx, level)),
        }
    }

    pub fn is_inactive(&self, ctx: &Ctx, level: Level) -> bool {
        !self.is_active(ctx, level)
    }
}
