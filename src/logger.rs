//! The `Logger` facade: a cheaply-cloneable handle that turns a
//! `(ctx, level, text)` triple into a [`Message`], and that can be derived
//! into a child carrying extra bound attributes, a tighter filter, or a new
//! prefix without touching the config it was built from.

use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use std::sync::Arc;

use crate::attr::Attr;
use crate::config::{Config, ConfigSource, StaticConfig};
use crate::ctx::Ctx;
use crate::level::{Level, LevelFilter, Levels};
use crate::message::Message;

#[derive(Clone)]
pub struct Logger {
    config: Arc<dyn ConfigSource>,
    prefix: Arc<str>,
    bound: Arc<Vec<Attr>>,
}

impl Logger {
    /// Build a logger over an unchanging config. Most callers start here;
    /// reach for [`Logger::from_source`] to plug in a [`crate::config::DerivedConfig`]
    /// that can be retuned later.
    pub fn new(config: Arc<Config>) -> Self {
        Self::from_source(Arc::new(StaticConfig::new(config)))
    }

    pub fn from_source(config: Arc<dyn ConfigSource>) -> Self {
        Logger {
            config,
            prefix: Arc::from(""),
            bound: Arc::new(Vec::new()),
        }
    }

    pub fn levels(&self) -> Arc<Levels> {
        self.config.snapshot().levels.clone()
    }

    /// Pure `(ctx, level)` predicate, taking exactly one config snapshot.
    pub fn is_active(&self, ctx: &Ctx, level: Level) -> bool {
        self.config.snapshot().filter.is_active(ctx, level)
    }

    /// The one place the writer list is walked and bound attributes
    /// replayed, given a `Config` snapshot the caller already took. Both
    /// `emit` and `log_with` take exactly one snapshot per message and
    /// pass it in here, so a single message only ever sees one snapshot
    /// even if a concurrent `DerivedConfig::store` happens mid-call.
    fn emit_from_snapshot(
        &self,
        cfg: &Arc<Config>,
        ctx: &Ctx,
        ts: DateTime<Utc>,
        level: Level,
        text: &str,
    ) -> Message {
        if cfg.filter.is_inactive(ctx, level) {
            return Message::new_event(ctx.clone(), ts, level, SmallVec::new());
        }
        let level_name = cfg.levels.name(level);
        let mut writers = SmallVec::new();
        for writer_config in &cfg.writers {
            if let Some(mut writer) = writer_config.writer_for_new_message(ctx, level) {
                writer.begin_message(ts, level, &level_name, &self.prefix, text);
                writers.push((writer_config.sink_kind(), writer));
            }
        }
        let mut message = Message::new_event(ctx.clone(), ts, level, writers);
        for attr in self.bound.iter() {
            message.replay_attr(attr);
        }
        message
    }

    fn emit(
        &self,
        ctx: &Ctx,
        ts: DateTime<Utc>,
        level_of: impl FnOnce(&Levels) -> Level,
        text: &str,
    ) -> Message {
        let cfg = self.config.snapshot();
        let level = level_of(&cfg.levels);
        self.emit_from_snapshot(&cfg, ctx, ts, level, text)
    }

    pub fn new_message(&self, ctx: &Ctx, level: Level, text: &str) -> Message {
        self.emit(ctx, Utc::now(), |_| level, text)
    }

    pub fn new_message_at(&self, ctx: &Ctx, ts: DateTime<Utc>, level: Level, text: &str) -> Message {
        self.emit(ctx, ts, |_| level, text)
    }

    pub fn trace(&self, ctx: &Ctx, text: &str) -> Message {
        self.emit(ctx, Utc::now(), Levels::trace, text)
    }

    pub fn debug(&self, ctx: &Ctx, text: &str) -> Message {
        self.emit(ctx, Utc::now(), Levels::debug, text)
    }

    pub fn info(&self, ctx: &Ctx, text: &str) -> Message {
        self.emit(ctx, Utc::now(), Levels::info, text)
    }

    pub fn warn(&self, ctx: &Ctx, text: &str) -> Message {
        self.emit(ctx, Utc::now(), Levels::warn, text)
    }

    pub fn error(&self, ctx: &Ctx, text: &str) -> Message {
        self.emit(ctx, Utc::now(), Levels::error, text)
    }

    pub fn fatal(&self, ctx: &Ctx, text: &str) -> Message {
        self.emit(ctx, Utc::now(), Levels::fatal, text)
    }

    /// Lazily-formatted variants. `make_text` only runs if at least one
    /// sink is active. Rust has no variadic formatting verbs, so the
    /// natural translation of "only format on the active path" is a
    /// closure the active-check gates.
    pub fn trace_with(&self, ctx: &Ctx, make_text: impl FnOnce() -> String) -> Message {
        self.log_with(ctx, Levels::trace, make_text)
    }

    pub fn debug_with(&self, ctx: &Ctx, make_text: impl FnOnce() -> String) -> Message {
        self.log_with(ctx, Levels::debug, make_text)
    }

    pub fn info_with(&self, ctx: &Ctx, make_text: impl FnOnce() -> String) -> Message {
        self.log_with(ctx, Levels::info, make_text)
    }

    pub fn warn_with(&self, ctx: &Ctx, make_text: impl FnOnce() -> String) -> Message {
        self.log_with(ctx, Levels::warn, make_text)
    }

    pub fn error_with(&self, ctx: &Ctx, make_text: impl FnOnce() -> String) -> Message {
        self.log_with(ctx, Levels::error, make_text)
    }

    pub fn fatal_with(&self, ctx: &Ctx, make_text: impl FnOnce() -> String) -> Message {
        self.log_with(ctx, Levels::fatal, make_text)
    }

    /// Takes exactly one `Config` snapshot and reuses it for both the
    /// active check and the write-through, so `make_text` running between
    /// them can't observe a config that has since been swapped out from
    /// under the active check.
    fn log_with(
        &self,
        ctx: &Ctx,
        level_of: impl Fn(&Levels) -> Level,
        make_text: impl FnOnce() -> String,
    ) -> Message {
        let cfg = self.config.snapshot();
        let level = level_of(&cfg.levels);
        if cfg.filter.is_inactive(ctx, level) {
            return Message::new_event(ctx.clone(), Utc::now(), level, SmallVec::new());
        }
        let text = make_text();
        self.emit_from_snapshot(&cfg, ctx, Utc::now(), level, &text)
    }

    /// Start a recording-mode builder for `sub_logger()`.
    pub fn with(&self) -> Message {
        Message::new_recorder(Ctx::new())
    }

    /// Attach attributes directly, skipping the `with()`/`sub_logger()`
    /// round trip.
    pub fn with_values(&self, attrs: Vec<Attr>) -> Logger {
        self.derive_with_attrs(attrs)
    }

    pub(crate) fn derive_with_attrs(&self, extra: Vec<Attr>) -> Logger {
        let mut combined = (*self.bound).clone();
        combined.extend(extra);
        Logger {
            config: self.config.clone(),
            prefix: self.prefix.clone(),
            bound: Arc::new(combined),
        }
    }

    pub fn with_prefix(&self, prefix: &str) -> Logger {
        Logger {
            config: self.config.clone(),
            prefix: Arc::from(prefix),
            bound: self.bound.clone(),
        }
    }

    /// Derive a child that additionally requires `filter` to admit a level
    /// (intersected with whatever filter the pointed-to config carries).
    pub fn with_level_filter(&self, filter: LevelFilter) -> Logger {
        Logger {
            config: Arc::new(OverlayFilter {
                inner: self.config.clone(),
                extra: filter,
            }),
            prefix: self.prefix.clone(),
            bound: self.bound.clone(),
        }
    }

    /// Attach this logger to `ctx` so a callee that only has the context
    /// can still retrieve the right logger.
    pub fn add_to_context(&self, ctx: &Ctx) -> Ctx {
        ctx.with_logger(self.clone())
    }

    pub fn from_context(ctx: &Ctx) -> Option<&Logger> {
        ctx.logger()
    }
}

struct OverlayFilter {
    inner: Arc<dyn ConfigSource>,
    extra: LevelFilter,
}

impl ConfigSource for OverlayFilter {
    fn snapshot(&self) -> Arc<Config> {
        let base = self.inner.snapshot();
        Arc::new(Config {
            levels: base.levels.clone(),
            filter: LevelFilter::join([base.filter.clone(), self.extra.clone()]),
            writers: base.writers.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Levels;

    fn base_logger(filter: LevelFilter) -> Logger {
        let cfg = Arc::new(Config::new(Arc::new(Levels::new()), filter, vec![]));
        Logger::new(cfg)
    }

    #[test]
    fn disabled_level_yields_an_inactive_message() {
        let logger = base_logger(LevelFilter::none());
        let ctx = Ctx::new();
        let msg = logger.info(&ctx, "hello");
        assert!(!msg.is_active());
    }

    #[test]
    fn with_level_filter_narrows_without_mutating_the_parent() {
        let parent = base_logger(LevelFilter::all());
        let child = parent.with_level_filter(LevelFilter::filter_out_below(4));
        let ctx = Ctx::new();
        assert!(!child.is_active(&ctx, 0));
        assert!(parent.is_active(&ctx, 0));
    }

    #[test]
    fn with_values_binds_attributes_for_future_messages() {
        let parent = base_logger(LevelFilter::all());
        let child = parent.with_values(vec![Attr::Scalar {
            key: "svc".into(),
            value: crate::attr::Value::Str("auth".into()),
        }]);
        assert_eq!(child.bound.len(), 1);
        assert_eq!(parent.bound.len(), 0);
    }

    #[test]
    fn sub_logger_inherits_prefix() {
        let parent = base_logger(LevelFilter::all()).with_prefix("svc");
        let builder = parent.with().str("k", "v");
        let child = builder.sub_logger(&parent);
        assert_eq!(&*child.prefix, "svc");
    }
}
