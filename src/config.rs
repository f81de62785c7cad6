//! `Config`, the effectively-immutable `(Levels, LevelFilter, [WriterConfig])`
//! aggregate, plus the `ConfigSource` indirection that lets a `Logger` be
//! retuned at runtime without reconstruction (`DerivedConfig`), and the
//! `MultiWriterConfig` fan-out combinator.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::ctx::Ctx;
use crate::error::{LogError, Result};
use crate::level::{Level, LevelFilter, Levels};
use crate::writer::{Writer, WriterConfig};

/// `(Levels, LevelFilter, ordered [WriterConfig])`. Once built, never
/// mutated. Retuning goes through [`DerivedConfig`] instead.
pub struct Config {
    pub levels: Arc<Levels>,
    pub filter: LevelFilter,
    pub writers: Vec<Arc<dyn WriterConfig>>,
}

impl Config {
    pub fn new(levels: Arc<Levels>, filter: LevelFilter, writers: Vec<Arc<dyn WriterConfig>>) -> Self {
        Config {
            levels,
            filter,
            writers,
        }
    }

    /// Same as [`Config::new`], but rejects a sink-less config.
    pub fn try_new(
        levels: Arc<Levels>,
        filter: LevelFilter,
        writers: Vec<Arc<dyn WriterConfig>>,
    ) -> Result<Self> {
        if writers.is_empty() {
            return Err(LogError::NilSink);
        }
        Ok(Self::new(levels, filter, writers))
    }

    /// Force a durable flush of every sink's backing resource.
    pub fn flush_all(&self) {
        for w in &self.writers {
            w.flush_underlying();
        }
    }
}

/// A live indirection to a `Config` snapshot. `Logger` holds one of these
/// (through the [`ConfigSource`] trait) rather than an `Arc<Config>`
/// directly, so that a single atomic swap retunes every logger built on it.
pub trait ConfigSource: Send + Sync {
    /// Read the current config exactly once per call. Callers are expected
    /// to call this once per message, not once per field, so a concurrent
    /// retune can't tear a single emission.
    fn snapshot(&self) -> Arc<Config>;
}

/// A `ConfigSource` that never changes. The common case for a process
/// that configures logging once at startup.
pub struct StaticConfig(Arc<Config>);

impl StaticConfig {
    pub fn new(config: Arc<Config>) -> Self {
        StaticConfig(config)
    }
}

impl ConfigSource for StaticConfig {
    fn snapshot(&self) -> Arc<Config> {
        self.0.clone()
    }
}

/// A `ConfigSource` that can be atomically repointed at a new `Config` at
/// runtime, optionally pinning its own filter regardless of what the
/// pointed-to config specifies.
pub struct DerivedConfig {
    inner: ArcSwap<Config>,
    filter_override: Option<LevelFilter>,
}

impl DerivedConfig {
    pub fn new(initial: Arc<Config>) -> Self {
        DerivedConfig {
            inner: ArcSwap::from(initial),
            filter_override: None,
        }
    }

    pub fn with_filter_override(initial: Arc<Config>, filter: LevelFilter) -> Self {
        DerivedConfig {
            inner: ArcSwap::from(initial),
            filter_override: Some(filter),
        }
    }

    /// Atomically repoint at `new_config`. Observers see either the old or
    /// the new config wholesale, never a mix.
    pub fn store(&self, new_config: Arc<Config>) {
        self.inner.store(new_config);
    }
}

impl ConfigSource for DerivedConfig {
    fn snapshot(&self) -> Arc<Config> {
        let base = self.inner.load_full();
        match &self.filter_override {
            None => base,
            Some(filter) => Arc::new(Config {
                levels: base.levels.clone(),
                filter: filter.clone(),
                writers: base.writers.clone(),
            }),
        }
    }
}

/// Fan out to several member `WriterConfig`s as if they were one sink.
/// A `Config` always holds exactly one top-level writer list, and this
/// combinator is what lets that list still contain more than one physical
/// destination behind a single entry when that's a more natural grouping
/// than flattening it.
pub struct MultiWriterConfig {
    kind: &'static str,
    members: Vec<Arc<dyn WriterConfig>>,
}

impl MultiWriterConfig {
    pub fn new(kind: &'static str, members: Vec<Arc<dyn WriterConfig>>) -> Self {
        MultiWriterConfig { kind, members }
    }
}

impl WriterConfig for MultiWriterConfig {
    fn writer_for_new_message(&self, ctx: &Ctx, level: Level) -> Option<Box<dyn Writer>> {
        let mut collected = Vec::new();
        for member in &self.members {
            if let Some(w) = member.writer_for_new_message(ctx, level) {
                collected.push(w);
            }
        }
        if collected.is_empty() {
            None
        } else {
            Some(Box::new(FanOutWriter { members: collected }))
        }
    }

    fn flush_underlying(&self) {
        for member in &self.members {
            member.flush_underlying();
        }
    }

    fn sink_kind(&self) -> &'static str {
        self.kind
    }
}

struct FanOutWriter {
    members: Vec<Box<dyn Writer>>,
}

impl Writer for FanOutWriter {
    fn begin_message(
        &mut self,
        ts: chrono::DateTime<chrono::Utc>,
        level: Level,
        level_name: &str,
        prefix: &str,
        text: &str,
    ) {
        for w in &mut self.members {
            w.begin_message(ts, level, level_name, prefix, text);
        }
    }

    fn commit_message(self: Box<Self>) {
        for w in self.members {
            w.commit_message();
        }
    }

    fn write_key(&mut self, key: &str) {
        for w in &mut self.members {
            w.write_key(key);
        }
    }

    fn write_slice_key(&mut self, key: &str) {
        for w in &mut self.members {
            w.write_slice_key(key);
        }
    }

    fn write_slice_end(&mut self) {
        for w in &mut self.members {
            w.write_slice_end();
        }
    }

    fn write_nil(&mut self) {
        for w in &mut self.members {
            w.write_nil();
        }
    }

    fn write_bool(&mut self, v: bool) {
        for w in &mut self.members {
            w.write_bool(v);
        }
    }

    fn write_int(&mut self, v: i64) {
        for w in &mut self.members {
            w.write_int(v);
        }
    }

    fn write_uint(&mut self, v: u64) {
        for w in &mut self.members {
            w.write_uint(v);
        }
    }

    fn write_float(&mut self, v: f64) {
        for w in &mut self.members {
            w.write_float(v);
        }
    }

    fn write_string(&mut self, v: &str) {
        for w in &mut self.members {
            w.write_string(v);
        }
    }

    fn write_time(&mut self, v: chrono::DateTime<chrono::Utc>) {
        for w in &mut self.members {
            w.write_time(v);
        }
    }

    fn write_duration(&mut self, v: std::time::Duration) {
        for w in &mut self.members {
            w.write_duration(v);
        }
    }

    fn write_error(&mut self, v: &str) {
        for w in &mut self.members {
            w.write_error(v);
        }
    }

    fn write_uuid(&mut self, v: uuid::Uuid) {
        for w in &mut self.members {
            w.write_uuid(v);
        }
    }

    fn write_json(&mut self, v: &[u8]) {
        for w in &mut self.members {
            w.write_json(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Levels;

    #[test]
    fn try_new_rejects_empty_writer_list() {
        let result = Config::try_new(Arc::new(Levels::new()), LevelFilter::all(), vec![]);
        assert!(matches!(result, Err(LogError::NilSink)));
    }

    #[test]
    fn derived_config_swap_is_visible_to_new_snapshots() {
        let levels = Arc::new(Levels::new());
        let cfg_a = Arc::new(Config::new(levels.clone(), LevelFilter::all(), vec![]));
        let derived = DerivedConfig::new(cfg_a);
        let cfg_b = Arc::new(Config::new(levels, LevelFilter::none(), vec![]));
        derived.store(cfg_b);
        assert!(matches!(derived.snapshot().filter, LevelFilter::Bitmap(0)));
    }

    #[test]
    fn filter_override_replaces_the_pointed_to_filter() {
        let levels = Arc::new(Levels::new());
        let cfg = Arc::new(Config::new(levels, LevelFilter::all(), vec![]));
        let derived = DerivedConfig::with_filter_override(cfg, LevelFilter::none());
        assert!(matches!(derived.snapshot().filter, LevelFilter::Bitmap(0)));
    }
}
