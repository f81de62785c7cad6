//! The sink interface: `WriterConfig` and `Writer`.

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::ctx::Ctx;
use crate::level::Level;

/// Long-lived, per-sink factory and backing-resource owner.
///
/// `writer_for_new_message` is the fast path: returning `None` signals the
/// sink declines this message (level filtered, context opt-out) without
/// allocating anything.
pub trait WriterConfig: Send + Sync {
    fn writer_for_new_message(&self, ctx: &Ctx, level: Level) -> Option<Box<dyn Writer>>;

    /// Force a durable flush of the backing I/O resource. Not on the hot
    /// path; called explicitly by callers (e.g. at shutdown).
    fn flush_underlying(&self);

    /// Short, stable name used for context opt-out lookups (`Ctx::with_no_log`)
    /// and diagnostics. Not necessarily unique across configs of the same kind.
    fn sink_kind(&self) -> &'static str;
}

/// The per-message serializer obtained from a [`WriterConfig`].
///
/// Exactly one `begin_message` must precede exactly one `commit_message`;
/// everything between is an attribute write. `commit_message` consumes the
/// box because after commit the writer is not reusable by the caller. The
/// concrete type decides whether and how to recycle its own internal state.
pub trait Writer: Send {
    fn begin_message(
        &mut self,
        ts: DateTime<Utc>,
        level: Level,
        level_name: &str,
        prefix: &str,
        text: &str,
    );

    fn commit_message(self: Box<Self>);

    fn write_key(&mut self, key: &str);
    fn write_slice_key(&mut self, key: &str);
    fn write_slice_end(&mut self);

    fn write_nil(&mut self);
    fn write_bool(&mut self, v: bool);
    fn write_int(&mut self, v: i64);
    fn write_uint(&mut self, v: u64);
    fn write_float(&mut self, v: f64);
    fn write_string(&mut self, v: &str);
    fn write_time(&mut self, v: DateTime<Utc>);
    fn write_duration(&mut self, v: Duration);
    fn write_error(&mut self, v: &str);
    fn write_uuid(&mut self, v: uuid::Uuid);
    fn write_json(&mut self, v: &[u8]);

    /// Current buffer snapshot, debug/test use only. Not meaningful for
    /// non-buffering writers (e.g. the callback sink), which return `&[]`.
    fn snapshot(&self) -> &[u8] {
        &[]
    }
}
