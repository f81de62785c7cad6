//! The fluent message builder.
//!
//! A `Message` runs in one of two modes, selected at construction and never
//! changed:
//!
//! - **Event mode** (`Logger::new_message`): holds the real per-sink
//!   `Writer`s for one emission. Every fluent call dispatches straight to
//!   each writer; no attribute is ever boxed or collected. When no sink
//!   accepted the message, the writer list is simply empty and every call
//!   becomes a no-op loop over nothing. The zero-allocation disabled path
//!   falls out of the same code, rather than needing a separate sentinel type.
//! - **Recording mode** (`Logger::with`): holds no writers at all and
//!   instead appends each call to a pooled `Vec<Attr>`, closed out by
//!   `sub_logger()` into a new `Logger`.

use chrono::{DateTime, Utc};
use smallvec::SmallVec;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use crate::attr::{Attr, Value};
use crate::ctx::Ctx;
use crate::diag::{self, InternalLevel};
use crate::level::Level;
use crate::logger::Logger;
use crate::writer::Writer;

type WriterSlot = (&'static str, Box<dyn Writer>);

pub struct Message {
    ctx: Ctx,
    ts: DateTime<Utc>,
    level: Level,
    writers: SmallVec<[WriterSlot; 4]>,
    record: bool,
    recorded: SmallVec<[Attr; 8]>,
    in_slice: bool,
    committed: bool,
}

impl Message {
    pub(crate) fn new_event(
        ctx: Ctx,
        ts: DateTime<Utc>,
        level: Level,
        writers: SmallVec<[WriterSlot; 4]>,
    ) -> Self {
        Message {
            ctx,
            ts,
            level,
            writers,
            record: false,
            recorded: SmallVec::new(),
            in_slice: false,
            committed: false,
        }
    }

    pub(crate) fn new_recorder(ctx: Ctx) -> Self {
        Message {
            ctx,
            ts: Utc::now(),
            level: 0,
            writers: SmallVec::new(),
            record: true,
            recorded: SmallVec::new(),
            in_slice: false,
            committed: false,
        }
    }

    /// True when no sink accepted this message (or it never had one to
    /// begin with). The zero-allocation disabled path.
    pub fn is_active(&self) -> bool {
        !self.writers.is_empty()
    }

    pub fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.ts
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Close a `with()` builder into a sub-logger sharing `parent`'s config
    /// and prepending `parent`'s bound attributes.
    pub fn sub_logger(mut self, parent: &Logger) -> Logger {
        debug_assert!(self.record, "sub_logger() called on a non-recording message");
        let recorded = std::mem::take(&mut self.recorded);
        self.committed = true;
        parent.derive_with_attrs(recorded.into_vec())
    }

    /// Dispatch one write to every remaining writer, dropping (and
    /// reporting) any writer whose call panics rather than letting the
    /// panic escape `.log()`.
    fn dispatch(&mut self, f: impl Fn(&mut dyn Writer)) {
        let mut i = 0;
        while i < self.writers.len() {
            let outcome = {
                let (_, writer) = &mut self.writers[i];
                panic::catch_unwind(AssertUnwindSafe(|| f(writer.as_mut())))
            };
            match outcome {
                Ok(()) => i += 1,
                Err(_) => {
                    let (sink_kind, _) = self.writers.remove(i);
                    diag::report_sink_error(sink_kind, "panic during attribute serialization");
                }
            }
        }
    }

    fn write_scalar(w: &mut dyn Writer, value: &Value) {
        match value {
            Value::Nil => w.write_nil(),
            Value::Bool(b) => w.write_bool(*b),
            Value::Int(i) => w.write_int(*i),
            Value::Uint(u) => w.write_uint(*u),
            Value::Float(f) => w.write_float(*f),
            Value::Str(s) => w.write_string(s),
            Value::Time(t) => w.write_time(*t),
            Value::Duration(d) => w.write_duration(*d),
            Value::Uuid(u) => w.write_uuid(*u),
            Value::Error(e) => w.write_error(e),
            Value::Json(j) => w.write_json(j),
        }
    }

    fn record_scalar(&mut self, key: &str, value: Value) {
        self.recorded.push(Attr::Scalar {
            key: key.into(),
            value,
        });
    }

    fn emit_scalar(&mut self, key: &str, value: Value) {
        if self.record {
            self.record_scalar(key, value);
        } else {
            self.dispatch(|w| {
                w.write_key(key);
                Self::write_scalar(w, &value);
            });
        }
    }

    /// Replay a bound attribute (from a logger chain) onto this message's
    /// live writers. Only meaningful in event mode.
    pub(crate) fn replay_attr(&mut self, attr: &Attr) {
        match attr {
            Attr::Scalar { key, value } => {
                self.dispatch(|w| {
                    w.write_key(key);
                    Self::write_scalar(w, value);
                });
            }
            Attr::Slice { key, values } => {
                self.dispatch(|w| w.write_slice_key(key));
                for v in values {
                    self.dispatch(|w| Self::write_scalar(w, v));
                }
                self.dispatch(|w| w.write_slice_end());
            }
        }
    }

    // The scalar/slice methods below consume and return an owned `Self`
    // rather than `&mut Self` so a whole chain can end in `.log()` or
    // `.sub_logger()`, both of which consume the builder by value.

    pub fn nil(mut self, key: &str) -> Self {
        self.emit_scalar(key, Value::Nil);
        self
    }

    pub fn bool(mut self, key: &str, value: bool) -> Self {
        self.emit_scalar(key, Value::Bool(value));
        self
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.emit_scalar(key, Value::Int(value));
        self
    }

    pub fn uint(mut self, key: &str, value: u64) -> Self {
        self.emit_scalar(key, Value::Uint(value));
        self
    }

    pub fn float(mut self, key: &str, value: f64) -> Self {
        self.emit_scalar(key, Value::Float(value));
        self
    }

    pub fn str(mut self, key: &str, value: &str) -> Self {
        self.emit_scalar(key, Value::Str(value.into()));
        self
    }

    pub fn time(mut self, key: &str, value: DateTime<Utc>) -> Self {
        self.emit_scalar(key, Value::Time(value));
        self
    }

    pub fn duration(mut self, key: &str, value: Duration) -> Self {
        self.emit_scalar(key, Value::Duration(value));
        self
    }

    pub fn uuid(mut self, key: &str, value: uuid::Uuid) -> Self {
        self.emit_scalar(key, Value::Uuid(value));
        self
    }

    pub fn json_raw(mut self, key: &str, value: &[u8]) -> Self {
        self.emit_scalar(key, Value::Json(value.into()));
        self
    }

    /// `.err(key, None)` still writes a nil marker under `key` rather than
    /// omitting it, so downstream schemas stay stable.
    pub fn err(mut self, key: &str, value: Option<&(dyn std::error::Error)>) -> Self {
        match value {
            Some(e) => self.emit_scalar(key, Value::Error(e.to_string().into())),
            None => self.emit_scalar(key, Value::Nil),
        }
        self
    }

    /// Slow-path runtime dispatch for callers who don't know the type of
    /// `value` ahead of time. Never use on a hot call site.
    pub fn any(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.emit_scalar(key, value.into());
        self
    }

    fn slice_key(&mut self, key: &str) -> &mut Self {
        if self.in_slice {
            diag::emit_internal(
                InternalLevel::Warn,
                "message.slice_key",
                "nested slice_key() without a matching slice_end()",
            );
        }
        self.in_slice = true;
        if !self.record {
            self.dispatch(|w| w.write_slice_key(key));
        }
        self
    }

    fn slice_end(&mut self) -> &mut Self {
        self.in_slice = false;
        if !self.record {
            self.dispatch(|w| w.write_slice_end());
        }
        self
    }

    fn slice_of<T: Copy>(
        &mut self,
        key: &str,
        values: &[T],
        to_value: impl Fn(T) -> Value,
        write: impl Fn(&mut dyn Writer, T) + Copy,
    ) -> &mut Self {
        if self.record {
            let values: SmallVec<[Value; 4]> = values.iter().copied().map(to_value).collect();
            self.recorded.push(Attr::Slice {
                key: key.into(),
                values,
            });
            return self;
        }
        self.slice_key(key);
        for &v in values {
            self.dispatch(move |w| write(w, v));
        }
        self.slice_end()
    }

    pub fn ints(mut self, key: &str, values: &[i64]) -> Self {
        self.slice_of(key, values, Value::Int, |w, v| w.write_int(v));
        self
    }

    pub fn uints(mut self, key: &str, values: &[u64]) -> Self {
        self.slice_of(key, values, Value::Uint, |w, v| w.write_uint(v));
        self
    }

    pub fn floats(mut self, key: &str, values: &[f64]) -> Self {
        self.slice_of(key, values, Value::Float, |w, v| w.write_float(v));
        self
    }

    pub fn bools(mut self, key: &str, values: &[bool]) -> Self {
        self.slice_of(key, values, Value::Bool, |w, v| w.write_bool(v));
        self
    }

    pub fn uuids(mut self, key: &str, values: &[uuid::Uuid]) -> Self {
        self.slice_of(key, values, Value::Uuid, |w, v| w.write_uuid(v));
        self
    }

    /// `&[&str]` rather than `slice_of`'s `Copy` bound. Strings aren't `Copy`.
    pub fn strs(mut self, key: &str, values: &[&str]) -> Self {
        if self.record {
            let values: SmallVec<[Value; 4]> =
                values.iter().map(|s| Value::Str((*s).into())).collect();
            self.recorded.push(Attr::Slice {
                key: key.into(),
                values,
            });
            return self;
        }
        self.slice_key(key);
        for v in values {
            self.dispatch(|w| w.write_string(v));
        }
        self.slice_end();
        self
    }

    /// Finalize: commit every writer (in order) and recycle the message.
    /// No-op (but still consumes `self`) on a recording-mode builder. Use
    /// [`Message::sub_logger`] to close those instead.
    pub fn log(mut self) {
        if self.record {
            diag::emit_internal(
                InternalLevel::Warn,
                "message.log",
                "log() called on a with()-builder message; use sub_logger() instead",
            );
            self.committed = true;
            return;
        }
        let writers = std::mem::take(&mut self.writers);
        for (sink_kind, writer) in writers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| writer.commit_message()));
            if outcome.is_err() {
                diag::report_sink_error(sink_kind, "panic during commit_message");
            }
        }
        self.committed = true;
    }
}

impl Drop for Message {
    fn drop(&mut self) {
        if !self.committed && !self.record && !self.writers.is_empty() {
            diag::note_uncommitted_message();
        }
    }
}

macro_rules! impl_value_from {
    ($variant:ident, $ty:ty) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Value {
                Value::$variant(v.into())
            }
        }
    };
}

impl_value_from!(Bool, bool);
impl_value_from!(Int, i64);
impl_value_from!(Int, i32);
impl_value_from!(Uint, u64);
impl_value_from!(Uint, u32);
impl_value_from!(Float, f64);

impl From<f32> for Value {
    fn from(v: f32) -> Value {
        Value::Float(v as f64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Str(v.into())
    }
}
