//! Test-only helper sink, gated behind the `test-util` feature so it never
//! ships in a normal build. A pooled-buffer writer that records each
//! committed message as a plain `key=value` line, plus direct access to
//! the backing [`Pool`] so a test can assert on capacity reuse without
//! reaching into crate internals.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use crate::ctx::Ctx;
use crate::level::Level;
use crate::pool::Pool;
use crate::writer::{Writer, WriterConfig};

pub struct RecordingWriterConfig {
    pool: Arc<Pool<String>>,
    records: Arc<Mutex<Vec<String>>>,
    min_level: Option<Level>,
}

impl Default for RecordingWriterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingWriterConfig {
    pub fn new() -> Self {
        RecordingWriterConfig {
            pool: Arc::new(Pool::new(64, || String::with_capacity(128)).with_min_capacity(16)),
            records: Arc::new(Mutex::new(Vec::new())),
            min_level: None,
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }

    /// Snapshot of every committed line, in commit order.
    pub fn records(&self) -> Vec<String> {
        self.records.lock().clone()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    /// Direct handle on the backing buffer pool, for asserting on
    /// `outstanding()`/`free_count()` in pool-reuse tests.
    pub fn pool(&self) -> &Pool<String> {
        &self.pool
    }
}

impl WriterConfig for RecordingWriterConfig {
    fn writer_for_new_message(&self, ctx: &Ctx, level: Level) -> Option<Box<dyn Writer>> {
        if ctx.is_logging_disabled(self.sink_kind()) {
            return None;
        }
        if let Some(min) = self.min_level {
            if level < min {
                return None;
            }
        }
        Some(Box::new(RecordingWriter {
            buf: self.pool.get_or_new(),
            pool: self.pool.clone(),
            records: self.records.clone(),
            in_slice: false,
            slice_first: false,
        }))
    }

    fn flush_underlying(&self) {}

    fn sink_kind(&self) -> &'static str {
        "recording"
    }
}

struct RecordingWriter {
    buf: String,
    pool: Arc<Pool<String>>,
    records: Arc<Mutex<Vec<String>>>,
    in_slice: bool,
    slice_first: bool,
}

impl RecordingWriter {
    fn push(&mut self, rendered: &str) {
        if self.in_slice {
            if !self.slice_first {
                self.buf.push(',');
            }
            self.slice_first = false;
        }
        self.buf.push_str(rendered);
    }
}

impl Writer for RecordingWriter {
    fn begin_message(&mut self, _ts: DateTime<Utc>, _level: Level, level_name: &str, prefix: &str, text: &str) {
        self.buf.push_str(level_name);
        self.buf.push(' ');
        if !prefix.is_empty() {
            self.buf.push_str(prefix);
            self.buf.push_str(": ");
        }
        self.buf.push_str(text);
    }

    fn commit_message(self: Box<Self>) {
        let RecordingWriter { buf, pool, records, .. } = *self;
        records.lock().push(buf.clone());
        pool.put_back(buf);
    }

    fn write_key(&mut self, key: &str) {
        self.buf.push(' ');
        self.buf.push_str(key);
        self.buf.push('=');
    }

    fn write_slice_key(&mut self, key: &str) {
        self.write_key(key);
        self.buf.push('[');
        self.in_slice = true;
        self.slice_first = true;
    }

    fn write_slice_end(&mut self) {
        self.buf.push(']');
        self.in_slice = false;
    }

    fn write_nil(&mut self) {
        self.push("nil");
    }

    fn write_bool(&mut self, v: bool) {
        self.push(if v { "true" } else { "false" });
    }

    fn write_int(&mut self, v: i64) {
        self.push(&v.to_string());
    }

    fn write_uint(&mut self, v: u64) {
        self.push(&v.to_string());
    }

    fn write_float(&mut self, v: f64) {
        self.push(&v.to_string());
    }

    fn write_string(&mut self, v: &str) {
        self.push(v);
    }

    fn write_time(&mut self, v: DateTime<Utc>) {
        self.push(&v.to_rfc3339());
    }

    fn write_duration(&mut self, v: Duration) {
        self.push(&format!("{v:?}"));
    }

    fn write_error(&mut self, v: &str) {
        self.push(v);
    }

    fn write_uuid(&mut self, v: uuid::Uuid) {
        self.push(&v.to_string());
    }

    fn write_json(&mut self, v: &[u8]) {
        self.push(&String::from_utf8_lossy(v));
    }

    fn snapshot(&self) -> &[u8] {
        self.buf.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_capture_committed_lines_in_order() {
        let config = RecordingWriterConfig::new();
        let ctx = Ctx::new();
        for text in ["first", "second"] {
            let mut w = config.writer_for_new_message(&ctx, 0).unwrap();
            w.begin_message(Utc::now(), 0, "INFO", "", text);
            w.commit_message();
        }
        assert_eq!(config.records(), vec!["INFO first", "INFO second"]);
    }
}
