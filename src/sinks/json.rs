//! The built-in structured JSON sink.
//!
//! Builds one JSON object per message directly into a pooled `Vec<u8>`,
//! with no intermediate `serde_json::Value` tree, so the buffer's backing
//! allocation survives recycling exactly like the text sink's `String`.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::io::Write as IoWrite;
use std::sync::Arc;
use std::time::Duration;

use crate::ctx::Ctx;
use crate::format::Format;
use crate::level::Level;
use crate::pool::Pool;
use crate::writer::{Writer, WriterConfig};

pub struct JsonWriterConfig {
    dest: Arc<Mutex<dyn IoWrite + Send>>,
    format: Arc<Format>,
    pool: Arc<Pool<Vec<u8>>>,
    min_level: Option<Level>,
}

impl JsonWriterConfig {
    pub fn new(dest: impl IoWrite + Send + 'static) -> Self {
        Self::with_format(dest, Format::default())
    }

    pub fn with_format(dest: impl IoWrite + Send + 'static, format: Format) -> Self {
        JsonWriterConfig {
            dest: Arc::new(Mutex::new(dest)),
            format: Arc::new(format),
            pool: Arc::new(Pool::new(64, || Vec::with_capacity(256)).with_min_capacity(32)),
            min_level: None,
        }
    }

    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }
}

impl WriterConfig for JsonWriterConfig {
    fn writer_for_new_message(&self, ctx: &Ctx, level: Level) -> Option<Box<dyn Writer>> {
        if ctx.is_logging_disabled(self.sink_kind()) {
            return None;
        }
        if let Some(min) = self.min_level {
            if level < min {
                return None;
            }
        }
        Some(Box::new(JsonWriter {
            buf: self.pool.get_or_new(),
            dest: self.dest.clone(),
            format: self.format.clone(),
            pool: self.pool.clone(),
            field_written: false,
            in_slice: false,
            slice_first: false,
        }))
    }

    fn flush_underlying(&self) {
        let _ = self.dest.lock().flush();
    }

    fn sink_kind(&self) -> &'static str {
        "json"
    }
}

struct JsonWriter {
    buf: Vec<u8>,
    dest: Arc<Mutex<dyn IoWrite + Send>>,
    format: Arc<Format>,
    pool: Arc<Pool<Vec<u8>>>,
    field_written: bool,
    in_slice: bool,
    slice_first: bool,
}

impl JsonWriter {
    fn write_field_key(&mut self, key: &str) {
        if self.field_written {
            self.buf.push(b',');
        }
        self.field_written = true;
        let _ = serde_json::to_writer(&mut self.buf, key);
        self.buf.push(b':');
    }

    fn write_field_string(&mut self, key: &str, value: &str) {
        self.write_field_key(key);
        let _ = serde_json::to_writer(&mut self.buf, value);
    }

    fn push_raw(&mut self, render: impl FnOnce(&mut Vec<u8>)) {
        if self.in_slice {
            if !self.slice_first {
                self.buf.push(b',');
            }
            self.slice_first = false;
        }
        render(&mut self.buf);
    }

    fn push_json_scalar(&mut self, value: &impl serde::Serialize) {
        self.push_raw(|buf| {
            let _ = serde_json::to_writer(buf, value);
        });
    }
}

impl Writer for JsonWriter {
    fn begin_message(&mut self, ts: DateTime<Utc>, level: Level, level_name: &str, prefix: &str, text: &str) {
        let _ = level;
        self.buf.push(b'{');
        if self.format.timestamp_enabled() {
            let rendered = ts.format(self.format.timestamp_format).to_string();
            self.write_field_string(self.format.timestamp_key, &rendered);
        }
        self.write_field_string(self.format.level_key, level_name);
        let joined = self.format.join_prefix(prefix, text);
        self.write_field_string(self.format.message_key, &joined);
    }

    fn commit_message(self: Box<Self>) {
        let JsonWriter { mut buf, dest, pool, .. } = *self;
        buf.push(b'}');
        buf.push(b'\n');
        {
            let mut dest = dest.lock();
            let _ = dest.write_all(&buf);
        }
        pool.put_back(buf);
    }

    fn write_key(&mut self, key: &str) {
        self.write_field_key(key);
    }

    fn write_slice_key(&mut self, key: &str) {
        self.write_field_key(key);
        self.buf.push(b'[');
        self.in_slice = true;
        self.slice_first = true;
    }

    fn write_slice_end(&mut self) {
        self.buf.push(b']');
        self.in_slice = false;
    }

    fn write_nil(&mut self) {
        self.push_raw(|buf| buf.extend_from_slice(b"null"));
    }

    fn write_bool(&mut self, v: bool) {
        self.push_json_scalar(&v);
    }

    fn write_int(&mut self, v: i64) {
        self.push_json_scalar(&v);
    }

    fn write_uint(&mut self, v: u64) {
        self.push_json_scalar(&v);
    }

    fn write_float(&mut self, v: f64) {
        self.push_raw(|buf| {
            let _ = write!(buf, "{v}");
        });
    }

    fn write_string(&mut self, v: &str) {
        self.push_json_scalar(&v);
    }

    fn write_time(&mut self, v: DateTime<Utc>) {
        self.push_json_scalar(&v.to_rfc3339());
    }

    fn write_duration(&mut self, v: Duration) {
        self.push_raw(|buf| {
            let _ = write!(buf, "{}", v.as_secs_f64());
        });
    }

    fn write_error(&mut self, v: &str) {
        self.push_json_scalar(&v);
    }

    fn write_uuid(&mut self, v: uuid::Uuid) {
        self.push_json_scalar(&v.to_string());
    }

    fn write_json(&mut self, v: &[u8]) {
        self.push_raw(|buf| buf.extend_from_slice(v));
    }

    fn snapshot(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc as StdArc, Mutex as StdMutex};

    #[derive(Clone, Default)]
    struct SharedBuf(StdArc<StdMutex<Vec<u8>>>);

    impl IoWrite for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn commit_emits_valid_json_with_core_fields() {
        let shared = SharedBuf::default();
        let config = JsonWriterConfig::new(shared.clone());
        let ctx = Ctx::new();
        let mut writer = config.writer_for_new_message(&ctx, 0).expect("active");
        writer.begin_message(Utc::now(), 0, "INFO", "", "hello");
        writer.write_key("count");
        writer.write_int(3);
        writer.commit_message();
        let out = shared.0.lock().unwrap().clone();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["message"], "hello");
        assert_eq!(parsed["count"], 3);
    }

    #[test]
    fn slice_values_render_as_a_json_array() {
        let shared = SharedBuf::default();
        let config = JsonWriterConfig::new(shared.clone());
        let ctx = Ctx::new();
        let mut writer = config.writer_for_new_message(&ctx, 0).expect("active");
        writer.begin_message(Utc::now(), 0, "INFO", "", "hello");
        writer.write_slice_key("ids");
        writer.write_int(1);
        writer.write_int(2);
        writer.write_slice_end();
        writer.commit_message();
        let parsed: serde_json::Value =
            serde_json::from_slice(&shared.0.lock().unwrap()).unwrap();
        assert_eq!(parsed["ids"], serde_json::json!([1, 2]));
    }
}
