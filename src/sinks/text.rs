//! The built-in human-readable text sink.
//!
//! A single growable buffer per message, pulled from a [`Pool`] so repeated
//! emissions reuse the same backing allocation, colorized token-by-token,
//! and flushed to the destination in one `write_all` on commit.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::color::{ColorKind, Colorizer, LevelColor};
use crate::ctx::Ctx;
use crate::format::Format;
use crate::level::Level;
use crate::pool::Pool;
use crate::writer::{Writer, WriterConfig};

fn level_color_for(level_name: &str) -> LevelColor {
    match level_name {
        "TRACE" => LevelColor::Trace,
        "DEBUG" => LevelColor::Debug,
        "INFO" => LevelColor::Info,
        "WARN" => LevelColor::Warn,
        "ERROR" => LevelColor::Error,
        "FATAL" => LevelColor::Fatal,
        _ => LevelColor::Other,
    }
}

/// Long-lived text-sink factory. One of these typically lives for the
/// lifetime of a `Config`.
pub struct TextWriterConfig {
    dest: Arc<Mutex<dyn Write + Send>>,
    format: Arc<Format>,
    colorizer: Arc<dyn Colorizer>,
    pool: Arc<Pool<String>>,
    min_level: Option<Level>,
}

impl TextWriterConfig {
    pub fn new(dest: impl Write + Send + 'static) -> Self {
        Self::with_format(dest, Format::default())
    }

    pub fn with_format(dest: impl Write + Send + 'static, format: Format) -> Self {
        TextWriterConfig {
            dest: Arc::new(Mutex::new(dest)),
            format: Arc::new(format),
            colorizer: Arc::from(crate::color::default_colorizer()),
            pool: Arc::new(Pool::new(64, || String::with_capacity(256)).with_min_capacity(32)),
            min_level: None,
        }
    }

    pub fn with_colorizer(mut self, colorizer: Box<dyn Colorizer>) -> Self {
        self.colorizer = Arc::from(colorizer);
        self
    }

    /// Decline messages below `level`, independent of whatever `Logger`
    /// the message came from.
    pub fn with_min_level(mut self, level: Level) -> Self {
        self.min_level = Some(level);
        self
    }
}

impl WriterConfig for TextWriterConfig {
    fn writer_for_new_message(&self, ctx: &Ctx, level: Level) -> Option<Box<dyn Writer>> {
        if ctx.is_logging_disabled(self.sink_kind()) {
            return None;
        }
        if let Some(min) = self.min_level {
            if level < min {
                return None;
            }
        }
        Some(Box::new(TextWriter {
            buf: self.pool.get_or_new(),
            dest: self.dest.clone(),
            format: self.format.clone(),
            colorizer: self.colorizer.clone(),
            pool: self.pool.clone(),
            in_slice: false,
            slice_first: false,
        }))
    }

    fn flush_underlying(&self) {
        let _ = self.dest.lock().flush();
    }

    fn sink_kind(&self) -> &'static str {
        "text"
    }
}

struct TextWriter {
    buf: String,
    dest: Arc<Mutex<dyn Write + Send>>,
    format: Arc<Format>,
    colorizer: Arc<dyn Colorizer>,
    pool: Arc<Pool<String>>,
    in_slice: bool,
    slice_first: bool,
}

impl TextWriter {
    fn push_value(&mut self, kind: ColorKind, rendered: &str) {
        if self.in_slice {
            if !self.slice_first {
                self.buf.push(',');
            }
            self.slice_first = false;
        }
        self.buf.push_str(&self.colorizer.colorize(kind, rendered));
    }
}

impl Writer for TextWriter {
    fn begin_message(&mut self, ts: DateTime<Utc>, level: Level, level_name: &str, prefix: &str, text: &str) {
        let _ = level;
        if self.format.timestamp_enabled() {
            let rendered = ts.format(self.format.timestamp_format).to_string();
            self.buf
                .push_str(&self.colorizer.colorize(ColorKind::Timestamp, &rendered));
            self.buf.push(' ');
        }
        self.buf.push_str(
            &self
                .colorizer
                .colorize(ColorKind::Level(level_color_for(level_name)), level_name),
        );
        self.buf.push(' ');
        let joined = self.format.join_prefix(prefix, text);
        self.buf.push_str(&self.colorizer.colorize(ColorKind::Msg, &joined));
    }

    fn commit_message(self: Box<Self>) {
        let TextWriter { mut buf, dest, pool, .. } = *self;
        buf.push('\n');
        {
            let mut dest = dest.lock();
            let _ = dest.write_all(buf.as_bytes());
        }
        pool.put_back(buf);
    }

    fn write_key(&mut self, key: &str) {
        self.buf.push(' ');
        self.buf.push_str(&self.colorizer.colorize(ColorKind::Key, key));
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
        self.push_value(ColorKind::Nil, "nil");
    }

    fn write_bool(&mut self, v: bool) {
        let kind = if v { ColorKind::True } else { ColorKind::False };
        self.push_value(kind, if v { "true" } else { "false" });
    }

    fn write_int(&mut self, v: i64) {
        self.push_value(ColorKind::Int, &v.to_string());
    }

    fn write_uint(&mut self, v: u64) {
        self.push_value(ColorKind::Uint, &v.to_string());
    }

    fn write_float(&mut self, v: f64) {
        self.push_value(ColorKind::Float, &v.to_string());
    }

    fn write_string(&mut self, v: &str) {
        self.push_value(ColorKind::String, &format!("{v:?}"));
    }

    fn write_time(&mut self, v: DateTime<Utc>) {
        self.push_value(ColorKind::Timestamp, &v.to_rfc3339());
    }

    fn write_duration(&mut self, v: Duration) {
        self.push_value(ColorKind::Int, &format!("{v:?}"));
    }

    fn write_error(&mut self, v: &str) {
        self.push_value(ColorKind::Error, &format!("{v:?}"));
    }

    fn write_uuid(&mut self, v: uuid::Uuid) {
        self.push_value(ColorKind::Uuid, &v.to_string());
    }

    fn write_json(&mut self, v: &[u8]) {
        let rendered = String::from_utf8_lossy(v);
        self.push_value(ColorKind::String, &rendered);
    }

    fn snapshot(&self) -> &[u8] {
        self.buf.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc as StdArc, Mutex as StdMutex};

    #[derive(Clone, Default)]
    struct SharedBuf(StdArc<StdMutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn commit_flushes_one_line_with_key_value_pairs() {
        let shared = SharedBuf::default();
        let config = TextWriterConfig::new(shared.clone()).with_colorizer(Box::new(crate::color::NoColor));
        let ctx = Ctx::new();
        let mut writer = config.writer_for_new_message(&ctx, 0).expect("active");
        writer.begin_message(Utc::now(), 0, "INFO", "", "hello");
        writer.write_key("k");
        writer.write_string("v");
        writer.commit_message();
        let out = String::from_utf8(shared.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("INFO"));
        assert!(out.contains("hello"));
        assert!(out.contains("k=\"v\""));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn min_level_declines_below_threshold() {
        let shared = SharedBuf::default();
        let config = TextWriterConfig::new(shared).with_min_level(4);
        let ctx = Ctx::new();
        assert!(config.writer_for_new_message(&ctx, 0).is_none());
        assert!(config.writer_for_new_message(&ctx, 4).is_some());
    }

    #[test]
    fn context_opt_out_declines_the_sink() {
        let shared = SharedBuf::default();
        let config = TextWriterConfig::new(shared);
        let ctx = Ctx::new().with_no_log("text");
        assert!(config.writer_for_new_message(&ctx, 0).is_none());
    }
}
